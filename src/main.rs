//! The interactive menu around the Vole machine core: a thin I/O wrapper that loads
//! program files, runs the machine, and dumps its status. All semantics live in the
//! core modules; this layer only prompts and prints.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
#[macro_use] extern crate strum_macros;
extern crate nom;

mod byte;
mod bytecode;
mod errors;
mod float8;
mod machine;
mod memory;
mod registers;

use std::fs;
use std::io::{self, BufRead, Write};

use crate::machine::Machine;

fn main() {
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();
  let mut machine = Machine::new();

  loop {
    let choice = match prompt(
      &mut lines,
      "\n1. Load Program\n2. Run\n3. Display Status\n4. Enter Instructions Manually\n5. Exit\nChoice: "
    ) {
      Some(choice) => choice,
      None         => break // End of input behaves like Exit.
    };

    match choice.as_str() {

      "1" => {
        load_program(&mut machine, &mut lines);
      }

      "2" => {
        let report = machine.run();
        println!("{}", report);
      }

      "3" => {
        println!("{}", machine);
      }

      "4" => {
        if manual_input(&mut machine, &mut lines) {
          let report = machine.run();
          println!("{}", report);
        }
      }

      "5" => {
        println!("Exiting...");
        break;
      }

      _ => {
        println!("Invalid choice.");
      }

    }
  }
}

/// Prints a prompt and reads one trimmed line, or `None` at end of input.
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, text: &str) -> Option<String> {
  print!("{}", text);
  let _ = io::stdout().flush();
  match lines.next() {
    Some(Ok(line)) => Some(line.trim().to_string()),
    _              => None
  }
}

fn prompt_start_address<B: BufRead>(lines: &mut io::Lines<B>) -> Option<usize> {
  let text = prompt(lines, "Enter the starting memory address to store instructions: ")?;
  match text.parse::<usize>() {
    Ok(address) => Some(address),
    Err(_)      => {
      println!("Invalid start address: {}", text);
      None
    }
  }
}

fn load_program<B: BufRead>(machine: &mut Machine, lines: &mut io::Lines<B>) {
  let path = match prompt(lines, "Enter program file path: ") {
    Some(path) => path,
    None       => return
  };
  let text = match fs::read_to_string(&path) {
    Ok(text) => text,
    Err(_)   => {
      println!("Error: Unable to open file. Please check the file path and try again.");
      return;
    }
  };
  println!("File loaded successfully.");

  let start_address = match prompt_start_address(lines) {
    Some(address) => address,
    None          => return
  };

  let report = machine.load(&text, start_address);
  println!("{}", report);
}

/**
  Reads instruction words one per prompt until a Halt word (4 characters beginning
  with 'C') is entered, then loads the collected words. Returns whether anything was
  loaded.
*/
fn manual_input<B: BufRead>(machine: &mut Machine, lines: &mut io::Lines<B>) -> bool {
  let start_address = match prompt_start_address(lines) {
    Some(address) => address,
    None          => return false
  };

  println!("Enter instructions (4 characters each, or 'C000' to finish): ");
  let mut words: Vec<String> = vec![];
  loop {
    let word = match prompt(lines, "Instruction: ") {
      Some(word) => word,
      None       => break
    };
    let is_halt = word.len() == 4 && word.starts_with('C');
    words.push(word);
    if is_halt {
      break;
    }
  }

  if words.is_empty() {
    return false;
  }
  let report = machine.load(&words.join(" "), start_address);
  println!("{}", report);
  true
}
