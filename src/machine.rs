/*!
  The Vole machine: a register file, a byte-addressable memory, an owned program of
  decoded instructions, and the program counter, together with the fetch-execute
  loop and the loader that turns program text into an executable image.

  Execution is single threaded, synchronous, and deterministic: given an identical
  program and initial state, a run is reproducible byte for byte. The loop stops
  only when the Halt opcode drives the counter to the negative sentinel or the
  counter walks off the end of the program. A user program that jumps in a circle
  with no reachable Halt therefore runs forever; that is a bug in the user program,
  not a machine fault, and the machine does not bound it.
*/

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Cell as TableCell, Row, Table};

use crate::byte::Byte;
use crate::bytecode::{
  parse_program_text,
  word_bytes,
  ControlEffect,
  Instruction,
  ParsedWordSyntax
};
use crate::errors::MachineError;
use crate::float8;
use crate::memory::{Memory, MEMORY_SIZE};
use crate::registers::RegisterFile;

/// The value the program counter takes when the machine halts.
pub const HALT_SENTINEL: isize = -1;

// The copy opcode family hardcodes its source register.
const COPY_SOURCE_REGISTER: usize = 10;

pub struct Machine {
  registers: RegisterFile,
  memory: Memory,
  /// The ordered program, grown monotonically by the loader and replayed unchanged.
  program: Vec<Instruction>,
  /// Counts instruction slots, not raw bytes. Negative means halted.
  program_counter: isize
}

/// What the loader did with a stream of tokens.
#[derive(Debug)]
pub struct LoadReport {
  pub words_seen: usize,
  pub instructions_loaded: usize,
  /// Diagnostics for skipped tokens. Loading always continues past them.
  pub diagnostics: Vec<MachineError>,
  /// Whether a Halt word ended the load before the tokens ran out.
  pub halt_terminated: bool
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunOutcome {
  /// A Halt instruction drove the counter to the sentinel.
  Halted,
  /// The counter walked off the end of the program; a normal end, not an error.
  EndOfProgram
}

/// What a call to `run` did: one trace line per executed instruction, plus any
/// execute-time diagnostics (all locally recovered).
#[derive(Debug)]
pub struct RunReport {
  pub steps: usize,
  pub outcome: RunOutcome,
  pub trace: Vec<String>,
  pub diagnostics: Vec<MachineError>
}

impl Machine {

  // region Construction and inspection

  pub fn new() -> Machine {
    Machine {
      registers:       RegisterFile::new(),
      memory:          Memory::new(),
      program:         vec![],
      program_counter: 0
    }
  }

  pub fn program_counter(&self) -> isize {
    self.program_counter
  }

  pub fn registers(&self) -> &RegisterFile {
    &self.registers
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  /// A copy of the machine state for the display collaborator.
  pub fn snapshot(&self) -> Snapshot {
    Snapshot {
      registers:       self.registers.as_slice().to_vec(),
      memory:          (0..MEMORY_SIZE).map(|address| self.memory.read(address)).collect(),
      accumulator:     self.memory.accumulator().to_string(),
      program_counter: self.program_counter
    }
  }

  // endregion

  // region Loading

  /**
    Loads whitespace-separated instruction words into the machine. Each valid word
    is decoded, appended to the program, and written as its two raw bytes into
    memory at the cursor, which starts at `start_address` and advances by two per
    word. Malformed tokens are skipped with a diagnostic and do not move the
    cursor. A Halt word terminates the load immediately after being stored;
    remaining tokens are not consumed. Afterwards the program counter is reset to
    0, ready for `run`.
  */
  pub fn load(&mut self, text: &str, start_address: usize) -> LoadReport {
    let mut report = LoadReport {
      words_seen:          0,
      instructions_loaded: 0,
      diagnostics:         vec![],
      halt_terminated:     false
    };

    let parsed = match parse_program_text(text) {
      Ok(parsed) => parsed,
      Err(_)     => vec![] // The tokenizer accepts any text; this arm is vestigial.
    };

    let mut cursor = start_address;
    for syntax in parsed {
      report.words_seen += 1;

      match syntax {

        ParsedWordSyntax::Word { word, instruction } => {
          match word_bytes(&word) {
            Ok((high, low)) => {
              self.memory.write(cursor, high);
              self.memory.write(cursor + 1, low);
            }
            Err(error) => {
              report.diagnostics.push(error);
            }
          }
          cursor += 2;
          self.program.push(instruction);
          report.instructions_loaded += 1;

          if instruction == Instruction::Halt {
            report.halt_terminated = true;
            break;
          }
        }

        ParsedWordSyntax::Malformed(error) => {
          report.diagnostics.push(error);
        }

      }
    }

    self.program_counter = 0;
    report
  }

  // endregion

  // region Fetch-execute loop

  /**
    Runs the fetch-execute loop until the machine halts or exhausts its program.
    Each step fetches by program-counter index, executes, and interprets the
    returned `ControlEffect`: `Continue` advances the counter by one, `JumpTo`
    redirects it, and `Halt` drives it to the negative sentinel.
  */
  pub fn run(&mut self) -> RunReport {
    let mut report = RunReport {
      steps:       0,
      outcome:     RunOutcome::EndOfProgram,
      trace:       vec![],
      diagnostics: vec![]
    };

    loop {
      if self.program_counter < 0 {
        report.outcome = RunOutcome::Halted;
        break;
      }

      let instruction = match self.program.get(self.program_counter as usize) {
        Some(instruction) => *instruction,
        None              => {
          report.outcome = RunOutcome::EndOfProgram;
          break;
        }
      };

      let effect = self.execute(instruction, &mut report);
      report.steps += 1;

      match effect {
        ControlEffect::Continue     => { self.program_counter += 1; }
        ControlEffect::JumpTo(slot) => { self.program_counter = slot as isize; }
        ControlEffect::Halt         => { self.program_counter = HALT_SENTINEL; }
      }
    }

    report
  }

  /**
    Executes one instruction against the register file and memory, returning its
    effect on the program counter and pushing one human-readable trace line onto
    the report. Execution is total: every arm produces an effect, never an abort.
  */
  fn execute(&mut self, instruction: Instruction, report: &mut RunReport) -> ControlEffect {
    let mut effect = ControlEffect::Continue;

    let trace = match instruction {

      Instruction::LoadFromMemory { register, address } => {
        let value = self.memory.read(address);
        self.registers.load(register, value);
        format!("LOAD R{} from Memory[{:02X}] = {}", register, address, value)
      }

      Instruction::LoadImmediate { register, value } => {
        self.registers.load(register, value);
        format!("LOAD R{} immediate value = {}", register, value)
      }

      Instruction::StoreToMemory { register, address } => {
        self.memory.write(address, self.registers.read(register));
        format!("STORE R{} to Memory[{:02X}]", register, address)
      }

      Instruction::StoreToAccumulator { register } => {
        let value = self.registers.read(register);
        match self.memory.append_ascii(value) {
          Ok(character) => {
            format!(
              "STORE R{} to Memory[00] as ASCII '{}'; updated Memory[00] = \"{}\"",
              register, character, self.memory.accumulator()
            )
          }
          Err(error) => {
            let line = format!("{}", error);
            report.diagnostics.push(error);
            line
          }
        }
      }

      Instruction::CopyRegister { destination } => {
        let value = self.registers.read(COPY_SOURCE_REGISTER);
        self.registers.load(destination, value);
        format!("COPY from R{} to R{} = {}", COPY_SOURCE_REGISTER, destination, value)
      }

      Instruction::Add { destination, source1, source2 } => {
        // Two's-complement 8 bit sum: both operands reinterpreted as signed,
        // the result truncated back to 8 bits. Overflow wraps, no fault.
        let sum = i16::from(self.registers.read(source1).as_signed())
                + i16::from(self.registers.read(source2).as_signed());
        let value = Byte::new((sum & 0xFF) as u8);
        self.registers.load(destination, value);
        format!("ADD R{} and R{} into R{} = {}", source1, source2, destination, value)
      }

      Instruction::AddFloat { destination, source1, source2 } => {
        let sum = float8::decode(self.registers.read(source1))
                + float8::decode(self.registers.read(source2));
        let value = float8::encode(sum);
        self.registers.load(destination, value);
        format!("ADD_FLOAT R{} and R{} into R{} = {}", source1, source2, destination, value)
      }

      Instruction::JumpIfEqual { register, target } => {
        let comparand = self.registers.read(register);
        let r0        = self.registers.read(0);
        match comparand == r0 {
          true  => {
            effect = ControlEffect::JumpTo(target);
            format!("JUMP to instruction at [{}]", target)
          }
          false => {
            format!("No JUMP: R{} ({}) != R0 ({})", register, comparand, r0)
          }
        }
      }

      Instruction::Halt => {
        effect = ControlEffect::Halt;
        "HALT execution.".to_string()
      }

    };

    #[cfg(feature = "trace_execution")] println!("{}", trace);
    report.trace.push(trace);

    effect
  }

  // endregion

  // region Display methods

  fn register_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for (index, value) in self.registers.as_slice().iter().enumerate() {
      table.add_row(row![r->format!("R[{}] =", index), format!("{}", value)]);
    }
    table
  }

  fn memory_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);

    let mut titles = vec![TableCell::new("")];
    for column in 0..16 {
      titles.push(TableCell::new(&format!("{:X}", column)));
    }
    table.set_titles(Row::new(titles));

    for row_index in 0..16 {
      let mut cells = vec![TableCell::new(&format!("{:02X}", row_index * 16))];
      for column in 0..16 {
        cells.push(TableCell::new(&self.memory.read(row_index * 16 + column).to_hex()));
      }
      table.add_row(Row::new(cells));
    }
    table
  }

  // The display convention for the cell-0 accumulator: a trailing 0x20 renders as
  // an explicit space indicator rather than invisible whitespace.
  fn accumulator_readout(&self) -> String {
    let last = self.memory.read(0);
    if self.memory.accumulator().is_empty() && last == Byte::default() {
      return "Memory[00] is empty or contains default value '00'.".to_string();
    }
    match last.value() {
      0x20            => "Expected value: <space>".to_string(),
      value if value <= 127 && !(value as char).is_ascii_control() => {
        format!("Expected value: {}", value as char)
      }
      _               => "Expected value: Non-printable ASCII character.".to_string()
    }
  }

  // endregion

}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "Registers Status:\n{}\nMemory Status:\n{}\n{}\nProgram Counter = {}",
      self.register_table(),
      self.memory_table(),
      self.accumulator_readout(),
      self.program_counter
    )
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// A point-in-time copy of machine state for external collaborators.
#[derive(Clone, Debug)]
pub struct Snapshot {
  pub registers: Vec<Byte>,
  pub memory: Vec<Byte>,
  pub accumulator: String,
  pub program_counter: isize
}

impl Display for LoadReport {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(
      f,
      "Loaded {} of {} instruction words.{}",
      self.instructions_loaded,
      self.words_seen,
      match self.halt_terminated {
        true  => " HALT instruction found; stopped loading.",
        false => ""
      }
    )?;
    for diagnostic in self.diagnostics.iter() {
      writeln!(f, "  Skipped: {}", diagnostic)?;
    }
    Ok(())
  }
}

impl Display for RunReport {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(
      f,
      "Executed {} instructions. {}",
      self.steps,
      match self.outcome {
        RunOutcome::Halted       => "Machine halted.",
        RunOutcome::EndOfProgram => "End of program reached."
      }
    )?;
    for line in self.trace.iter() {
      writeln!(f, "  {}", line)?;
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::registers::REGISTER_COUNT;

  #[test]
  fn end_to_end_add_program() {
    let mut machine = Machine::new();
    let load = machine.load("2005 2103 5205 C000", 0);
    assert_eq!(load.instructions_loaded, 4);
    assert!(load.halt_terminated);
    assert!(load.diagnostics.is_empty());

    let run = machine.run();
    assert_eq!(run.outcome, RunOutcome::Halted);
    assert_eq!(run.steps, 4);

    let snapshot = machine.snapshot();
    assert_eq!(snapshot.registers[0], Byte::new(0x05));
    assert_eq!(snapshot.registers[1], Byte::new(0x03));
    assert_eq!(snapshot.registers[2], Byte::new(0x08));
    assert_eq!(snapshot.program_counter, HALT_SENTINEL);
  }

  #[test]
  fn load_writes_the_raw_word_image() {
    let mut machine = Machine::new();
    machine.load("2005 C000", 0x10);
    let memory = machine.memory();
    assert_eq!(memory.read(0x10), Byte::new(0x20));
    assert_eq!(memory.read(0x11), Byte::new(0x05));
    assert_eq!(memory.read(0x12), Byte::new(0xC0));
    assert_eq!(memory.read(0x13), Byte::new(0x00));
  }

  #[test]
  fn load_skips_malformed_tokens_without_moving_the_cursor() {
    let mut machine = Machine::new();
    let report = machine.load("XYZ 2005", 0x20);
    assert_eq!(report.words_seen, 2);
    assert_eq!(report.instructions_loaded, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
      report.diagnostics[0],
      MachineError::InvalidInstructionLength { token: "XYZ".to_string() }
    );
    // The valid word landed at the start address, not one slot past it.
    assert_eq!(machine.memory().read(0x20), Byte::new(0x20));
    assert_eq!(machine.memory().read(0x21), Byte::new(0x05));
  }

  #[test]
  fn halt_terminates_loading_early() {
    let mut machine = Machine::new();
    let report = machine.load("2005 C000 2103 2204", 0);
    assert!(report.halt_terminated);
    assert_eq!(report.instructions_loaded, 2);
    // The words after the Halt were not consumed.
    assert_eq!(report.words_seen, 2);
  }

  #[test]
  fn unknown_opcodes_are_skipped_not_fatal() {
    let mut machine = Machine::new();
    let report = machine.load("7000 2005 C000", 0);
    assert_eq!(report.instructions_loaded, 2);
    assert_eq!(
      report.diagnostics[0],
      MachineError::InvalidOpcode { word: "7000".to_string() }
    );
    let run = machine.run();
    assert_eq!(run.outcome, RunOutcome::Halted);
  }

  #[test]
  fn load_immediate_stores_the_operand_verbatim() {
    let mut machine = Machine::new();
    machine.load("2AFE C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(10).to_hex(), "FE");
  }

  #[test]
  fn add_wraps_in_twos_complement() {
    // 0x7F + 0x01 overflows to 0x80; no fault.
    let mut machine = Machine::new();
    machine.load("217F 2201 5012 C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(0), Byte::new(0x80));
  }

  #[test]
  fn add_of_negative_operands() {
    // 0xFF is -1; -1 + -1 = -2 = 0xFE.
    let mut machine = Machine::new();
    machine.load("21FF 22FF 5312 C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(3), Byte::new(0xFE));
  }

  #[test]
  fn add_float_re_encodes_the_sum() {
    // 0x40 is 1.0 and 0x48 is 1.5; 2.5 encodes as 0x54.
    let mut machine = Machine::new();
    machine.load("2140 2248 6312 C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(3), Byte::new(0x54));
  }

  #[test]
  fn copy_register_always_sources_register_ten() {
    let mut machine = Machine::new();
    machine.load("2A42 4073 C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(3), Byte::new(0x42));
  }

  #[test]
  fn jump_taken_when_registers_match() {
    // R1 == R0 == 00, so slot 1 jumps straight to the Halt in slot 3,
    // skipping the load of R2 in slot 2.
    let mut machine = Machine::new();
    machine.load("2100 B103 2244 C000", 0);
    let run = machine.run();
    assert_eq!(run.outcome, RunOutcome::Halted);
    assert_eq!(machine.registers().read(2), Byte::new(0x00));
  }

  #[test]
  fn jump_not_taken_falls_through() {
    let mut machine = Machine::new();
    machine.load("2101 B103 2244 C000", 0);
    machine.run();
    assert_eq!(machine.registers().read(2), Byte::new(0x44));
  }

  #[test]
  fn jump_target_counts_slots_in_decimal() {
    // Target "10" is slot ten, not 0x10. Slots 2 through 9 load R2..R9; the
    // jump from slot 1 must skip all of them.
    let mut machine = Machine::new();
    machine.load(
      "2100 B110 2201 2301 2401 2501 2601 2701 2801 2901 C000",
      0
    );
    let run = machine.run();
    assert_eq!(run.outcome, RunOutcome::Halted);
    assert_eq!(run.steps, 3);
    assert_eq!(machine.registers().read(2), Byte::new(0x00));
  }

  #[test]
  fn store_to_reserved_address_accumulates_ascii() {
    let mut machine = Machine::new();
    machine.load("2141 3100 2142 3100 C000", 0x80);
    let run = machine.run();
    assert_eq!(machine.memory().accumulator(), "AB");
    assert!(run.diagnostics.is_empty());
  }

  #[test]
  fn store_of_a_non_ascii_byte_is_reported_and_skipped() {
    let mut machine = Machine::new();
    machine.load("2141 3100 2180 3100 C000", 0x80);
    let run = machine.run();
    assert_eq!(run.outcome, RunOutcome::Halted);
    assert_eq!(
      run.diagnostics[0],
      MachineError::OutOfAsciiRange { value: Byte::new(0x80) }
    );
    // The accumulator is unchanged by the failed store.
    assert_eq!(machine.memory().accumulator(), "A");
  }

  #[test]
  fn store_to_an_ordinary_address_overwrites() {
    let mut machine = Machine::new();
    machine.load("2155 31FF C000", 0);
    machine.run();
    assert_eq!(machine.memory().read(0xFF), Byte::new(0x55));
  }

  #[test]
  fn run_emits_one_trace_line_per_step() {
    let mut machine = Machine::new();
    machine.load("2005 C000", 0);
    let run = machine.run();
    assert_eq!(run.trace.len(), 2);
    assert_eq!(run.trace[0], "LOAD R0 immediate value = 05");
    assert_eq!(run.trace[1], "HALT execution.");
  }

  #[test]
  fn running_an_empty_program_ends_immediately() {
    let mut machine = Machine::new();
    let run = machine.run();
    assert_eq!(run.steps, 0);
    assert_eq!(run.outcome, RunOutcome::EndOfProgram);
  }

  #[test]
  fn accumulator_space_readout() {
    let mut machine = Machine::new();
    machine.load("2120 3100 C000", 0x80);
    machine.run();
    assert_eq!(machine.memory().read(0), Byte::new(0x20));
    assert_eq!(machine.accumulator_readout(), "Expected value: <space>");
  }

  #[test]
  fn snapshot_reflects_machine_state() {
    let mut machine = Machine::new();
    machine.load("2A42 C000", 0x30);
    machine.run();
    let snapshot = machine.snapshot();
    assert_eq!(snapshot.registers.len(), REGISTER_COUNT);
    assert_eq!(snapshot.memory.len(), MEMORY_SIZE);
    assert_eq!(snapshot.registers[10], Byte::new(0x42));
    assert_eq!(snapshot.memory[0x30], Byte::new(0x2A));
    assert_eq!(snapshot.program_counter, HALT_SENTINEL);
  }
}
