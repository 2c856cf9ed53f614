/*!
  The human readable textual form of a program is a stream of whitespace-separated
  4-character instruction words. This module tokenizes program text and decodes each
  word into an `Instruction`, producing a positioned diagnostic instead when a word
  is malformed. Malformed words never abort a load; the caller skips them and
  continues with the next token.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use nom::{
  bytes::complete::is_not,
  character::complete::multispace0,
  error::ErrorKind,
  multi::many0,
  sequence::delimited
};

use crate::byte::Byte;
use crate::errors::MachineError;
use crate::bytecode::{Instruction, Opcode};

/// The result of decoding one token: either an executable word or the diagnostic
/// explaining why the token was skipped.
pub enum ParsedWordSyntax {
  Word {
    word: String,
    instruction: Instruction
  },
  Malformed(MachineError)
}
// Abbreviated name internally
use ParsedWordSyntax as Syntax;

impl Display for ParsedWordSyntax {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Syntax::Word { word, instruction } => {
        write!(f, "{} = {}", word, instruction)
      }
      Syntax::Malformed(error) => {
        write!(f, "{}", error)
      }
    }
  }
}

/**
  Splits program text into whitespace-separated tokens and decodes each one. The
  token stream itself cannot fail to parse; the `Result` carries the `nom` error
  type for uniformity with the combinators.
*/
pub fn parse_program_text(text: &str)
  -> Result<Vec<ParsedWordSyntax>, nom::Err<(&str, ErrorKind)>>
{
  let token_p = delimited::<&str, _, _, _, (&str, ErrorKind), _, _, _>(
    multispace0, is_not(" \t\r\n"), multispace0
  );
  let token_list_p = many0(token_p);

  match token_list_p(text) {
    Ok((_rest, tokens)) => {
      Ok(
        tokens.iter()
              .map(|token| {
                match decode_word(token) {
                  Ok(instruction) => Syntax::Word { word: token.to_string(), instruction },
                  Err(error)      => Syntax::Malformed(error)
                }
              })
              .collect()
      )
    }
    Err(e) => Err(e)
  }
}

/**
  Decodes one 4-character instruction word. The word layout is
  `opcode(1) reg(1) operand(2)`. The opcode is matched on the first character,
  case-sensitive with uppercase expected; every register and address digit is hex,
  except the `JumpIfEqual` target, which is decimal.
*/
pub fn decode_word(token: &str) -> Result<Instruction, MachineError> {
  if token.len() != 4 {
    return Err(MachineError::InvalidInstructionLength { token: token.to_string() });
  }
  if !token.chars().all(|c| c.is_ascii_hexdigit()) {
    return Err(MachineError::InvalidEncoding { text: token.to_string() });
  }

  let opcode_char = match token.chars().next() {
    // Lowercase opcode characters do not match: the opcode is case-sensitive.
    Some(c) if c.is_ascii_lowercase() => {
      return Err(MachineError::InvalidOpcode { word: token.to_string() });
    }
    Some(c) => c,
    None    => unreachable!("Empty token after length check.")
  };
  let opcode = match opcode_char.to_digit(16) {
    Some(nibble) => {
      match Opcode::try_from(nibble as u8) {
        Ok(opcode) => opcode,
        Err(_)     => return Err(MachineError::InvalidOpcode { word: token.to_string() })
      }
    }
    None => return Err(MachineError::InvalidOpcode { word: token.to_string() })
  };

  let register = hex_digit(token, 1);
  let operand  = &token[2..4];

  let instruction = match opcode {

    Opcode::LoadFromMemory => {
      Instruction::LoadFromMemory {
        register,
        address: Byte::from_hex(operand)?.value() as usize
      }
    }

    Opcode::LoadImmediate => {
      Instruction::LoadImmediate {
        register,
        value: Byte::from_hex(operand)?
      }
    }

    Opcode::StoreToMemory => {
      match operand == "00" {
        // Address 00 is reserved for the cell-0 ASCII accumulator.
        true  => Instruction::StoreToAccumulator { register },
        false => Instruction::StoreToMemory {
          register,
          address: Byte::from_hex(operand)?.value() as usize
        }
      }
    }

    Opcode::CopyRegister => {
      // The copy family is only triggered when the register field is '0'. The
      // source is always register 10; only the last digit is meaningful.
      if register != 0 {
        return Err(MachineError::InvalidOpcode { word: token.to_string() });
      }
      Instruction::CopyRegister { destination: hex_digit(token, 3) }
    }

    Opcode::Add => {
      Instruction::Add {
        destination: register,
        source1: hex_digit(token, 2),
        source2: hex_digit(token, 3)
      }
    }

    Opcode::AddFloat => {
      Instruction::AddFloat {
        destination: register,
        source1: hex_digit(token, 2),
        source2: hex_digit(token, 3)
      }
    }

    Opcode::JumpIfEqual => {
      // The jump target is parsed as DECIMAL, unlike every other operand.
      match operand.parse::<usize>() {
        Ok(target) => Instruction::JumpIfEqual { register, target },
        Err(_)     => return Err(MachineError::InvalidEncoding { text: operand.to_string() })
      }
    }

    Opcode::Halt => Instruction::Halt

  };

  Ok(instruction)
}

/// The raw 2-byte encoding of a validated word, for the loader's memory image.
pub fn word_bytes(word: &str) -> Result<(Byte, Byte), MachineError> {
  Ok((Byte::from_hex(&word[0..2])?, Byte::from_hex(&word[2..4])?))
}

// The hex value of one character of an already-validated word.
fn hex_digit(token: &str, position: usize) -> usize {
  token[position..=position]
    .chars()
    .filter_map(|c| c.to_digit(16))
    .next()
    .unwrap_or(0) as usize
}
