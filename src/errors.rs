/*!
  The diagnostic taxonomy of the machine. Every member is locally recovered: the
  offending token or operation is skipped, the diagnostic is surfaced to the caller,
  and loading or execution continues. Nothing here is fatal.
*/

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::byte::Byte;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MachineError {
  /// Text that should have been hex digits was not.
  InvalidEncoding {
    text: String
  },
  /// An instruction word must be exactly four characters.
  InvalidInstructionLength {
    token: String
  },
  /// The first character of the word names no operation.
  InvalidOpcode {
    word: String
  },
  /// A store to the cell-0 accumulator carried a value outside [0, 127].
  OutOfAsciiRange {
    value: Byte
  }
}

impl Display for MachineError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      MachineError::InvalidEncoding { text } => {
        write!(f, "Invalid hex encoding: {}", text)
      }

      MachineError::InvalidInstructionLength { token } => {
        write!(f, "Invalid instruction length. Instructions must be 4 characters long: {}", token)
      }

      MachineError::InvalidOpcode { word } => {
        write!(f, "Invalid opcode in word: {}", word)
      }

      MachineError::OutOfAsciiRange { value } => {
        write!(f, "Value {} is out of ASCII range for Memory[00].", value)
      }

    }
  }
}

impl Error for MachineError {}
