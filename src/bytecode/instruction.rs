
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::byte::Byte;

/**
  Opcodes of the virtual machine, a closed set keyed by the hex value of the first
  character of an instruction word. The nibble values are the wire encoding, so the
  explicit discriminants below are significant: 0, 7, 8, 9, A, D, E, and F name no
  operation and fail to decode.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq,        Debug,        Hash
)]
#[repr(u8)]
pub enum Opcode {
  LoadFromMemory = 0x1, // 1RXY   reg <- Memory[XY]
  LoadImmediate  = 0x2, // 2RXY   reg <- XY
  StoreToMemory  = 0x3, // 3RXY   Memory[XY] <- reg; XY = 00 appends to the accumulator
  CopyRegister   = 0x4, // 40XY   register 10 -> register Y
  Add            = 0x5, // 5RXY   reg <- R[X] + R[Y], two's-complement
  AddFloat       = 0x6, // 6RXY   reg <- R[X] + R[Y], float8
  JumpIfEqual    = 0xB, // BRXY   if reg == R0 then pc <- XY (decimal)
  Halt           = 0xC, // C000   pc <- -1
}

/**
  A decoded, immutable, executable unit. Each variant carries only the operand bytes
  and indices needed to execute. The store opcode splits structurally on its address
  field: address `00` names the cell-0 ASCII accumulator, every other address is an
  ordinary byte store.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// `1RXY`: reg <- Memory[XY]
  LoadFromMemory {
    register: usize,
    address: usize
  },
  /// `2RXY`: reg <- XY, stored verbatim
  LoadImmediate {
    register: usize,
    value: Byte
  },
  /// `3RXY`, XY != 00: Memory[XY] <- reg
  StoreToMemory {
    register: usize,
    address: usize
  },
  /// `3R00`: append reg, reinterpreted as ASCII, to the cell-0 accumulator
  StoreToAccumulator {
    register: usize
  },
  /**
    `40XY`: register 10 -> register Y. The source register is fixed to 10 by the
    design of this opcode family; the first operand digit is ignored. This is a
    likely encoding bug in the original instruction set, preserved as documented
    behavior rather than silently repaired.
  */
  CopyRegister {
    destination: usize
  },
  /// `5RXY`: reg <- R[X] + R[Y] as signed 8 bit integers, truncated to 8 bits
  Add {
    destination: usize,
    source1: usize,
    source2: usize
  },
  /// `6RXY`: reg <- float8 sum of R[X] and R[Y]
  AddFloat {
    destination: usize,
    source1: usize,
    source2: usize
  },
  /**
    `BRXY`: if reg == R0 then pc <- XY. The target is an absolute instruction-slot
    index parsed as DECIMAL, unlike every other operand. The asymmetry is an
    intentional quirk of the instruction set; normalizing it would change program
    file compatibility.
  */
  JumpIfEqual {
    register: usize,
    target: usize
  },
  /// `C000`: pc <- -1
  Halt,
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::LoadFromMemory { register, address } => {
        write!(f, "{}(R{}, {:02X})", Opcode::LoadFromMemory, register, address)
      }

      Instruction::LoadImmediate { register, value } => {
        write!(f, "{}(R{}, {})", Opcode::LoadImmediate, register, value)
      }

      Instruction::StoreToMemory { register, address } => {
        write!(f, "{}(R{}, {:02X})", Opcode::StoreToMemory, register, address)
      }

      Instruction::StoreToAccumulator { register } => {
        write!(f, "{}(R{}, 00)", Opcode::StoreToMemory, register)
      }

      Instruction::CopyRegister { destination } => {
        write!(f, "{}(R10, R{})", Opcode::CopyRegister, destination)
      }

      Instruction::Add { destination, source1, source2 } => {
        write!(f, "{}(R{}, R{}, R{})", Opcode::Add, destination, source1, source2)
      }

      Instruction::AddFloat { destination, source1, source2 } => {
        write!(f, "{}(R{}, R{}, R{})", Opcode::AddFloat, destination, source1, source2)
      }

      Instruction::JumpIfEqual { register, target } => {
        write!(f, "{}(R{}, {})", Opcode::JumpIfEqual, register, target)
      }

      Instruction::Halt => {
        write!(f, "{}", Opcode::Halt)
      }

    }
  }
}

/**
  The effect an executed instruction has on the program counter. The run loop
  interprets the effect; instructions never mutate the counter themselves.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlEffect {
  /// Fall through to the next instruction slot.
  Continue,
  /// Redirect to an absolute instruction-slot index.
  JumpTo(usize),
  /// Stop execution; the counter takes the negative halt sentinel.
  Halt
}


#[cfg(test)]
mod tests {
  use std::convert::TryFrom;

  use super::*;

  #[test]
  fn opcode_nibbles_decode() {
    assert_eq!(Opcode::try_from(0x1).unwrap(), Opcode::LoadFromMemory);
    assert_eq!(Opcode::try_from(0x6).unwrap(), Opcode::AddFloat);
    assert_eq!(Opcode::try_from(0xB).unwrap(), Opcode::JumpIfEqual);
    assert_eq!(Opcode::try_from(0xC).unwrap(), Opcode::Halt);
  }

  #[test]
  fn unassigned_nibbles_fail_to_decode() {
    for nibble in [0x0u8, 0x7, 0x8, 0x9, 0xA, 0xD, 0xE, 0xF].iter() {
      assert!(Opcode::try_from(*nibble).is_err());
    }
  }

  #[test]
  fn instruction_display() {
    let instruction = Instruction::Add { destination: 2, source1: 0, source2: 5 };
    assert_eq!(format!("{}", instruction), "Add(R2, R0, R5)");
  }
}
