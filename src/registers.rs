/*!
  The register file: sixteen general purpose `Byte` registers indexed 0-15 by a single
  hex digit. Register 0 has no special execute-time behavior beyond being the implicit
  comparand for conditional jumps.

  Indexing out of [0, 15] is a programming invariant violation and fails fast. This is
  a different contract from `Memory`, whose out-of-range accesses are defined no-ops;
  the two must not be unified.
*/

use crate::byte::Byte;

pub const REGISTER_COUNT: usize = 16;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisterFile {
  registers: [Byte; REGISTER_COUNT]
}

impl RegisterFile {

  pub fn new() -> RegisterFile {
    RegisterFile {
      registers: [Byte::default(); REGISTER_COUNT]
    }
  }

  /// Panics if the index is not a register index.
  fn require_in_bounds(index: usize) {
    if index >= REGISTER_COUNT {
      unreachable!(
        "Error: A register index must be a single hex digit, got: {}",
        index
      );
    }
  }

  pub fn load(&mut self, index: usize, value: Byte) {
    RegisterFile::require_in_bounds(index);
    self.registers[index] = value;
  }

  pub fn read(&self, index: usize) -> Byte {
    RegisterFile::require_in_bounds(index);
    self.registers[index]
  }

  pub fn as_slice(&self) -> &[Byte] {
    &self.registers
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn registers_start_zeroed() {
    let registers = RegisterFile::new();
    for index in 0..REGISTER_COUNT {
      assert_eq!(registers.read(index), Byte::new(0));
    }
  }

  #[test]
  fn load_then_read() {
    let mut registers = RegisterFile::new();
    registers.load(10, Byte::new(0xAB));
    assert_eq!(registers.read(10), Byte::new(0xAB));
  }

  #[test]
  #[should_panic]
  fn out_of_range_index_fails_fast() {
    let registers = RegisterFile::new();
    registers.read(16);
  }
}
