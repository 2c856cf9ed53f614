/*!
  Byte-addressable memory: 256 cells, zero initialized. The address space does not
  wrap; out-of-range reads return `0x00` and out-of-range writes are no-ops, never
  fatal. This keeps the execute step total.

  Cell 0 is a deliberate special case: by convention it doubles as an accumulating
  ASCII output buffer. The dedicated store-to-cell-0 operation appends one character
  to whatever is already there rather than overwriting it, so cell 0's lifecycle
  differs from every other cell. The dual role is modeled structurally as a variant
  of the cell type rather than special-casing call sites.
*/

use crate::byte::Byte;
use crate::errors::MachineError;

pub const MEMORY_SIZE: usize = 256;

/// A memory cell is either a plain byte or, at address 0 once the machine has
/// written output, the growable ASCII accumulator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MemoryCell {
  Byte(Byte),
  Accumulator(String)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<MemoryCell>
}

impl Memory {

  pub fn new() -> Memory {
    Memory {
      cells: vec![MemoryCell::Byte(Byte::default()); MEMORY_SIZE]
    }
  }

  /**
    Reads the byte at the given address. Out-of-range addresses read as `0x00`. When
    cell 0 holds the accumulator, the read yields the byte value of the most recently
    appended character, or `0x00` if nothing has been appended. This supports the
    display convention of rendering a trailing `0x20` as an explicit space.
  */
  pub fn read(&self, address: usize) -> Byte {
    match self.cells.get(address) {

      Some(MemoryCell::Byte(byte)) => *byte,

      Some(MemoryCell::Accumulator(text)) => {
        match text.bytes().last() {
          Some(byte) => Byte::new(byte),
          None       => Byte::default()
        }
      }

      None => Byte::default()
    }
  }

  /**
    Writes a byte to the given address. Out-of-range addresses are no-ops. A raw
    write to address 0 replaces the cell with a plain byte, discarding any
    accumulated output; only the loader's cursor takes this path.
  */
  pub fn write(&mut self, address: usize, value: Byte) {
    if let Some(cell) = self.cells.get_mut(address) {
      *cell = MemoryCell::Byte(value);
    }
  }

  /**
    Appends the byte, reinterpreted as one ASCII character, to the cell-0
    accumulator. Fails with `OutOfAsciiRange` for values above 127, in which case no
    write occurs. A cell 0 still holding a plain byte is replaced by a fresh
    accumulator; the prior byte does not contribute to the output string.
  */
  pub fn append_ascii(&mut self, value: Byte) -> Result<char, MachineError> {
    if value.value() > 127 {
      return Err(MachineError::OutOfAsciiRange { value });
    }
    let character = value.value() as char;

    match &mut self.cells[0] {

      MemoryCell::Accumulator(text) => {
        text.push(character);
      }

      cell => {
        *cell = MemoryCell::Accumulator(character.to_string());
      }

    }
    Ok(character)
  }

  /// The accumulated output string, empty if cell 0 still holds a plain byte.
  pub fn accumulator(&self) -> &str {
    match &self.cells[0] {
      MemoryCell::Accumulator(text) => text.as_str(),
      MemoryCell::Byte(_)           => ""
    }
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_starts_zeroed() {
    let memory = Memory::new();
    assert_eq!(memory.read(0), Byte::new(0));
    assert_eq!(memory.read(255), Byte::new(0));
  }

  #[test]
  fn write_then_read() {
    let mut memory = Memory::new();
    memory.write(0x42, Byte::new(0xAB));
    assert_eq!(memory.read(0x42), Byte::new(0xAB));
  }

  #[test]
  fn out_of_range_read_is_zero() {
    let memory = Memory::new();
    assert_eq!(memory.read(256), Byte::new(0));
    assert_eq!(memory.read(10_000), Byte::new(0));
  }

  #[test]
  fn out_of_range_write_is_a_no_op() {
    let mut memory = Memory::new();
    memory.write(256, Byte::new(0xFF));
    assert_eq!(memory.read(255), Byte::new(0));
  }

  #[test]
  fn accumulator_appends() {
    let mut memory = Memory::new();
    memory.append_ascii(Byte::new(0x41)).unwrap();
    assert_eq!(memory.accumulator(), "A");
    memory.append_ascii(Byte::new(0x42)).unwrap();
    assert_eq!(memory.accumulator(), "AB");
  }

  #[test]
  fn accumulator_rejects_non_ascii() {
    let mut memory = Memory::new();
    memory.append_ascii(Byte::new(0x41)).unwrap();
    let error = memory.append_ascii(Byte::new(0x80)).unwrap_err();
    assert_eq!(error, MachineError::OutOfAsciiRange { value: Byte::new(0x80) });
    // The accumulator is unchanged.
    assert_eq!(memory.accumulator(), "A");
  }

  #[test]
  fn reading_cell_zero_yields_the_last_appended_byte() {
    let mut memory = Memory::new();
    assert_eq!(memory.read(0), Byte::new(0));
    memory.append_ascii(Byte::new(0x41)).unwrap();
    memory.append_ascii(Byte::new(0x20)).unwrap();
    assert_eq!(memory.read(0), Byte::new(0x20));
  }

  #[test]
  fn raw_write_to_cell_zero_resets_the_accumulator() {
    let mut memory = Memory::new();
    memory.append_ascii(Byte::new(0x41)).unwrap();
    memory.write(0, Byte::new(0x20));
    assert_eq!(memory.accumulator(), "");
    assert_eq!(memory.read(0), Byte::new(0x20));
  }
}
