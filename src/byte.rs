/*!
  The `Byte` type, the fundamental storage unit of the machine. A `Byte` is an 8 bit
  value whose canonical textual form is two uppercase hexadecimal digits, zero padded.
  Every stored value round-trips through its hex form without loss.
*/

use std::fmt::{Display, Formatter};

use crate::errors::MachineError;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Byte(u8);

impl Byte {

  pub fn new(value: u8) -> Byte {
    Byte(value)
  }

  /**
    Parses exactly two hex digits into a `Byte`. Anything else, including a string of
    the wrong length, fails with `InvalidEncoding`.
  */
  pub fn from_hex(text: &str) -> Result<Byte, MachineError> {
    if text.len() != 2 || !text.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(MachineError::InvalidEncoding { text: text.to_string() });
    }
    match u8::from_str_radix(text, 16) {
      Ok(value) => Ok(Byte(value)),
      Err(_)    => Err(MachineError::InvalidEncoding { text: text.to_string() })
    }
  }

  /// The canonical two-digit uppercase hex form.
  pub fn to_hex(&self) -> String {
    format!("{:02X}", self.0)
  }

  pub fn value(&self) -> u8 {
    self.0
  }

  /// The two's-complement reinterpretation used by the integer `Add` instruction.
  pub fn as_signed(&self) -> i8 {
    self.0 as i8
  }

}

impl Display for Byte {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_hex())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_round_trip_is_lossless() {
    for value in 0..=255u8 {
      let byte = Byte::new(value);
      assert_eq!(Byte::from_hex(&byte.to_hex()).unwrap(), byte);
    }
  }

  #[test]
  fn to_hex_is_two_uppercase_digits() {
    assert_eq!(Byte::new(0x0A).to_hex(), "0A");
    assert_eq!(Byte::new(0xFF).to_hex(), "FF");
    assert_eq!(Byte::new(0x00).to_hex(), "00");
  }

  #[test]
  fn from_hex_accepts_either_case() {
    assert_eq!(Byte::from_hex("ab").unwrap(), Byte::new(0xAB));
    assert_eq!(Byte::from_hex("AB").unwrap(), Byte::new(0xAB));
  }

  #[test]
  fn from_hex_rejects_malformed_input() {
    assert!(Byte::from_hex("G1").is_err());
    assert!(Byte::from_hex("1").is_err());
    assert!(Byte::from_hex("123").is_err());
    assert!(Byte::from_hex("").is_err());
  }

  #[test]
  fn signed_reinterpretation() {
    assert_eq!(Byte::new(0x7F).as_signed(), 127);
    assert_eq!(Byte::new(0x80).as_signed(), -128);
    assert_eq!(Byte::new(0xFF).as_signed(), -1);
  }
}
