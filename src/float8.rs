/*!
  Codec for the machine's custom 8 bit floating-point format:

    Sign:     1 bit  (bit 7)
    Exponent: 3 bits (bits 6-4), bias 4
    Mantissa: 4 bits (bits 3-0), implicit leading 1

  The format is lossy and saturating. Encoding clamps the biased exponent to [0, 7]:
  overflow yields field 7 with mantissa 0xF, underflow yields field 0 with mantissa 0.
  Only bit patterns that are themselves one of the 256 codes round-trip exactly.
*/

use crate::byte::Byte;

pub const EXPONENT_BIAS: i32 = 4;

/// Interprets a `Byte` as a float8 code and recovers its real value.
pub fn decode(byte: Byte) -> f64 {
  let bits     = byte.value();
  let sign     = if (bits >> 7) & 0x1 == 1 { -1.0 } else { 1.0 };
  let exponent = ((bits >> 4) & 0x7) as i32 - EXPONENT_BIAS;
  let mantissa = (bits & 0xF) as f64;

  sign * (1.0 + mantissa / 16.0) * 2f64.powi(exponent)
}

/**
  Packs a real value into the nearest float8 code at or below it. Zero has no
  normalized representation and encodes as `0x00` by convention.
*/
pub fn encode(value: f64) -> Byte {
  let sign: u8  = if value < 0.0 { 1 } else { 0 };
  let magnitude = value.abs();

  if magnitude == 0.0 {
    return Byte::new((sign << 7) as u8);
  }

  let exponent     = magnitude.log2().floor() as i32;
  let mut mantissa = ((magnitude / 2f64.powi(exponent)) * 16.0) as u8 & 0xF;
  let mut biased   = exponent + EXPONENT_BIAS;

  if biased > 7 {
    biased   = 7;
    mantissa = 0xF; // Saturate high
  } else if biased < 0 {
    biased   = 0;
    mantissa = 0;   // Saturate low
  }

  Byte::new((sign << 7) | ((biased as u8 & 0x7) << 4) | (mantissa & 0xF))
}
