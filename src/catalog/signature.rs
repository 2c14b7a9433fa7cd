//! Fixed-width perceptual signatures.
//!
//! A signature is the bit pattern produced by hashing an icon on an N×N grid.
//! Bits are stored row-major with the first grid cell as the most significant
//! bit, and the textual form is lowercase hexadecimal zero-padded to
//! `ceil(bits / 4)` characters.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::EngineError;

/// Widest signature that fits the backing integer.
pub const MAX_BITS: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    bits: u128,
    len: u32,
}

impl Signature {
    /// Builds a signature from grid cells in row-major order.
    pub fn from_bits(cells: &[bool]) -> Result<Self, EngineError> {
        let len = cells.len() as u32;
        if len == 0 || len > MAX_BITS {
            return Err(EngineError::UnsupportedHashSize(len));
        }
        let bits = cells
            .iter()
            .fold(0u128, |acc, &cell| (acc << 1) | u128::from(cell));
        Ok(Self { bits, len })
    }

    /// Parses the textual form.
    ///
    /// The bit width is recovered from the string length: `4 * chars` is
    /// floored to the nearest square grid, so 25 characters decode to a
    /// 10×10 (100-bit) signature.
    pub fn from_hex(hex: &str) -> Result<Self, EngineError> {
        let hex = hex.trim();
        let invalid = |reason: &str| EngineError::InvalidSignature {
            hex: hex.to_string(),
            reason: reason.to_string(),
        };

        if hex.is_empty() {
            return Err(invalid("empty string"));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("non-hexadecimal character"));
        }
        let nibble_bits = hex.len() as u32 * 4;
        if nibble_bits > MAX_BITS {
            return Err(invalid("longer than 128 bits"));
        }

        let side = (f64::from(nibble_bits)).sqrt().floor() as u32;
        let len = side * side;
        let bits = u128::from_str_radix(hex, 16).map_err(|e| invalid(&e.to_string()))?;
        if len < MAX_BITS && bits >> len != 0 {
            return Err(invalid("value does not fit a square grid"));
        }

        Ok(Self { bits, len })
    }

    /// Number of grid cells.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hamming distance, the count of differing bits.
    pub fn distance(&self, other: &Signature) -> Result<u32, EngineError> {
        if self.len != other.len {
            return Err(EngineError::SignatureWidthMismatch {
                left: self.len,
                right: other.len,
            });
        }
        Ok((self.bits ^ other.bits).count_ones())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.len.div_ceil(4) as usize;
        write!(f, "{:0width$x}", self.bits, width = width)
    }
}

impl FromStr for Signature {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "000183c1e1f3fbfeffe07f803";

    #[test]
    fn test_hex_width_is_recovered_from_length() {
        let sig = Signature::from_hex(SAMPLE).unwrap();
        assert_eq!(sig.len(), 100);
        assert_eq!(sig.to_string(), SAMPLE);
    }

    #[test]
    fn test_leading_zeros_are_kept() {
        let sig = Signature::from_hex("0000000000000000000000001").unwrap();
        assert_eq!(sig.to_string(), "0000000000000000000000001");
    }

    #[test]
    fn test_from_bits_msb_first() {
        let mut cells = vec![false; 100];
        cells[0] = true;
        let sig = Signature::from_bits(&cells).unwrap();
        assert_eq!(sig.to_string(), "8000000000000000000000000");
    }

    #[test]
    fn test_distance_counts_differing_bits() {
        let a = Signature::from_hex("0000000000000000000000000").unwrap();
        let b = Signature::from_hex("000000000000000000000000f").unwrap();
        assert_eq!(a.distance(&b).unwrap(), 4);
        assert_eq!(b.distance(&a).unwrap(), 4);
        assert_eq!(a.distance(&a).unwrap(), 0);
    }

    #[test]
    fn test_distance_rejects_width_mismatch() {
        let a = Signature::from_hex("0000000000000000000000000").unwrap();
        let b = Signature::from_hex("0000000000000000").unwrap();
        assert_eq!(b.len(), 64);
        assert!(matches!(
            a.distance(&b),
            Err(EngineError::SignatureWidthMismatch { left: 100, right: 64 })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Signature::from_hex("").is_err());
        assert!(Signature::from_hex("xyz").is_err());
        // Three nibbles floor to a 3×3 grid of nine bits.
        assert_eq!(Signature::from_hex("1ff").unwrap().len(), 9);
        assert!(Signature::from_hex("fff").is_err());
    }
}
