//! # CRC8-MAXIM Implementation
//!
//! CRC-8/MAXIM (Dallas 1-Wire) checksum used to protect every frame.
//!
//! **Polynomial**: 0x31, processed LSB-first (reflected value 0x8C)
//! **Initial Value**: 0x00
//! **Final XOR**: none
//!
//! [`Crc8`] keeps a running accumulator so a checksum can be built from
//! non-contiguous pieces: `calc(a)` followed by `update(b)` yields the same
//! value as `calc(a ++ b)`.

/// Reflected CRC-8/MAXIM polynomial
const CRC8_POLY: u8 = 0x8C;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x01) != 0 {
                crc = (crc >> 1) ^ CRC8_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Incremental CRC-8/MAXIM calculator
///
/// # Examples
///
/// ```
/// use wirelink::frame::crc::{crc8_maxim, Crc8};
///
/// let mut crc = Crc8::new();
/// crc.calc(b"1234");
/// let split = crc.update(b"56789");
///
/// assert_eq!(split, crc8_maxim(b"123456789"));
/// assert_eq!(split, 0xA1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc8 {
    seed: u8,
}

impl Crc8 {
    /// Create a calculator with a zero accumulator
    pub fn new() -> Self {
        Self { seed: 0 }
    }

    /// Start a new calculation over `data`
    ///
    /// Resets the accumulator to 0, then behaves like [`Crc8::update`].
    pub fn calc(&mut self, data: &[u8]) -> u8 {
        self.seed = 0;
        self.update(data)
    }

    /// Feed more bytes into the running calculation
    ///
    /// # Returns
    ///
    /// * `u8` - The accumulator after `data`, which is also kept as the seed
    ///   for the next call
    pub fn update(&mut self, data: &[u8]) -> u8 {
        let mut crc = self.seed;

        for &byte in data {
            crc = CRC8_TABLE[(crc ^ byte) as usize];
        }

        self.seed = crc;
        crc
    }

    /// Current accumulator value
    pub fn value(&self) -> u8 {
        self.seed
    }
}

/// One-shot CRC-8/MAXIM over a byte slice
///
/// # Arguments
///
/// * `data` - Byte slice to calculate CRC for (length byte + payload for frames)
///
/// # Returns
///
/// * `u8` - Calculated CRC8 checksum
pub fn crc8_maxim(data: &[u8]) -> u8 {
    Crc8::new().calc(data)
}

/// Bit-by-bit CRC-8/MAXIM (slow, for verification)
///
/// Processes every byte LSB-first without the lookup table. Used to check
/// the table against the textbook definition.
#[cfg(test)]
fn crc8_maxim_slow(seed: u8, data: &[u8]) -> u8 {
    let mut crc = seed;

    for &byte in data {
        let mut extract = byte;

        for _ in 0..8 {
            let sum = (crc ^ extract) & 0x01;
            crc >>= 1;
            if sum != 0 {
                crc ^= CRC8_POLY;
            }
            extract >>= 1;
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8_maxim(&[]), 0x00);
    }

    #[test]
    fn test_crc8_check_value() {
        // Standard catalogue check value for CRC-8/MAXIM-DOW
        assert_eq!(crc8_maxim(b"123456789"), 0xA1);
        assert_eq!(crc8_maxim_slow(0, b"123456789"), 0xA1);
    }

    #[test]
    fn test_crc8_single_byte() {
        assert_eq!(crc8_maxim(&[0x00]), 0x00);

        let crc = crc8_maxim(&[0xFF]);
        assert_eq!(crc, crc8_maxim_slow(0, &[0xFF]));
        assert_ne!(crc, 0x00);
    }

    #[test]
    fn test_crc8_lookup_table_matches_slow() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x04, 0x02, 0x04],
            vec![0x00; 24],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(
                crc8_maxim(data),
                crc8_maxim_slow(0, data),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_calc_resets_seed() {
        let mut crc = Crc8::new();
        crc.calc(b"garbage");
        assert_eq!(crc.calc(b"123456789"), 0xA1);
        assert_eq!(crc.value(), 0xA1);
    }

    #[test]
    fn test_update_continues_from_seed() {
        let mut crc = Crc8::new();
        crc.calc(&[0x05]);
        let split = crc.update(&[b'h', b'i']);

        assert_eq!(split, crc8_maxim(&[0x05, b'h', b'i']));
    }

    #[test]
    fn test_crc8_changes_with_data() {
        let crc1 = crc8_maxim(&[0x06, 0x00, 0x04]);
        let crc2 = crc8_maxim(&[0x06, 0x00, 0x05]);

        assert_ne!(crc1, crc2, "CRC should change when data changes");
    }

    proptest! {
        #[test]
        fn prop_incremental_equals_contiguous(
            a in proptest::collection::vec(any::<u8>(), 1..64),
            b in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let mut crc = Crc8::new();
            crc.calc(&a);
            let split = crc.update(&b);

            let mut joined = a.clone();
            joined.extend_from_slice(&b);

            prop_assert_eq!(split, crc8_maxim(&joined));
            prop_assert_eq!(split, crc8_maxim_slow(crc8_maxim_slow(0, &a), &b));
        }
    }
}
