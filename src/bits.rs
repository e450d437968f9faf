//! Fixed-width bit fields over 32- and 64-bit words
//!
//! The checked functions reject any field that does not fit its word and any
//! value wider than its declared size. The codecs use the unchecked `field*`
//! helpers on their own constant layouts.

use super::error::{JassError, Result};

#[inline]
fn check_range(start: u32, size: u32, word: u32) -> Result<()> {
    if start <= word && size <= word && start + size <= word {
        Ok(())
    } else {
        Err(JassError::BitRange { start, size, word })
    }
}

/// Mask with `size` ones starting at bit `start`
#[inline]
pub fn mask32(start: u32, size: u32) -> Result<u32> {
    check_range(start, size, u32::BITS)?;
    Ok(raw_mask32(start, size))
}

/// Extract the `size` bits of `bits` starting at `start`, shifted down to bit 0
#[inline]
pub fn extract32(bits: u32, start: u32, size: u32) -> Result<u32> {
    check_range(start, size, u32::BITS)?;
    Ok(field32(bits, start, size))
}

/// Pack `(value, size)` fields into one word, first field in the low bits
pub fn pack32(fields: &[(u32, u32)]) -> Result<u32> {
    let mut word = 0u32;
    let mut start = 0u32;
    for &(value, size) in fields {
        check_fits(value as u64, size, u32::BITS)?;
        check_range(start, size, u32::BITS)?;
        word |= value.checked_shl(start).unwrap_or(0);
        start += size;
    }
    Ok(word)
}

#[inline]
pub fn mask64(start: u32, size: u32) -> Result<u64> {
    check_range(start, size, u64::BITS)?;
    Ok(raw_mask64(start, size))
}

#[inline]
pub fn extract64(bits: u64, start: u32, size: u32) -> Result<u64> {
    check_range(start, size, u64::BITS)?;
    Ok(field64(bits, start, size))
}

pub fn pack64(fields: &[(u64, u32)]) -> Result<u64> {
    let mut word = 0u64;
    let mut start = 0u32;
    for &(value, size) in fields {
        check_fits(value, size, u64::BITS)?;
        check_range(start, size, u64::BITS)?;
        word |= value.checked_shl(start).unwrap_or(0);
        start += size;
    }
    Ok(word)
}

#[inline]
fn check_fits(value: u64, size: u32, word: u32) -> Result<()> {
    if size > word {
        return Err(JassError::BitRange {
            start: 0,
            size,
            word,
        });
    }
    let width = u64::BITS - value.leading_zeros();
    if width > size {
        Err(JassError::PackOverflow { value, size })
    } else {
        Ok(())
    }
}

#[inline]
pub(crate) const fn raw_mask32(start: u32, size: u32) -> u32 {
    if size == 0 {
        0
    } else if size >= u32::BITS {
        u32::MAX
    } else {
        ((1u32 << size) - 1) << start
    }
}

#[inline]
pub(crate) const fn raw_mask64(start: u32, size: u32) -> u64 {
    if size == 0 {
        0
    } else if size >= u64::BITS {
        u64::MAX
    } else {
        ((1u64 << size) - 1) << start
    }
}

#[inline]
pub(crate) const fn field32(bits: u32, start: u32, size: u32) -> u32 {
    if start >= u32::BITS {
        0
    } else {
        (bits >> start) & raw_mask32(0, size)
    }
}

#[inline]
pub(crate) const fn field64(bits: u64, start: u32, size: u32) -> u64 {
    if start >= u64::BITS {
        0
    } else {
        (bits >> start) & raw_mask64(0, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask32(0, 0).unwrap(), 0);
        assert_eq!(mask32(4, 3).unwrap(), 0b111_0000);
        assert_eq!(mask32(0, 32).unwrap(), u32::MAX);
        assert_eq!(mask64(16, 9).unwrap(), 0x1FF << 16);
        assert_eq!(mask64(0, 64).unwrap(), u64::MAX);
        assert!(mask32(30, 3).is_err());
        assert!(mask64(65, 0).is_err());
    }

    #[test]
    fn test_extract() {
        assert_eq!(extract32(0b1011_0110, 2, 4).unwrap(), 0b1101);
        assert_eq!(extract32(0xFFFF_FFFF, 30, 2).unwrap(), 0b11);
        assert_eq!(extract64(0x1FF0_0000, 20, 9).unwrap(), 0x1FF);
        assert!(extract32(0, 31, 2).is_err());
    }

    #[test]
    fn test_pack() {
        // 6-bit card, 4-bit index, 2-bit seat
        let word = pack32(&[(0b100011, 6), (5, 4), (2, 2)]).unwrap();
        assert_eq!(field32(word, 0, 6), 0b100011);
        assert_eq!(field32(word, 6, 4), 5);
        assert_eq!(field32(word, 10, 2), 2);

        let word = pack64(&[(7, 4), (157, 9), (1999, 11)]).unwrap();
        assert_eq!(field64(word, 4, 9), 157);
        assert_eq!(field64(word, 13, 11), 1999);
    }

    #[test]
    fn test_pack_rejects_overflow() {
        assert_eq!(
            pack32(&[(16, 4)]),
            Err(JassError::PackOverflow { value: 16, size: 4 })
        );
        assert!(pack32(&[(1, 20), (1, 20)]).is_err());
        assert!(pack64(&[(0, 65)]).is_err());
        // Zero always fits, even in zero bits
        assert_eq!(pack64(&[(0, 0), (1, 1)]).unwrap(), 1);
    }
}
