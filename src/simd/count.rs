//! Bit and byte population counts, and byte sums.
//!
//! The byte counts accumulate per-lane in 8 bits and flush into 64-bit
//! totals before a lane can wrap, so inputs of any length are exact.

use super::kernel::{score, score_raw};
use super::lookup::NibbleLookupTable;
use super::ops::{AnyOf, ByteValue, ByteValueGreater, MaskedEq, PackedNibbleSets, UnpackedNibbleSets};
use super::scalar;
use std::slice;

/// Number of set bits in `src`.
pub fn popcnt(src: &[u8]) -> usize {
    #[cfg(target_arch = "x86_64")]
    if crate::system::simd_caps().has_hw_popcnt() {
        return unsafe { hw::popcnt(src.as_ptr(), src.len()) };
    }
    scalar::popcnt(src)
}

/// Unchecked [`popcnt`] over `len` bytes, counted a word at a time.
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 8)` bytes, and the
/// bytes from `len` up to that boundary must be zero.
pub unsafe fn popcnt_unsafe(src: *const u8, len: usize) -> usize {
    #[cfg(target_arch = "x86_64")]
    if crate::system::simd_caps().has_hw_popcnt() {
        return unsafe { hw::popcnt_unsafe(src, len) };
    }
    scalar::popcnt(unsafe { slice::from_raw_parts(src, len) })
}

/// Number of bytes with `(b & mask) == val`.
pub fn mask_then_count_byte(src: &[u8], mask: u8, val: u8) -> usize {
    score(MaskedEq { mask, val }, src)[0] as usize
}

/// Unchecked [`mask_then_count_byte`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn mask_then_count_byte_unsafe(src: *const u8, len: usize, mask: u8, val: u8) -> usize {
    unsafe { score_raw(MaskedEq { mask, val }, src, len)[0] as usize }
}

/// Number of bytes equal to `val1` or `val2`.
pub fn count2_bytes(src: &[u8], val1: u8, val2: u8) -> usize {
    score(AnyOf([val1, val2]), src)[0] as usize
}

/// Unchecked [`count2_bytes`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count2_bytes_unsafe(src: *const u8, len: usize, val1: u8, val2: u8) -> usize {
    unsafe { score_raw(AnyOf([val1, val2]), src, len)[0] as usize }
}

/// Number of bytes equal to any of `val1`, `val2`, `val3`.
pub fn count3_bytes(src: &[u8], val1: u8, val2: u8, val3: u8) -> usize {
    score(AnyOf([val1, val2, val3]), src)[0] as usize
}

/// Unchecked [`count3_bytes`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count3_bytes_unsafe(src: *const u8, len: usize, val1: u8, val2: u8, val3: u8) -> usize {
    unsafe { score_raw(AnyOf([val1, val2, val3]), src, len)[0] as usize }
}

/// Number of nibbles of `src` in the set described by `table`.
///
/// Each byte holds two nibbles and contributes `table[b & 15] +
/// table[b >> 4]`. Set membership is expressed with entries of 0 and 1;
/// larger entries are summed as weights, with the per-byte sum wrapping
/// at 256.
///
/// ```rust
/// use bytekern::simd::{count_nibbles_in_set, NibbleLookupTable};
///
/// // nibbles 1 and 2
/// let set = NibbleLookupTable::new([0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
/// assert_eq!(count_nibbles_in_set(&[0x12, 0x21, 0x35], &set), 4);
/// ```
pub fn count_nibbles_in_set(src: &[u8], table: &NibbleLookupTable) -> usize {
    score(PackedNibbleSets([table]), src)[0] as usize
}

/// Unchecked [`count_nibbles_in_set`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count_nibbles_in_set_unsafe(src: *const u8, len: usize, table: &NibbleLookupTable) -> usize {
    unsafe { score_raw(PackedNibbleSets([table]), src, len)[0] as usize }
}

/// [`count_nibbles_in_set`] for two sets in one pass.
pub fn count_nibbles_in_two_sets(
    src: &[u8],
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = score(PackedNibbleSets([table1, table2]), src);
    (c1 as usize, c2 as usize)
}

/// Unchecked [`count_nibbles_in_two_sets`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count_nibbles_in_two_sets_unsafe(
    src: *const u8,
    len: usize,
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = unsafe { score_raw(PackedNibbleSets([table1, table2]), src, len) };
    (c1 as usize, c2 as usize)
}

/// Sum of `table[b]` over bytes `b` holding one nibble each.
///
/// Bytes of 16 and above follow the lookup rule of
/// [`unpacked_nibble_lookup`](super::unpacked_nibble_lookup).
pub fn count_unpacked_nibbles_in_set(src: &[u8], table: &NibbleLookupTable) -> usize {
    score(UnpackedNibbleSets([table]), src)[0] as usize
}

/// Unchecked [`count_unpacked_nibbles_in_set`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count_unpacked_nibbles_in_set_unsafe(
    src: *const u8,
    len: usize,
    table: &NibbleLookupTable,
) -> usize {
    unsafe { score_raw(UnpackedNibbleSets([table]), src, len)[0] as usize }
}

pub fn count_unpacked_nibbles_in_two_sets(
    src: &[u8],
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = score(UnpackedNibbleSets([table1, table2]), src);
    (c1 as usize, c2 as usize)
}

/// Unchecked [`count_unpacked_nibbles_in_two_sets`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn count_unpacked_nibbles_in_two_sets_unsafe(
    src: *const u8,
    len: usize,
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = unsafe { score_raw(UnpackedNibbleSets([table1, table2]), src, len) };
    (c1 as usize, c2 as usize)
}

/// Sum of all bytes.
pub fn accumulate8(src: &[u8]) -> u64 {
    score(ByteValue, src)[0]
}

/// Unchecked [`accumulate8`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn accumulate8_unsafe(src: *const u8, len: usize) -> u64 {
    unsafe { score_raw(ByteValue, src, len)[0] }
}

/// Sum of the bytes greater than `val`.
pub fn accumulate8_greater(src: &[u8], val: u8) -> u64 {
    score(ByteValueGreater(val), src)[0]
}

/// Unchecked [`accumulate8_greater`].
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(len, 16)` bytes.
pub unsafe fn accumulate8_greater_unsafe(src: *const u8, len: usize, val: u8) -> u64 {
    unsafe { score_raw(ByteValueGreater(val), src, len)[0] }
}

#[cfg(target_arch = "x86_64")]
mod hw {
    use crate::simd::raw::load_word;
    use crate::simd::BYTES_PER_WORD;

    /// Leading `len % 8` bytes one at a time, then whole words.
    #[target_feature(enable = "popcnt")]
    pub(super) unsafe fn popcnt(src: *const u8, len: usize) -> usize {
        unsafe {
            let lead = len % BYTES_PER_WORD;
            let mut total = 0usize;
            for i in 0..lead {
                total += (*src.add(i)).count_ones() as usize;
            }
            let mut off = lead;
            while off < len {
                total += load_word(src, off).count_ones() as usize;
                off += BYTES_PER_WORD;
            }
            total
        }
    }

    #[target_feature(enable = "popcnt")]
    pub(super) unsafe fn popcnt_unsafe(src: *const u8, len: usize) -> usize {
        unsafe {
            let mut total = 0usize;
            let mut off = 0;
            while off < len {
                total += load_word(src, off).count_ones() as usize;
                off += BYTES_PER_WORD;
            }
            total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimdBuf;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(11)).collect()
    }

    #[test]
    fn test_popcnt() {
        for len in 0..70 {
            let src = pattern(len);
            assert_eq!(popcnt(&src), scalar::popcnt(&src), "len {}", len);
        }
        assert_eq!(popcnt(&[0xff; 1000]), 8000);
    }

    #[test]
    fn test_popcnt_unsafe_on_zeroed_slack() {
        for len in 0..40 {
            let buf = SimdBuf::from_slice(&pattern(len));
            let count = unsafe { popcnt_unsafe(buf.as_ptr(), len) };
            assert_eq!(count, scalar::popcnt(&buf), "len {}", len);
        }
    }

    #[test]
    fn test_byte_counts() {
        let src: Vec<u8> = (0..1000).map(|i| (i % 7) as u8).collect();
        let expect = |f: &dyn Fn(u8) -> bool| src.iter().filter(|&&b| f(b)).count();

        assert_eq!(count2_bytes(&src, 1, 5), expect(&|b| b == 1 || b == 5));
        assert_eq!(count3_bytes(&src, 0, 2, 9), expect(&|b| b == 0 || b == 2));
        assert_eq!(mask_then_count_byte(&src, 0x6, 0x2), expect(&|b| b & 6 == 2));
        assert_eq!(count2_bytes(&src, 3, 3), expect(&|b| b == 3));
    }

    #[test]
    fn test_long_input_flushes() {
        let src = vec![0xffu8; 100_000];
        assert_eq!(accumulate8(&src), 255 * 100_000);
        assert_eq!(count2_bytes(&src, 0xff, 0), 100_000);
        assert_eq!(accumulate8_greater(&src, 0xff), 0);
        assert_eq!(accumulate8_greater(&src, 0xfe), 255 * 100_000);
    }

    #[test]
    fn test_nibble_counts() {
        let evens = NibbleLookupTable::new([1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
        let low = NibbleLookupTable::new([1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        for len in [0, 15, 16, 17, 40, 513] {
            let src = pattern(len);
            assert_eq!(
                count_nibbles_in_set(&src, &evens),
                scalar::count_nibbles_in_set(&src, &evens)
            );
            assert_eq!(
                count_nibbles_in_two_sets(&src, &evens, &low),
                scalar::count_nibbles_in_two_sets(&src, &evens, &low)
            );
            let unpacked: Vec<u8> = src.iter().map(|b| b & 15).collect();
            let (e, l) = count_unpacked_nibbles_in_two_sets(&unpacked, &evens, &low);
            assert_eq!(e, unpacked.iter().filter(|&&b| b % 2 == 0).count());
            assert_eq!(l, unpacked.iter().filter(|&&b| b < 4).count());
            assert_eq!(count_unpacked_nibbles_in_set(&unpacked, &low), l);
        }
    }

    #[test]
    fn test_unsafe_counts_ignore_slack() {
        let mut buf = SimdBuf::allocate(21);
        buf.as_mut_slice().fill(9);
        unsafe {
            // garbage past the logical end
            std::ptr::write_bytes(buf.as_mut_ptr().add(21), 9, buf.slack());
            assert_eq!(count2_bytes_unsafe(buf.as_ptr(), 21, 9, 1), 21);
            assert_eq!(count3_bytes_unsafe(buf.as_ptr(), 21, 9, 1, 2), 21);
            assert_eq!(mask_then_count_byte_unsafe(buf.as_ptr(), 21, 0xff, 9), 21);
            assert_eq!(accumulate8_unsafe(buf.as_ptr(), 21), 9 * 21);
            assert_eq!(accumulate8_greater_unsafe(buf.as_ptr(), 21, 8), 9 * 21);

            let all = NibbleLookupTable::new([1; 16]);
            assert_eq!(count_nibbles_in_set_unsafe(buf.as_ptr(), 21, &all), 42);
            assert_eq!(count_nibbles_in_two_sets_unsafe(buf.as_ptr(), 21, &all, &all), (42, 42));
            assert_eq!(count_unpacked_nibbles_in_set_unsafe(buf.as_ptr(), 21, &all), 21);
            assert_eq!(
                count_unpacked_nibbles_in_two_sets_unsafe(buf.as_ptr(), 21, &all, &all),
                (21, 21)
            );
        }
    }
}
