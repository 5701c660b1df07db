//! Scans for the first unequal, greater or lesser-or-equal byte.
//!
//! These are tuned for inputs where the sought byte is rare; when it shows
//! up within the first few positions a plain loop is just as fast.

use super::{scalar, BYTES_PER_VEC};
use crate::error::{check_same_len, Result};
use std::slice;

/// First position `pos >= start` where `a[pos] != b[pos]`, or `a.len()` if
/// there is none (including when `start >= a.len()`).
///
/// Returns [`KernelError::InvalidArgument`](crate::error::KernelError) if
/// the slices differ in length.
pub fn first_unequal8(a: &[u8], b: &[u8], start: usize) -> Result<usize> {
    check_same_len("first_unequal8", a.len(), b.len())?;
    let end = a.len();
    if start >= end {
        return Ok(end);
    }
    if end - start < super::BYTES_PER_WORD {
        return Ok(scalar::first_unequal8(a, b, start));
    }
    Ok(simd_dispatch!(
        sse42 => sse::first_unequal8(a.as_ptr(), b.as_ptr(), start, end),
        _ => scalar::first_unequal8(a, b, start)
    ))
}

/// Unchecked [`first_unequal8`] over `len` bytes.
///
/// # Safety
///
/// `a` and `b` must be non-null and valid for reads of
/// `round_up_pow2(len, 16)` bytes. The scan reads whole 16-byte blocks from
/// `start & !15` on, so bytes before `start` in that block are read too.
/// The result is clamped to `len`.
pub unsafe fn first_unequal8_unsafe(a: *const u8, b: *const u8, len: usize, start: usize) -> usize {
    if start >= len {
        return len;
    }
    simd_dispatch!(
        sse42 => sse::first_unequal8_unsafe(a, b, start, len),
        _ => unsafe {
            scalar::first_unequal8(slice::from_raw_parts(a, len), slice::from_raw_parts(b, len), start)
        }
    )
}

/// First position `pos >= start` where `arg[pos] > val`, or `arg.len()`.
pub fn first_greater8(arg: &[u8], val: u8, start: usize) -> usize {
    let end = arg.len();
    if start >= end || end - start <= BYTES_PER_VEC {
        return scalar::first_greater8(arg, val, start);
    }
    simd_dispatch!(
        sse42 => sse::first_greater8(arg.as_ptr(), val, start, end),
        _ => scalar::first_greater8(arg, val, start)
    )
}

/// Unchecked [`first_greater8`] over `len` bytes.
///
/// # Safety
///
/// `arg` must be non-null and valid for reads of `round_up_pow2(len, 16)`
/// bytes.
pub unsafe fn first_greater8_unsafe(arg: *const u8, len: usize, val: u8, start: usize) -> usize {
    if start >= len {
        return len;
    }
    simd_dispatch!(
        sse42 => sse::first_greater8_unsafe(arg, val, start, len),
        _ => scalar::first_greater8(unsafe { slice::from_raw_parts(arg, len) }, val, start)
    )
}

/// First position `pos >= start` where `arg[pos] <= val`, or `arg.len()`.
pub fn first_leq8(arg: &[u8], val: u8, start: usize) -> usize {
    let end = arg.len();
    if start >= end || end - start <= BYTES_PER_VEC {
        return scalar::first_leq8(arg, val, start);
    }
    simd_dispatch!(
        sse42 => sse::first_leq8(arg.as_ptr(), val, start, end),
        _ => scalar::first_leq8(arg, val, start)
    )
}

/// Unchecked [`first_leq8`] over `len` bytes.
///
/// # Safety
///
/// `arg` must be non-null and valid for reads of `round_up_pow2(len, 16)`
/// bytes.
pub unsafe fn first_leq8_unsafe(arg: *const u8, len: usize, val: u8, start: usize) -> usize {
    if start >= len {
        return len;
    }
    simd_dispatch!(
        sse42 => sse::first_leq8_unsafe(arg, val, start, len),
        _ => scalar::first_leq8(unsafe { slice::from_raw_parts(arg, len) }, val, start)
    )
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use crate::simd::raw::{load_vec, load_word};
    use crate::simd::BYTES_PER_WORD;
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    /// Bit `i` set where lane `i` of `a` and `b` differ
    #[inline(always)]
    unsafe fn unequal_bits(a: *const u8, b: *const u8, off: usize) -> u32 {
        unsafe {
            let eq = _mm_cmpeq_epi8(load_vec(a, off), load_vec(b, off));
            !(_mm_movemask_epi8(eq) as u32) & 0xffff
        }
    }

    /// Bit `i` set where lane `i` is greater than `val`
    #[inline(always)]
    unsafe fn greater_bits(arg: *const u8, off: usize, splat: __m128i) -> u32 {
        unsafe {
            let excess = _mm_subs_epu8(load_vec(arg, off), splat);
            !(_mm_movemask_epi8(_mm_cmpeq_epi8(excess, _mm_setzero_si128())) as u32) & 0xffff
        }
    }

    /// Bit `i` set where lane `i` is at most `val`
    #[inline(always)]
    unsafe fn leq_bits(arg: *const u8, off: usize, splat: __m128i) -> u32 {
        unsafe {
            let excess = _mm_subs_epu8(load_vec(arg, off), splat);
            _mm_movemask_epi8(_mm_cmpeq_epi8(excess, _mm_setzero_si128())) as u32
        }
    }

    /// `end - start >= 8`
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_unequal8(a: *const u8, b: *const u8, start: usize, end: usize) -> usize {
        unsafe {
            let n = end - start;
            if n < BYTES_PER_VEC {
                let diff = load_word(a, start) ^ load_word(b, start);
                if diff != 0 {
                    return start + (diff.trailing_zeros() >> 3) as usize;
                }
                let last = end - BYTES_PER_WORD;
                let diff = load_word(a, last) ^ load_word(b, last);
                if diff != 0 {
                    return last + (diff.trailing_zeros() >> 3) as usize;
                }
                return end;
            }
            let last = end - BYTES_PER_VEC;
            let mut off = start;
            while off < last {
                let bits = unequal_bits(a, b, off);
                if bits != 0 {
                    return off + bits.trailing_zeros() as usize;
                }
                off += BYTES_PER_VEC;
            }
            let bits = unequal_bits(a, b, last);
            if bits != 0 {
                return last + bits.trailing_zeros() as usize;
            }
            end
        }
    }

    /// Bits of the first vector at or after `start`, for a scan that
    /// begins at the aligned offset `start & !15`.
    #[inline(always)]
    fn head_mask(start: usize) -> u32 {
        (0xffff << (start & (BYTES_PER_VEC - 1))) & 0xffff
    }

    /// `start < end`; loads whole aligned vectors, so reads stop at
    /// `round_up_pow2(end, 16)`.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_unequal8_unsafe(
        a: *const u8,
        b: *const u8,
        start: usize,
        end: usize,
    ) -> usize {
        unsafe {
            let mut off = start & !(BYTES_PER_VEC - 1);
            let mut bits = unequal_bits(a, b, off) & head_mask(start);
            loop {
                if bits != 0 {
                    return (off + bits.trailing_zeros() as usize).min(end);
                }
                off += BYTES_PER_VEC;
                if off >= end {
                    return end;
                }
                bits = unequal_bits(a, b, off);
            }
        }
    }

    /// `end - start > 16`
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_greater8(arg: *const u8, val: u8, start: usize, end: usize) -> usize {
        unsafe {
            let splat = _mm_set1_epi8(val as i8);
            let last = end - BYTES_PER_VEC;
            let mut off = start;
            while off < last {
                let bits = greater_bits(arg, off, splat);
                if bits != 0 {
                    return off + bits.trailing_zeros() as usize;
                }
                off += BYTES_PER_VEC;
            }
            let bits = greater_bits(arg, last, splat);
            if bits != 0 {
                return last + bits.trailing_zeros() as usize;
            }
            end
        }
    }

    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_greater8_unsafe(
        arg: *const u8,
        val: u8,
        start: usize,
        end: usize,
    ) -> usize {
        unsafe {
            let splat = _mm_set1_epi8(val as i8);
            let mut off = start & !(BYTES_PER_VEC - 1);
            let mut bits = greater_bits(arg, off, splat) & head_mask(start);
            loop {
                if bits != 0 {
                    return (off + bits.trailing_zeros() as usize).min(end);
                }
                off += BYTES_PER_VEC;
                if off >= end {
                    return end;
                }
                bits = greater_bits(arg, off, splat);
            }
        }
    }

    /// `end - start > 16`
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_leq8(arg: *const u8, val: u8, start: usize, end: usize) -> usize {
        unsafe {
            let splat = _mm_set1_epi8(val as i8);
            let last = end - BYTES_PER_VEC;
            let mut off = start;
            while off < last {
                let bits = leq_bits(arg, off, splat);
                if bits != 0 {
                    return off + bits.trailing_zeros() as usize;
                }
                off += BYTES_PER_VEC;
            }
            let bits = leq_bits(arg, last, splat);
            if bits != 0 {
                return last + bits.trailing_zeros() as usize;
            }
            end
        }
    }

    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn first_leq8_unsafe(arg: *const u8, val: u8, start: usize, end: usize) -> usize {
        unsafe {
            let splat = _mm_set1_epi8(val as i8);
            let mut off = start & !(BYTES_PER_VEC - 1);
            let mut bits = leq_bits(arg, off, splat) & head_mask(start);
            loop {
                if bits != 0 {
                    return (off + bits.trailing_zeros() as usize).min(end);
                }
                off += BYTES_PER_VEC;
                if off >= end {
                    return end;
                }
                bits = leq_bits(arg, off, splat);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimdBuf;

    #[test]
    fn test_first_unequal8_positions() {
        for len in 0..60 {
            let a: Vec<u8> = (0..len as u8).collect();
            assert_eq!(first_unequal8(&a, &a, 0).unwrap(), len);
            for diff in 0..len {
                let mut b = a.clone();
                b[diff] ^= 0x80;
                for start in [0, diff, diff + 1] {
                    let expected = if start <= diff { diff } else { len };
                    assert_eq!(first_unequal8(&a, &b, start).unwrap(), expected);
                }
            }
        }
    }

    #[test]
    fn test_first_unequal8_errors() {
        assert!(first_unequal8(&[1, 2, 3], &[1, 2], 0).is_err());
        assert!(first_unequal8(&[1, 2], &[1, 2, 3], 0).is_err());
        assert_eq!(first_unequal8(&[1, 2], &[3, 4], 5).unwrap(), 2);
    }

    #[test]
    fn test_first_unequal8_unsafe_clamps() {
        let mut a = SimdBuf::allocate(20);
        let mut b = SimdBuf::allocate(20);
        // bytes in the slack differ but lie past len
        unsafe {
            *a.as_mut_ptr().add(22) = 1;
            *b.as_mut_ptr().add(22) = 2;
        }
        let got = unsafe { first_unequal8_unsafe(a.as_ptr(), b.as_ptr(), 20, 3) };
        assert_eq!(got, 20);
        b[19] = 7;
        let got = unsafe { first_unequal8_unsafe(a.as_ptr(), b.as_ptr(), 20, 3) };
        assert_eq!(got, 19);
    }

    #[test]
    fn test_first_greater_and_leq() {
        let mut arg = vec![10u8; 50];
        assert_eq!(first_greater8(&arg, 10, 0), 50);
        assert_eq!(first_leq8(&arg, 9, 0), 50);
        arg[33] = 200;
        arg[41] = 0;
        assert_eq!(first_greater8(&arg, 10, 0), 33);
        assert_eq!(first_greater8(&arg, 10, 34), 50);
        assert_eq!(first_leq8(&arg, 9, 0), 41);
        assert_eq!(first_leq8(&arg, 10, 7), 7);
        assert_eq!(first_greater8(&arg, 0, 100), 50);
    }

    #[test]
    fn test_unsafe_scans_stay_within_rounded_extent() {
        use crate::simd::round_up_pow2;

        for len in 1..=40usize {
            // the allocation ends exactly where the documented extent does
            let extent = round_up_pow2(len, BYTES_PER_VEC);
            let a: Vec<u8> = (0..extent).map(|i| (i as u8).wrapping_mul(37)).collect();
            let mut b = a.clone();
            b[len - 1] ^= 1;
            for start in 0..len + 2 {
                let got = unsafe { first_unequal8_unsafe(a.as_ptr(), b.as_ptr(), len, start) };
                assert_eq!(got, scalar::first_unequal8(&a[..len], &b[..len], start), "len {} start {}", len, start);
                for val in [0u8, 100, 200, 255] {
                    let got = unsafe { first_greater8_unsafe(a.as_ptr(), len, val, start) };
                    assert_eq!(got, scalar::first_greater8(&a[..len], val, start), "len {} start {}", len, start);
                    let got = unsafe { first_leq8_unsafe(a.as_ptr(), len, val, start) };
                    assert_eq!(got, scalar::first_leq8(&a[..len], val, start), "len {} start {}", len, start);
                }
            }
        }
    }

    #[test]
    fn test_first_greater_unsafe_ignores_slack() {
        let mut buf = SimdBuf::allocate(17);
        unsafe { *buf.as_mut_ptr().add(20) = 255 };
        assert_eq!(unsafe { first_greater8_unsafe(buf.as_ptr(), 17, 0, 0) }, 17);
        assert_eq!(unsafe { first_leq8_unsafe(buf.as_ptr(), 17, 0, 17) }, 17);
        assert_eq!(unsafe { first_leq8_unsafe(buf.as_ptr(), 17, 0, 16) }, 16);
    }
}
