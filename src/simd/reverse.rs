//! Byte-order reversal.

use super::{scalar, BYTES_PER_VEC, BYTES_PER_WORD};
use crate::error::{check_same_len, Result};
use std::slice;

/// `dst[i] = src[n - 1 - i]`, lengths equal.
pub fn reverse8(dst: &mut [u8], src: &[u8]) -> Result<()> {
    check_same_len("reverse8", dst.len(), src.len())?;
    unsafe { reverse8_unsafe(dst.as_mut_ptr(), src.as_ptr(), src.len()) };
    Ok(())
}

/// Reverse `len` bytes from `src` into `dst`.
///
/// Unlike the other unchecked kernels this one never touches bytes past
/// `len`; it only skips the length check of [`reverse8`].
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of `len` bytes, and
/// they must not overlap.
pub unsafe fn reverse8_unsafe(dst: *mut u8, src: *const u8, len: usize) {
    if len < BYTES_PER_WORD {
        unsafe { scalar::reverse8(slice::from_raw_parts_mut(dst, len), slice::from_raw_parts(src, len)) };
        return;
    }
    if len < BYTES_PER_VEC {
        unsafe { reverse_words(dst, src, len) };
        return;
    }
    simd_dispatch!(
        sse42 => sse::reverse8(dst, src, len),
        _ => unsafe {
            scalar::reverse8(slice::from_raw_parts_mut(dst, len), slice::from_raw_parts(src, len))
        }
    )
}

/// Reverse the bytes of `main`.
pub fn reverse8_inplace(main: &mut [u8]) {
    let n = main.len();
    if n < 2 * BYTES_PER_VEC {
        main.reverse();
        return;
    }
    let done = simd_dispatch!(
        sse42 => sse::reverse8_inplace(main.as_mut_ptr(), n),
        _ => 0
    );
    main[done..n - done].reverse();
}

/// 8..16 bytes as two byte-swapped, possibly overlapping words.
unsafe fn reverse_words(dst: *mut u8, src: *const u8, len: usize) {
    use super::raw::{load_word, store_word};
    unsafe {
        let last = len - BYTES_PER_WORD;
        let head = load_word(src, 0).swap_bytes();
        let tail = load_word(src, last).swap_bytes();
        store_word(dst, 0, tail);
        store_word(dst, last, head);
    }
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use crate::simd::raw::{load_vec, store_vec};
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    #[inline(always)]
    unsafe fn reverse_vec(v: __m128i) -> __m128i {
        unsafe {
            let rev = _mm_set_epi8(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);
            _mm_shuffle_epi8(v, rev)
        }
    }

    /// `len >= 16`; the last destination vector overlaps the one before it.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn reverse8(dst: *mut u8, src: *const u8, len: usize) {
        unsafe {
            let mut off = 0;
            while off + BYTES_PER_VEC <= len {
                store_vec(dst, off, reverse_vec(load_vec(src, len - BYTES_PER_VEC - off)));
                off += BYTES_PER_VEC;
            }
            if off < len {
                store_vec(dst, len - BYTES_PER_VEC, reverse_vec(load_vec(src, 0)));
            }
        }
    }

    /// Swaps vectors from both ends while at least two fit between them.
    /// Returns how many bytes were handled at each end.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn reverse8_inplace(main: *mut u8, len: usize) -> usize {
        unsafe {
            let mut lo = 0;
            let mut hi = len;
            while hi - lo >= 2 * BYTES_PER_VEC {
                let a = load_vec(main, lo);
                let b = load_vec(main, hi - BYTES_PER_VEC);
                store_vec(main, lo, reverse_vec(b));
                store_vec(main, hi - BYTES_PER_VEC, reverse_vec(a));
                lo += BYTES_PER_VEC;
                hi -= BYTES_PER_VEC;
            }
            lo
        }
    }
}
