//! Byte fill.

use super::{scalar, BYTES_PER_WORD};
use std::slice;

/// Set every byte of `dst` to `val`.
pub fn memset8(dst: &mut [u8], val: u8) {
    let n = dst.len();
    if n < BYTES_PER_WORD {
        scalar::memset8(dst, val);
        return;
    }
    simd_dispatch!(
        sse42 => sse::memset8(dst.as_mut_ptr(), n, val),
        _ => scalar::memset8(dst, val)
    )
}

/// Set `len` bytes at `dst` to `val`, possibly also the bytes up to the next
/// multiple of 16.
///
/// # Safety
///
/// `dst` must be non-null and valid for writes of `round_up_pow2(len, 16)`
/// bytes, and the caller must not care about the bytes past `len` that get
/// overwritten.
pub unsafe fn memset8_unsafe(dst: *mut u8, len: usize, val: u8) {
    simd_dispatch!(
        sse42 => sse::memset8_unsafe(dst, len, val),
        _ => scalar::memset8(unsafe { slice::from_raw_parts_mut(dst, len) }, val)
    )
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use crate::simd::raw::{store_vec, store_word};
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    const SPLAT_WORD: u64 = 0x0101_0101_0101_0101;

    /// `len >= 8`
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn memset8(dst: *mut u8, len: usize, val: u8) {
        unsafe {
            if len < BYTES_PER_VEC {
                let word = SPLAT_WORD * val as u64;
                store_word(dst, 0, word);
                store_word(dst, len - 8, word);
                return;
            }
            let v = _mm_set1_epi8(val as i8);
            let last = len - BYTES_PER_VEC;
            let mut off = 0;
            while off < last {
                store_vec(dst, off, v);
                off += BYTES_PER_VEC;
            }
            store_vec(dst, last, v);
        }
    }

    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn memset8_unsafe(dst: *mut u8, len: usize, val: u8) {
        unsafe {
            let v = _mm_set1_epi8(val as i8);
            let mut off = 0;
            while off < len {
                store_vec(dst, off, v);
                off += BYTES_PER_VEC;
            }
        }
    }
}
