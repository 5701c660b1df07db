//! Unaligned vector and word access at byte offsets.
//!
//! All pointer arithmetic of the kernels goes through these helpers. Each
//! one requires `base + offset .. base + offset + width` to be valid for the
//! access it performs.

use std::ptr;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{__m128i, _mm_loadu_si128, _mm_storeu_si128};

/// Load 16 bytes from `base + offset`.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) unsafe fn load_vec(base: *const u8, offset: usize) -> __m128i {
    unsafe { _mm_loadu_si128(base.add(offset) as *const __m128i) }
}

/// Store 16 bytes to `base + offset`.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) unsafe fn store_vec(base: *mut u8, offset: usize, v: __m128i) {
    unsafe { _mm_storeu_si128(base.add(offset) as *mut __m128i, v) }
}

/// Load 8 bytes from `base + offset` as a little-endian word, so byte `i`
/// of memory lands in bits `8 * i .. 8 * i + 8`.
#[inline(always)]
pub(crate) unsafe fn load_word(base: *const u8, offset: usize) -> u64 {
    u64::from_le(unsafe { ptr::read_unaligned(base.add(offset) as *const u64) })
}

/// Store a little-endian word to `base + offset`.
#[inline(always)]
pub(crate) unsafe fn store_word(base: *mut u8, offset: usize, word: u64) {
    unsafe { ptr::write_unaligned(base.add(offset) as *mut u64, word.to_le()) }
}
