//! Byte interleaving and bit-plane extraction.

use super::{scalar, BYTES_PER_VEC};
use crate::error::{check_len, KernelError, Result};
use std::slice;

/// `dst[2i] = even[i]` and `dst[2i + 1] = odd[i]`.
///
/// Requires `even.len() == (dst.len() + 1) / 2` and
/// `odd.len() == dst.len() / 2`.
pub fn interleave8(dst: &mut [u8], even: &[u8], odd: &[u8]) -> Result<()> {
    let n = dst.len();
    let even_len = (n + 1) / 2;
    let odd_len = n / 2;
    check_len("interleave8", "even", even.len(), even_len)?;
    check_len("interleave8", "odd", odd.len(), odd_len)?;
    if odd_len < BYTES_PER_VEC {
        scalar::interleave8(&mut dst[..2 * odd_len], &even[..odd_len], odd);
    } else {
        simd_dispatch!(
            sse42 => sse::interleave8(dst.as_mut_ptr(), even.as_ptr(), odd.as_ptr(), odd_len),
            _ => scalar::interleave8(&mut dst[..2 * odd_len], &even[..odd_len], odd)
        );
    }
    if even_len != odd_len {
        dst[n - 1] = even[odd_len];
    }
    Ok(())
}

/// Unchecked [`interleave8`] producing `dst_len` bytes.
///
/// # Safety
///
/// `even` must hold `(dst_len + 1) / 2` bytes and `odd` must hold
/// `dst_len / 2` bytes, each valid for reads of `round_up_pow2(len + 1, 16)`
/// bytes where `len` is its own length. `dst` must be valid for writes of
/// `round_up_pow2(dst_len + 1, 16)` bytes and overlap neither source. Bytes
/// of `dst` past `dst_len` may be overwritten.
pub unsafe fn interleave8_unsafe(dst: *mut u8, even: *const u8, odd: *const u8, dst_len: usize) {
    simd_dispatch!(
        sse42 => sse::interleave8_unsafe(dst, even, odd, dst_len),
        _ => unsafe {
            scalar::interleave8(
                slice::from_raw_parts_mut(dst, dst_len),
                slice::from_raw_parts(even, (dst_len + 1) / 2),
                slice::from_raw_parts(odd, dst_len / 2),
            )
        }
    )
}

/// Pack bit `bit_idx` of every byte of `src` into `dst`, least significant
/// bit first.
///
/// Requires `dst.len() >= (src.len() + 7) / 8` and `bit_idx <= 7`. When
/// `src.len()` is not a multiple of 8 the unused high bits of the last
/// written byte are zero. Bytes of `dst` past the required length are left
/// untouched.
///
/// ```rust
/// use bytekern::simd::bit_from_every_byte;
///
/// let src = [0x1f, 0x33, 0x0d, 0x00, 0x51, 0xcc, 0x34, 0x59, 0x44];
/// let mut dst = [0xffu8; 3];
/// bit_from_every_byte(&mut dst, &src, 2).unwrap();
/// assert_eq!(dst, [0x65, 0x01, 0xff]);
/// ```
pub fn bit_from_every_byte(dst: &mut [u8], src: &[u8], bit_idx: u32) -> Result<()> {
    let required = (src.len() + 7) / 8;
    if dst.len() < required {
        return Err(KernelError::invalid_argument(format!(
            "bit_from_every_byte() requires dst length >= {}, got {}",
            required,
            dst.len()
        )));
    }
    if bit_idx > 7 {
        return Err(KernelError::invalid_argument(format!(
            "bit_from_every_byte() requires bit_idx <= 7, got {}",
            bit_idx
        )));
    }

    let n_vec_bytes = src.len() & !(BYTES_PER_VEC - 1);
    if n_vec_bytes != 0 {
        simd_dispatch!(
            sse42 => sse::bit_from_every_byte(dst.as_mut_ptr(), src.as_ptr(), bit_idx, n_vec_bytes),
            _ => scalar::bit_from_every_byte(dst, &src[..n_vec_bytes], bit_idx)
        );
    }
    if n_vec_bytes != src.len() {
        scalar::bit_from_every_byte(&mut dst[n_vec_bytes / 8..required], &src[n_vec_bytes..], bit_idx);
    }
    Ok(())
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use crate::simd::raw::{load_vec, store_vec};
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    /// `odd_len >= 16` pairs; the last chunk overlaps the one before it.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn interleave8(dst: *mut u8, even: *const u8, odd: *const u8, odd_len: usize) {
        unsafe {
            let last = odd_len - BYTES_PER_VEC;
            let mut off = 0;
            while off < last {
                let e = load_vec(even, off);
                let o = load_vec(odd, off);
                store_vec(dst, 2 * off, _mm_unpacklo_epi8(e, o));
                store_vec(dst, 2 * off + BYTES_PER_VEC, _mm_unpackhi_epi8(e, o));
                off += BYTES_PER_VEC;
            }
            let e = load_vec(even, last);
            let o = load_vec(odd, last);
            store_vec(dst, 2 * last, _mm_unpacklo_epi8(e, o));
            store_vec(dst, 2 * last + BYTES_PER_VEC, _mm_unpackhi_epi8(e, o));
        }
    }

    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn interleave8_unsafe(dst: *mut u8, even: *const u8, odd: *const u8, dst_len: usize) {
        unsafe {
            let mut off = 0;
            while 2 * off < dst_len {
                let e = load_vec(even, off);
                let o = load_vec(odd, off);
                store_vec(dst, 2 * off, _mm_unpacklo_epi8(e, o));
                if 2 * off + BYTES_PER_VEC < dst_len {
                    store_vec(dst, 2 * off + BYTES_PER_VEC, _mm_unpackhi_epi8(e, o));
                }
                off += BYTES_PER_VEC;
            }
        }
    }

    /// Two destination bytes per 16 source bytes; `n_vec_bytes` is a
    /// multiple of 16.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn bit_from_every_byte(dst: *mut u8, src: *const u8, bit_idx: u32, n_vec_bytes: usize) {
        unsafe {
            // moves the wanted bit of each byte to its top bit
            let shift = _mm_cvtsi32_si128((7 - bit_idx) as i32);
            let mut off = 0;
            while off < n_vec_bytes {
                let v = _mm_sll_epi64(load_vec(src, off), shift);
                let bits = (_mm_movemask_epi8(v) as u16).to_le_bytes();
                dst.add(off / 8).copy_from_nonoverlapping(bits.as_ptr(), 2);
                off += BYTES_PER_VEC;
            }
        }
    }
}
