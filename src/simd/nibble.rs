//! Table lookups on unpacked bytes and on packed nibble pairs.

use super::kernel::{map_inplace, map_into, map_raw, map_raw_inplace};
use super::lookup::NibbleLookupTable;
use super::ops::Lookup;
use super::scalar;
use crate::error::{check_len, check_same_len, Result};
use std::slice;

/// `dst[i] = table[src[i] & 15]` if `src[i] < 128`, else 0.
///
/// Intended for `src` bytes in 0..=15; the rule for larger bytes follows
/// the byte-shuffle instruction and is the same on every tier.
pub fn unpacked_nibble_lookup(dst: &mut [u8], src: &[u8], table: &NibbleLookupTable) -> Result<()> {
    check_same_len("unpacked_nibble_lookup", dst.len(), src.len())?;
    map_into(Lookup(table), dst, src);
    Ok(())
}

/// In-place [`unpacked_nibble_lookup`].
pub fn unpacked_nibble_lookup_inplace(main: &mut [u8], table: &NibbleLookupTable) {
    map_inplace(Lookup(table), main);
}

/// Unchecked [`unpacked_nibble_lookup`] over `len` bytes.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of
/// `round_up_pow2(len, 16)` bytes, without overlapping. Bytes of `dst` past
/// `len` may be overwritten.
pub unsafe fn unpacked_nibble_lookup_unsafe(
    dst: *mut u8,
    src: *const u8,
    len: usize,
    table: &NibbleLookupTable,
) {
    unsafe { map_raw(Lookup(table), dst, src, len) }
}

/// Unchecked [`unpacked_nibble_lookup_inplace`] over `len` bytes.
///
/// # Safety
///
/// `main` must be valid for reads and writes of `round_up_pow2(len, 16)`
/// bytes. Bytes past `len` may be modified.
pub unsafe fn unpacked_nibble_lookup_unsafe_inplace(main: *mut u8, len: usize, table: &NibbleLookupTable) {
    unsafe { map_raw_inplace(Lookup(table), main, len) }
}

/// `dst[2i] = table[src[i] & 15]` and `dst[2i + 1] = table[src[i] >> 4]`.
///
/// Requires `src.len() == (dst.len() + 1) / 2`. When `dst.len()` is odd the
/// high nibble of the last source byte is ignored.
///
/// ```rust
/// use bytekern::simd::{packed_nibble_lookup, NibbleLookupTable};
///
/// let table = NibbleLookupTable::new(*b"0123456789abcdef");
/// let mut dst = [0u8; 3];
/// packed_nibble_lookup(&mut dst, &[0x21, 0x03], &table).unwrap();
/// assert_eq!(&dst, b"123");
/// ```
pub fn packed_nibble_lookup(dst: &mut [u8], src: &[u8], table: &NibbleLookupTable) -> Result<()> {
    let n = dst.len();
    check_len("packed_nibble_lookup", "src", src.len(), (n + 1) / 2)?;
    let n_full = n / 2;
    if n_full < super::BYTES_PER_VEC {
        scalar::packed_nibble_lookup(dst, src, table);
        return Ok(());
    }
    simd_dispatch!(
        sse42 => sse::packed_nibble_lookup(dst.as_mut_ptr(), src.as_ptr(), n_full, table),
        _ => scalar::packed_nibble_lookup(&mut dst[..2 * n_full], &src[..n_full], table)
    );
    if n & 1 == 1 {
        dst[n - 1] = table.get(src[n_full] & 15);
    }
    Ok(())
}

/// Unchecked [`packed_nibble_lookup`] producing `dst_len` bytes from
/// `(dst_len + 1) / 2` source bytes.
///
/// # Safety
///
/// `src` must be valid for reads of `round_up_pow2(src_len + 1, 16)` bytes
/// and `dst` for writes of `round_up_pow2(dst_len + 1, 16)` bytes, without
/// overlapping. Bytes of `dst` past `dst_len` may be overwritten.
pub unsafe fn packed_nibble_lookup_unsafe(
    dst: *mut u8,
    src: *const u8,
    dst_len: usize,
    table: &NibbleLookupTable,
) {
    simd_dispatch!(
        sse42 => sse::packed_nibble_lookup_unsafe(dst, src, dst_len, table),
        _ => unsafe {
            scalar::packed_nibble_lookup(
                slice::from_raw_parts_mut(dst, dst_len),
                slice::from_raw_parts(src, (dst_len + 1) / 2),
                table,
            )
        }
    )
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use crate::simd::lookup::NibbleLookupTable;
    use crate::simd::raw::{load_vec, store_vec};
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    /// Lookups of the low and high nibbles of 16 bytes, interleaved into
    /// 32 output bytes.
    #[inline(always)]
    unsafe fn expand(table: __m128i, v: __m128i) -> (__m128i, __m128i) {
        unsafe {
            let low_mask = _mm_set1_epi8(0x0f);
            let lo = _mm_shuffle_epi8(table, _mm_and_si128(v, low_mask));
            let hi = _mm_shuffle_epi8(table, _mm_and_si128(_mm_srli_epi16(v, 4), low_mask));
            (_mm_unpacklo_epi8(lo, hi), _mm_unpackhi_epi8(lo, hi))
        }
    }

    /// `n_full >= 16` source bytes to `2 * n_full` destination bytes.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn packed_nibble_lookup(
        dst: *mut u8,
        src: *const u8,
        n_full: usize,
        table: &NibbleLookupTable,
    ) {
        unsafe {
            let t = table.load();
            let last = n_full - BYTES_PER_VEC;
            let mut off = 0;
            while off < last {
                let (a, b) = expand(t, load_vec(src, off));
                store_vec(dst, 2 * off, a);
                store_vec(dst, 2 * off + BYTES_PER_VEC, b);
                off += BYTES_PER_VEC;
            }
            let (a, b) = expand(t, load_vec(src, last));
            store_vec(dst, 2 * last, a);
            store_vec(dst, 2 * last + BYTES_PER_VEC, b);
        }
    }

    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn packed_nibble_lookup_unsafe(
        dst: *mut u8,
        src: *const u8,
        dst_len: usize,
        table: &NibbleLookupTable,
    ) {
        unsafe {
            let t = table.load();
            let mut dst_off = 0;
            while dst_off < dst_len {
                let (a, b) = expand(t, load_vec(src, dst_off / 2));
                store_vec(dst, dst_off, a);
                if dst_off + BYTES_PER_VEC < dst_len {
                    store_vec(dst, dst_off + BYTES_PER_VEC, b);
                }
                dst_off += 2 * BYTES_PER_VEC;
            }
        }
    }
}
