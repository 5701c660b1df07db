//! Kernels over 2- and 4-byte elements.

use super::{scalar, BYTES_PER_WORD};
use crate::error::{check_same_len, Result};
use std::ptr;
use std::slice;

const U16_PER_VEC: usize = 8;

/// Fill `n_elem` 2-byte elements at `dst` with `val`.
///
/// Runs of four or more elements are written a word at a time, the last
/// word overlapping the one before it; nothing past `n_elem` is written.
///
/// # Safety
///
/// `dst` must be valid for writes of `n_elem` elements.
pub unsafe fn memset16_unsafe(dst: *mut u16, n_elem: usize, val: u16) {
    if n_elem < BYTES_PER_WORD / 2 {
        for i in 0..n_elem {
            unsafe { dst.add(i).write_unaligned(val) };
        }
        return;
    }
    let word = 0x0001_0001_0001_0001u64 * val as u64;
    unsafe { fill_words(dst.cast(), n_elem * 2, word) }
}

/// Fill `n_elem` 4-byte elements at `dst` with `val`.
///
/// # Safety
///
/// `dst` must be valid for writes of `n_elem` elements.
pub unsafe fn memset32_unsafe(dst: *mut u32, n_elem: usize, val: u32) {
    if n_elem < BYTES_PER_WORD / 4 {
        if n_elem != 0 {
            unsafe { dst.write_unaligned(val) };
        }
        return;
    }
    let word = 0x0000_0001_0000_0001u64 * val as u64;
    unsafe { fill_words(dst.cast(), n_elem * 4, word) }
}

/// `n_bytes >= 8`; `word` repeats with a period dividing 8 bytes.
unsafe fn fill_words(dst: *mut u8, n_bytes: usize, word: u64) {
    let last = n_bytes - BYTES_PER_WORD;
    let mut off = 0;
    while off < last {
        unsafe { ptr::write_unaligned(dst.add(off) as *mut u64, word) };
        off += BYTES_PER_WORD;
    }
    unsafe { ptr::write_unaligned(dst.add(last) as *mut u64, word) };
}

/// Fill `dst` with `val`.
pub fn repeat_u16(dst: &mut [u16], val: u16) {
    unsafe { memset16_unsafe(dst.as_mut_ptr(), dst.len(), val) }
}

/// Fill `dst` with `val`.
pub fn repeat_i16(dst: &mut [i16], val: i16) {
    repeat_u16(as_u16_mut(dst), val as u16)
}

/// Fill `dst` with `val`.
pub fn repeat_u32(dst: &mut [u32], val: u32) {
    unsafe { memset32_unsafe(dst.as_mut_ptr(), dst.len(), val) }
}

/// Index of the first element equal to `val`.
pub fn index_u16(main: &[u16], val: u16) -> Option<usize> {
    if main.len() < U16_PER_VEC {
        return scalar::index_u16(main, val);
    }
    simd_dispatch!(
        sse42 => sse::index_u16(main.as_ptr(), main.len(), val),
        _ => scalar::index_u16(main, val)
    )
}

/// Reverse the elements of `main`.
pub fn reverse_u16_inplace(main: &mut [u16]) {
    let n = main.len();
    if n <= U16_PER_VEC {
        main.reverse();
        return;
    }
    let done = simd_dispatch!(
        sse42 => sse::reverse_u16_inplace(main.as_mut_ptr(), n),
        _ => 0
    );
    main[done..n - done].reverse();
}

/// Reverse the elements of `main`.
pub fn reverse_i16_inplace(main: &mut [i16]) {
    reverse_u16_inplace(as_u16_mut(main))
}

/// `dst[i] = src[n - 1 - i]`, lengths equal.
pub fn reverse_u16(dst: &mut [u16], src: &[u16]) -> Result<()> {
    check_same_len("reverse_u16", dst.len(), src.len())?;
    let n = src.len();
    if n < U16_PER_VEC {
        scalar::reverse_u16(dst, src);
        return Ok(());
    }
    simd_dispatch!(
        sse42 => sse::reverse_u16(dst.as_mut_ptr(), src.as_ptr(), n),
        _ => scalar::reverse_u16(dst, src)
    );
    Ok(())
}

/// `dst[i] = src[n - 1 - i]`, lengths equal.
pub fn reverse_i16(dst: &mut [i16], src: &[i16]) -> Result<()> {
    check_same_len("reverse_i16", dst.len(), src.len())?;
    let src = unsafe { slice::from_raw_parts(src.as_ptr().cast::<u16>(), src.len()) };
    reverse_u16(as_u16_mut(dst), src)
}

fn as_u16_mut(s: &mut [i16]) -> &mut [u16] {
    unsafe { slice::from_raw_parts_mut(s.as_mut_ptr().cast(), s.len()) }
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use super::U16_PER_VEC;
    use crate::simd::raw::{load_vec, store_vec};
    use crate::system::BYTES_PER_VEC;
    use std::arch::x86_64::*;

    #[inline(always)]
    unsafe fn reverse_vec(v: __m128i) -> __m128i {
        unsafe {
            let rev = _mm_set_epi8(1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14);
            _mm_shuffle_epi8(v, rev)
        }
    }

    /// `len >= 8` elements; the last window overlaps the one before it.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn index_u16(main: *const u16, len: usize, val: u16) -> Option<usize> {
        unsafe {
            let base = main.cast::<u8>();
            let needle = _mm_set1_epi16(val as i16);
            let last = len - U16_PER_VEC;
            let mut elem = 0;
            loop {
                let at = elem.min(last);
                let eq = _mm_cmpeq_epi16(load_vec(base, 2 * at), needle);
                let mask = _mm_movemask_epi8(eq) as u32;
                if mask != 0 {
                    return Some(at + mask.trailing_zeros() as usize / 2);
                }
                if at == last {
                    return None;
                }
                elem += U16_PER_VEC;
            }
        }
    }

    /// `len >= 8` elements, `dst` and `src` not overlapping.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn reverse_u16(dst: *mut u16, src: *const u16, len: usize) {
        unsafe {
            let (dst, src) = (dst.cast::<u8>(), src.cast::<u8>());
            let n_bytes = 2 * len;
            let mut off = 0;
            while off + BYTES_PER_VEC <= n_bytes {
                store_vec(dst, off, reverse_vec(load_vec(src, n_bytes - BYTES_PER_VEC - off)));
                off += BYTES_PER_VEC;
            }
            if off < n_bytes {
                store_vec(dst, n_bytes - BYTES_PER_VEC, reverse_vec(load_vec(src, 0)));
            }
        }
    }

    /// Returns the number of elements handled at each end.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn reverse_u16_inplace(main: *mut u16, len: usize) -> usize {
        unsafe {
            let main = main.cast::<u8>();
            let mut lo = 0;
            let mut hi = 2 * len;
            while hi - lo >= 2 * BYTES_PER_VEC {
                let a = load_vec(main, lo);
                let b = load_vec(main, hi - BYTES_PER_VEC);
                store_vec(main, lo, reverse_vec(b));
                store_vec(main, hi - BYTES_PER_VEC, reverse_vec(a));
                lo += BYTES_PER_VEC;
                hi -= BYTES_PER_VEC;
            }
            lo / 2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat() {
        for len in 0..30 {
            let mut a = vec![7u16; len + 1];
            repeat_u16(&mut a[..len], 0xbeef);
            assert!(a[..len].iter().all(|&x| x == 0xbeef));
            assert_eq!(a[len], 7);

            let mut b = vec![7i16; len + 1];
            repeat_i16(&mut b[..len], -2);
            assert!(b[..len].iter().all(|&x| x == -2));
            assert_eq!(b[len], 7);

            let mut c = vec![7u32; len + 1];
            repeat_u32(&mut c[..len], 0xdead_beef);
            assert!(c[..len].iter().all(|&x| x == 0xdead_beef));
            assert_eq!(c[len], 7);
        }
    }

    #[test]
    fn test_index_u16() {
        for len in 0..40 {
            let main: Vec<u16> = (0..len as u16).map(|i| i * 3).collect();
            for (i, &v) in main.iter().enumerate() {
                assert_eq!(index_u16(&main, v), Some(i), "len {}", len);
            }
            assert_eq!(index_u16(&main, 1), None);
        }
        let dup = [5u16, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9];
        assert_eq!(index_u16(&dup, 9), Some(1));
    }

    #[test]
    fn test_reverse_u16() {
        for len in 0..50 {
            let src: Vec<u16> = (0..len as u16).map(|i| i.wrapping_mul(1001)).collect();
            let expected: Vec<u16> = src.iter().rev().copied().collect();

            let mut dst = vec![0u16; len];
            reverse_u16(&mut dst, &src).unwrap();
            assert_eq!(dst, expected, "len {}", len);

            let mut main = src.clone();
            reverse_u16_inplace(&mut main);
            assert_eq!(main, expected, "len {}", len);
        }
    }

    #[test]
    fn test_reverse_i16() {
        let src: Vec<i16> = (-20..20).collect();
        let mut dst = vec![0i16; 40];
        reverse_i16(&mut dst, &src).unwrap();
        assert_eq!(dst[0], 19);
        assert_eq!(dst[39], -20);
        reverse_i16_inplace(&mut dst);
        assert_eq!(dst, src);
        assert!(reverse_i16(&mut dst[..39], &src).is_err());
    }
}
