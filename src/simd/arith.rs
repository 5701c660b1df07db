//! Modular byte arithmetic with a constant.

use super::kernel::{map_inplace, map_into, map_raw, map_raw_inplace};
use super::ops::{AddConst, SubFromConst};
use crate::error::{check_same_len, Result};

/// `dst[i] = src[i] + val` (mod 256).
pub fn add_const8(dst: &mut [u8], src: &[u8], val: u8) -> Result<()> {
    check_same_len("add_const8", dst.len(), src.len())?;
    map_into(AddConst(val), dst, src);
    Ok(())
}

/// `main[i] += val` (mod 256).
pub fn add_const8_inplace(main: &mut [u8], val: u8) {
    map_inplace(AddConst(val), main);
}

/// Unchecked [`add_const8`] over `len` bytes.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of
/// `round_up_pow2(len, 16)` bytes, and they must not overlap. Bytes of
/// `dst` past `len` may be overwritten.
pub unsafe fn add_const8_unsafe(dst: *mut u8, src: *const u8, len: usize, val: u8) {
    unsafe { map_raw(AddConst(val), dst, src, len) }
}

/// Unchecked [`add_const8_inplace`] over `len` bytes.
///
/// # Safety
///
/// `main` must be valid for reads and writes of `round_up_pow2(len, 16)`
/// bytes. Bytes past `len` may be modified.
pub unsafe fn add_const8_unsafe_inplace(main: *mut u8, len: usize, val: u8) {
    unsafe { map_raw_inplace(AddConst(val), main, len) }
}

/// `dst[i] = val - src[i]` (mod 256).
pub fn subtract_from_const8(dst: &mut [u8], src: &[u8], val: u8) -> Result<()> {
    check_same_len("subtract_from_const8", dst.len(), src.len())?;
    map_into(SubFromConst(val), dst, src);
    Ok(())
}

/// `main[i] = val - main[i]` (mod 256).
pub fn subtract_from_const8_inplace(main: &mut [u8], val: u8) {
    map_inplace(SubFromConst(val), main);
}

/// Unchecked [`subtract_from_const8`] over `len` bytes.
///
/// # Safety
///
/// Same as [`add_const8_unsafe`].
pub unsafe fn subtract_from_const8_unsafe(dst: *mut u8, src: *const u8, len: usize, val: u8) {
    unsafe { map_raw(SubFromConst(val), dst, src, len) }
}

/// Unchecked [`subtract_from_const8_inplace`] over `len` bytes.
///
/// # Safety
///
/// Same as [`add_const8_unsafe_inplace`].
pub unsafe fn subtract_from_const8_unsafe_inplace(main: *mut u8, len: usize, val: u8) {
    unsafe { map_raw_inplace(SubFromConst(val), main, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimdBuf;

    #[test]
    fn test_add_const8_wraps() {
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![0u8; 256];
        add_const8(&mut dst, &src, 1).unwrap();
        assert_eq!(dst[0], 1);
        assert_eq!(dst[255], 0);
    }

    #[test]
    fn test_subtract_twice_restores() {
        for len in [0, 5, 16, 17, 31, 100] {
            let orig: Vec<u8> = (0..len).map(|i| (i * 13) as u8).collect();
            let mut main = orig.clone();
            subtract_from_const8_inplace(&mut main, 77);
            subtract_from_const8_inplace(&mut main, 77);
            assert_eq!(main, orig, "len {}", len);
        }
    }

    #[test]
    fn test_inplace_tail_not_applied_twice() {
        // lengths 17..=31 overlap the tail window with the main loop
        for len in 17..32 {
            let mut main = vec![10u8; len];
            add_const8_inplace(&mut main, 3);
            assert!(main.iter().all(|&b| b == 13), "len {}", len);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let mut dst = vec![0u8; 20];
        assert!(add_const8(&mut dst, &[0u8; 19], 1).is_err());
        assert!(subtract_from_const8(&mut dst, &[0u8; 21], 1).is_err());
        assert!(dst.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unsafe_variants() {
        let src = SimdBuf::from_slice(&[250u8; 21]);
        let mut dst = SimdBuf::allocate(21);
        unsafe { add_const8_unsafe(dst.as_mut_ptr(), src.as_ptr(), 21, 10) };
        assert!(dst.iter().all(|&b| b == 4));

        unsafe { subtract_from_const8_unsafe_inplace(dst.as_mut_ptr(), 21, 4) };
        assert!(dst.iter().all(|&b| b == 0));
    }
}
