//! Lane-wise AND, OR, XOR and AND-NOT, between buffers or with a constant.

use super::kernel::{map_inplace, map_into, map_raw, map_raw_inplace};
use super::kernel::{zip_inplace, zip_into, zip_raw, zip_raw_inplace};
use super::ops::{And, AndConst, Invmask, Or, OrConst, Xor, XorConst};
use crate::error::{check_same_len, Result};

macro_rules! zip_kernels {
    (
        $op:expr, $name:literal, $second:literal,
        $safe:ident, $inplace:ident, $unsafe_fn:ident, $unsafe_inplace:ident,
        $doc:literal
    ) => {
        #[doc = concat!("`dst[i] = ", $doc, "`, all three lengths equal.")]
        pub fn $safe(dst: &mut [u8], src1: &[u8], src2: &[u8]) -> Result<()> {
            check_same_len($name, dst.len(), src1.len())?;
            check_same_len($name, dst.len(), src2.len())?;
            zip_into($op, dst, src1, src2);
            Ok(())
        }

        #[doc = concat!("In-place form of [`", $name, "`], `src1` being `main` and `src2` being `", $second, "`.")]
        pub fn $inplace(main: &mut [u8], arg: &[u8]) -> Result<()> {
            check_same_len(concat!($name, "_inplace"), main.len(), arg.len())?;
            zip_inplace($op, main, arg);
            Ok(())
        }

        #[doc = concat!("Unchecked [`", $name, "`] over `len` bytes.")]
        ///
        /// # Safety
        ///
        /// `src1` and `src2` must be valid for reads and `dst` for writes of
        /// `round_up_pow2(len, 16)` bytes, and `dst` must not overlap either
        /// source. Bytes of `dst` past `len` may be overwritten.
        pub unsafe fn $unsafe_fn(dst: *mut u8, src1: *const u8, src2: *const u8, len: usize) {
            unsafe { zip_raw($op, dst, src1, src2, len) }
        }

        #[doc = concat!("Unchecked in-place [`", $name, "`] over `len` bytes.")]
        ///
        /// # Safety
        ///
        /// `main` must be valid for reads and writes and `arg` for reads of
        /// `round_up_pow2(len, 16)` bytes, without overlapping. Bytes of
        /// `main` past `len` may be modified.
        pub unsafe fn $unsafe_inplace(main: *mut u8, arg: *const u8, len: usize) {
            unsafe { zip_raw_inplace($op, main, arg, len) }
        }
    };
}

macro_rules! const_kernels {
    (
        $op:ident, $name:literal,
        $safe:ident, $inplace:ident, $unsafe_fn:ident, $unsafe_inplace:ident,
        $sym:literal
    ) => {
        #[doc = concat!("`dst[i] = src[i] ", $sym, " val`, lengths equal.")]
        pub fn $safe(dst: &mut [u8], src: &[u8], val: u8) -> Result<()> {
            check_same_len($name, dst.len(), src.len())?;
            map_into($op(val), dst, src);
            Ok(())
        }

        #[doc = concat!("`main[i] ", $sym, "= val`")]
        pub fn $inplace(main: &mut [u8], val: u8) {
            map_inplace($op(val), main);
        }

        #[doc = concat!("Unchecked [`", $name, "`] over `len` bytes.")]
        ///
        /// # Safety
        ///
        /// `src` must be valid for reads and `dst` for writes of
        /// `round_up_pow2(len, 16)` bytes, without overlapping. Bytes of
        /// `dst` past `len` may be overwritten.
        pub unsafe fn $unsafe_fn(dst: *mut u8, src: *const u8, len: usize, val: u8) {
            unsafe { map_raw($op(val), dst, src, len) }
        }

        #[doc = concat!("Unchecked in-place [`", $name, "`] over `len` bytes.")]
        ///
        /// # Safety
        ///
        /// `main` must be valid for reads and writes of
        /// `round_up_pow2(len, 16)` bytes. Bytes past `len` may be modified.
        pub unsafe fn $unsafe_inplace(main: *mut u8, len: usize, val: u8) {
            unsafe { map_raw_inplace($op(val), main, len) }
        }
    };
}

zip_kernels!(And, "and", "arg", and, and_inplace, and_unsafe, and_unsafe_inplace, "src1[i] & src2[i]");
zip_kernels!(Or, "or", "arg", or, or_inplace, or_unsafe, or_unsafe_inplace, "src1[i] | src2[i]");
zip_kernels!(Xor, "xor", "arg", xor, xor_inplace, xor_unsafe, xor_unsafe_inplace, "src1[i] ^ src2[i]");
zip_kernels!(
    Invmask, "invmask", "mask",
    invmask, invmask_inplace, invmask_unsafe, invmask_unsafe_inplace,
    "src1[i] & !src2[i]"
);

const_kernels!(AndConst, "and_const8", and_const8, and_const8_inplace, and_const8_unsafe, and_const8_unsafe_inplace, "&");
const_kernels!(OrConst, "or_const8", or_const8, or_const8_inplace, or_const8_unsafe, or_const8_unsafe_inplace, "|");
const_kernels!(XorConst, "xor_const8", xor_const8, xor_const8_inplace, xor_const8_unsafe, xor_const8_unsafe_inplace, "^");
