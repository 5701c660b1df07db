//! Tier dispatch for the map, zip and score families.
//!
//! The safe runners pick the scalar loop below one vector and the SSE
//! driver with an overlapping tail above it; the raw runners hand whole
//! vectors to the SSE driver.

use super::ops::{map_bytes, map_bytes_inplace, score_bytes, zip_bytes, zip_bytes_inplace};
use crate::system::BYTES_PER_VEC;
use std::slice;

#[cfg(target_arch = "x86_64")]
use super::lanes;
#[cfg(not(target_arch = "x86_64"))]
use super::ops::{ByteMap, ByteScore, ByteZip};

#[cfg(target_arch = "x86_64")]
pub(crate) trait MapOp: lanes::VecMap {}
#[cfg(target_arch = "x86_64")]
impl<T: lanes::VecMap> MapOp for T {}

#[cfg(target_arch = "x86_64")]
pub(crate) trait ZipOp: lanes::VecZip {}
#[cfg(target_arch = "x86_64")]
impl<T: lanes::VecZip> ZipOp for T {}

#[cfg(target_arch = "x86_64")]
pub(crate) trait ScoreOp<const N: usize>: lanes::VecScore<N> {}
#[cfg(target_arch = "x86_64")]
impl<T: lanes::VecScore<N>, const N: usize> ScoreOp<N> for T {}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) trait MapOp: ByteMap {}
#[cfg(not(target_arch = "x86_64"))]
impl<T: ByteMap> MapOp for T {}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) trait ZipOp: ByteZip {}
#[cfg(not(target_arch = "x86_64"))]
impl<T: ByteZip> ZipOp for T {}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) trait ScoreOp<const N: usize>: ByteScore<N> {}
#[cfg(not(target_arch = "x86_64"))]
impl<T: ByteScore<N>, const N: usize> ScoreOp<N> for T {}

/// `dst.len() == src.len()` already checked
pub(crate) fn map_into<M: MapOp>(op: M, dst: &mut [u8], src: &[u8]) {
    let n = dst.len();
    if n < BYTES_PER_VEC {
        map_bytes(op, dst, src);
        return;
    }
    simd_dispatch!(
        sse42 => lanes::map_safe(op, dst.as_mut_ptr(), src.as_ptr(), n),
        _ => map_bytes(op, dst, src)
    )
}

pub(crate) fn map_inplace<M: MapOp>(op: M, main: &mut [u8]) {
    let n = main.len();
    if n < BYTES_PER_VEC {
        map_bytes_inplace(op, main);
        return;
    }
    simd_dispatch!(
        sse42 => {
            let p = main.as_mut_ptr();
            lanes::map_safe(op, p, p, n)
        },
        _ => map_bytes_inplace(op, main)
    )
}

/// # Safety
///
/// `dst` and `src` valid for `round_up_pow2(len, 16)` bytes, not overlapping.
pub(crate) unsafe fn map_raw<M: MapOp>(op: M, dst: *mut u8, src: *const u8, len: usize) {
    simd_dispatch!(
        sse42 => lanes::map_unsafe(op, dst, src, len),
        _ => unsafe {
            map_bytes(op, slice::from_raw_parts_mut(dst, len), slice::from_raw_parts(src, len))
        }
    )
}

/// # Safety
///
/// `main` valid for `round_up_pow2(len, 16)` bytes.
pub(crate) unsafe fn map_raw_inplace<M: MapOp>(op: M, main: *mut u8, len: usize) {
    simd_dispatch!(
        sse42 => lanes::map_unsafe(op, main, main, len),
        _ => map_bytes_inplace(op, unsafe { slice::from_raw_parts_mut(main, len) })
    )
}

/// All three lengths already checked equal
pub(crate) fn zip_into<Z: ZipOp>(op: Z, dst: &mut [u8], a: &[u8], b: &[u8]) {
    let n = dst.len();
    if n < BYTES_PER_VEC {
        zip_bytes(op, dst, a, b);
        return;
    }
    simd_dispatch!(
        sse42 => lanes::zip_safe(op, dst.as_mut_ptr(), a.as_ptr(), b.as_ptr(), n),
        _ => zip_bytes(op, dst, a, b)
    )
}

pub(crate) fn zip_inplace<Z: ZipOp>(op: Z, main: &mut [u8], arg: &[u8]) {
    let n = main.len();
    if n < BYTES_PER_VEC {
        zip_bytes_inplace(op, main, arg);
        return;
    }
    simd_dispatch!(
        sse42 => {
            let p = main.as_mut_ptr();
            lanes::zip_safe(op, p, p, arg.as_ptr(), n)
        },
        _ => zip_bytes_inplace(op, main, arg)
    )
}

/// # Safety
///
/// All pointers valid for `round_up_pow2(len, 16)` bytes; `dst` overlaps
/// neither source.
pub(crate) unsafe fn zip_raw<Z: ZipOp>(op: Z, dst: *mut u8, a: *const u8, b: *const u8, len: usize) {
    simd_dispatch!(
        sse42 => lanes::zip_unsafe(op, dst, a, b, len),
        _ => unsafe {
            zip_bytes(
                op,
                slice::from_raw_parts_mut(dst, len),
                slice::from_raw_parts(a, len),
                slice::from_raw_parts(b, len),
            )
        }
    )
}

/// # Safety
///
/// Both pointers valid for `round_up_pow2(len, 16)` bytes, not overlapping.
pub(crate) unsafe fn zip_raw_inplace<Z: ZipOp>(op: Z, main: *mut u8, arg: *const u8, len: usize) {
    simd_dispatch!(
        sse42 => lanes::zip_unsafe(op, main, main, arg, len),
        _ => unsafe {
            zip_bytes_inplace(op, slice::from_raw_parts_mut(main, len), slice::from_raw_parts(arg, len))
        }
    )
}

pub(crate) fn score<S: ScoreOp<N>, const N: usize>(op: S, src: &[u8]) -> [u64; N] {
    let n = src.len();
    if n < BYTES_PER_VEC {
        return score_bytes(op, src);
    }
    simd_dispatch!(
        sse42 => lanes::score_safe(op, src.as_ptr(), n),
        _ => score_bytes(op, src)
    )
}

/// # Safety
///
/// `src` valid for reads of `round_up_pow2(len, 16)` bytes.
pub(crate) unsafe fn score_raw<S: ScoreOp<N>, const N: usize>(
    op: S,
    src: *const u8,
    len: usize,
) -> [u64; N] {
    simd_dispatch!(
        sse42 => lanes::score_unsafe(op, src, len),
        _ => score_bytes(op, unsafe { slice::from_raw_parts(src, len) })
    )
}
