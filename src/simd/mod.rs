//! # Byte-array kernels
//!
//! Vectorized set, compare, count, bitwise, lookup, reverse, interleave,
//! arithmetic and bit-extraction primitives over raw byte buffers.
//!
//! Every kernel comes in up to two flavors:
//!
//! - **Safe** entry points take slices, check the length relationships they
//!   document and return [`KernelError::InvalidArgument`] before touching
//!   memory when those do not hold. They never access bytes outside their
//!   slices.
//! - **Unsafe** entry points (`*_unsafe`) take raw pointers plus a length and
//!   trust the caller. They may read, and for kernels with an output also
//!   write, up to `bytes_per_vec() - 1` bytes past the logical end of each
//!   buffer. Buffers from [`SimdBuf`] always satisfy that.
//!
//! Both flavors dispatch on the process-wide [`SimdTier`]: SSE kernels on
//! the vector tier, the [`scalar`] reference kernels otherwise. Results are
//! byte-for-byte identical across tiers.
//!
//! ```rust
//! use bytekern::simd::{add_const8_inplace, first_greater8, memset8};
//!
//! let mut buf = vec![0u8; 40];
//! memset8(&mut buf, 3);
//! add_const8_inplace(&mut buf[10..], 250);
//! assert_eq!(buf[9], 3);
//! assert_eq!(buf[10], 253);
//! assert_eq!(first_greater8(&buf, 100, 0), 10);
//! ```
//!
//! [`KernelError::InvalidArgument`]: crate::error::KernelError::InvalidArgument
//! [`SimdBuf`]: crate::memory::SimdBuf
//! [`SimdTier`]: crate::system::SimdTier

#[macro_use]
mod macros;

mod kernel;
mod ops;
mod raw;

#[cfg(target_arch = "x86_64")]
mod lanes;

pub mod lookup;
pub mod scalar;

pub mod arith;
pub mod bitwise;
pub mod cmp;
pub mod count;
pub mod float;
pub mod interleave;
pub mod memset;
pub mod multibyte;
pub mod nibble;
pub mod reverse;

pub use arith::*;
pub use bitwise::*;
pub use cmp::*;
pub use count::*;
pub use float::*;
pub use interleave::*;
pub use lookup::{NibbleLookupTable, NIBBLE_LOOKUP_DUP};
pub use memset::*;
pub use multibyte::*;
pub use nibble::*;
pub use reverse::*;

pub use crate::system::{bytes_per_vec, log2_bytes_per_vec, BYTES_PER_VEC, LOG2_BYTES_PER_VEC};

/// Machine word width in bytes
pub const BYTES_PER_WORD: usize = 8;

/// log2 of [`BYTES_PER_WORD`]
pub const LOG2_BYTES_PER_WORD: u32 = 3;

/// Machine word width in bits
pub const BITS_PER_WORD: usize = BYTES_PER_WORD * 8;

/// Round `val` up to a multiple of `alignment`, which must be a power of two.
#[inline]
pub const fn round_up_pow2(val: usize, alignment: usize) -> usize {
    (val + alignment - 1) & !(alignment - 1)
}

/// Divide rounding up; `divisor` must equal `1 << log2_divisor`.
#[inline]
pub const fn div_up_pow2(dividend: usize, divisor: usize, log2_divisor: u32) -> usize {
    (dividend + divisor - 1) >> log2_divisor
}
