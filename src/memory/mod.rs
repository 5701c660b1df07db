//! Memory management for the unsafe kernels
//!
//! [`SimdBuf`] is the sanctioned way to obtain buffers for the `*_unsafe`
//! kernels: its capacity always exceeds its length by a full vector.

pub mod simd_buf;

pub use simd_buf::SimdBuf;
