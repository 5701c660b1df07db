//! # bytekern: SIMD byte-array kernels
//!
//! Vectorized primitives over raw byte buffers: set, compare, count,
//! bitwise, nibble lookup, reverse, interleave, arithmetic and bit
//! extraction. Each kernel has a safe slice-based entry point and, where
//! over-reading buys speed, an unchecked `*_unsafe` twin.
//!
//! ## Key Features
//!
//! - **Runtime tier selection**: SSE4.2 kernels on x86_64 CPUs that support
//!   them, portable scalar kernels everywhere else, chosen once per process
//! - **Identical results on every tier**: the [`simd::scalar`] kernels are
//!   the reference the vector kernels are tested against
//! - **Over-read friendly buffers**: [`SimdBuf`] always carries the slack
//!   the unchecked kernels may touch past the logical end
//! - **Configuration**: [`SimdConfig`] from code, environment or JSON file
//!
//! ## Quick Start
//!
//! ```rust
//! use bytekern::simd::{count2_bytes, reverse8_inplace, xor_const8_inplace};
//! use bytekern::SimdBuf;
//!
//! bytekern::init().unwrap();
//!
//! let mut seq = SimdBuf::from_slice(b"GATTACA");
//! reverse8_inplace(&mut seq);
//! assert_eq!(&seq[..], b"ACATTAG");
//! assert_eq!(count2_bytes(&seq, b'A', b'T'), 5);
//!
//! xor_const8_inplace(&mut seq, 0x20);
//! assert_eq!(&seq[..], b"acattag");
//!
//! // unchecked kernels may touch up to 15 bytes past the end of a SimdBuf
//! let n = seq.len();
//! unsafe { bytekern::simd::add_const8_unsafe_inplace(seq.as_mut_ptr(), n, 1) };
//! assert_eq!(&seq[..], b"bdbuubh");
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod memory;
pub mod simd;
pub mod system;

// Re-export core types
pub use config::{Config, SimdConfig};
pub use error::{KernelError, Result};
pub use memory::SimdBuf;
pub use simd::NibbleLookupTable;
pub use system::{simd_caps, try_init, SimdCaps, SimdTier};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the kernel tier from `BYTEKERN_*` environment variables.
///
/// Calling this is optional: the first kernel call initializes the same
/// way, but panics where this returns an error.
pub fn init() -> Result<&'static SimdCaps> {
    let caps = try_init(&SimdConfig::from_env()?)?;
    log::debug!("Initializing bytekern v{} with {} kernels", VERSION, caps.tier());
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        let caps = init().unwrap();
        assert_eq!(caps.tier(), system::active_tier());
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_scalar_only_feature_forces_scalar() {
        if cfg!(feature = "scalar-only") || !cfg!(target_arch = "x86_64") {
            assert_eq!(system::active_tier(), SimdTier::Scalar);
        }
    }
}
