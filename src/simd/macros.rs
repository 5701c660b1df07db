//! Tier dispatch macro
//!
//! ```ignore
//! simd_dispatch!(
//!     sse42 => sse::memset8(dst.as_mut_ptr(), dst.len(), val),
//!     _ => scalar::memset8(dst, val)
//! )
//! ```
//!
//! The `sse42` arm runs inside an `unsafe` block and is compiled only on
//! x86_64. It is selected only when the process-wide tier is
//! [`SimdTier::Sse42`](crate::system::SimdTier::Sse42), which is installed
//! after SSE2 through SSE4.2 were detected; any pointer obligations of the
//! expression remain the caller's.

/// Dispatch between the SSE kernels and the scalar fallback on the active tier.
macro_rules! simd_dispatch {
    (sse42 => $sse:expr, _ => $fallback:expr $(,)?) => {{
        match $crate::system::active_tier() {
            #[cfg(target_arch = "x86_64")]
            $crate::system::SimdTier::Sse42 => unsafe { $sse },
            _ => $fallback,
        }
    }};
}
