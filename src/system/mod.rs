//! # System Integration
//!
//! CPU feature detection and the process-wide kernel tier. Every kernel
//! reads the tier through [`simd_caps`], which detects the CPU once and
//! never changes its answer.

pub mod cpu_features;

pub use cpu_features::{
    active_tier, bytes_per_vec, get_cpu_features, has_cpu_feature, log2_bytes_per_vec,
    simd_caps, try_init, CpuFeature, CpuFeatureSet, RuntimeCpuFeatures, SimdCaps, SimdTier,
    BYTES_PER_VEC, LOG2_BYTES_PER_VEC,
};
