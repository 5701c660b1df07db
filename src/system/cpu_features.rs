//! # CPU Feature Detection
//!
//! Runtime detection of the instruction-set extensions the vector kernels
//! need, and the process-wide [`SimdCaps`] chosen from them. Detection runs
//! once; the selected tier is never changed afterwards.

use crate::config::{Config, SimdConfig};
use crate::error::{KernelError, Result};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Vector width of every kernel tier, in bytes.
pub const BYTES_PER_VEC: usize = 16;

/// log2 of [`BYTES_PER_VEC`].
pub const LOG2_BYTES_PER_VEC: u32 = 4;

/// CPU feature flags for runtime detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuFeature {
    SSE2,
    SSSE3,
    SSE4_1,
    SSE4_2,
    POPCNT,
}

impl CpuFeature {
    /// Human readable extension name, as printed by `/proc/cpuinfo` tools
    pub fn name(self) -> &'static str {
        match self {
            Self::SSE2 => "SSE2",
            Self::SSSE3 => "SSSE3",
            Self::SSE4_1 => "SSE4.1",
            Self::SSE4_2 => "SSE4.2",
            Self::POPCNT => "POPCNT",
        }
    }
}

/// Extensions the SSE tier cannot run without, in check order.
const SSE_TIER_FEATURES: [CpuFeature; 4] = [
    CpuFeature::SSE2,
    CpuFeature::SSSE3,
    CpuFeature::SSE4_1,
    CpuFeature::SSE4_2,
];

/// Detected CPU features
#[derive(Debug, Clone, Default)]
pub struct CpuFeatureSet {
    /// Available CPU features
    pub features: HashMap<CpuFeature, bool>,
    /// CPU vendor (Intel, AMD, ...)
    pub vendor: String,
    /// CPU model name
    pub model: String,
}

impl CpuFeatureSet {
    /// Check if a specific feature is available
    pub fn has_feature(&self, feature: CpuFeature) -> bool {
        self.features.get(&feature).copied().unwrap_or(false)
    }

    /// First extension of the SSE tier this CPU lacks, if any
    pub fn missing_sse_feature(&self, require_popcnt: bool) -> Option<CpuFeature> {
        SSE_TIER_FEATURES
            .iter()
            .copied()
            .chain(require_popcnt.then_some(CpuFeature::POPCNT))
            .find(|&f| !self.has_feature(f))
    }
}

/// Runtime CPU feature detection interface
#[derive(Debug, Default)]
pub struct RuntimeCpuFeatures;

impl RuntimeCpuFeatures {
    /// Create a new runtime feature detector
    pub fn new() -> Self {
        Self
    }

    /// Detect all available CPU features
    pub fn detect_features(&self) -> CpuFeatureSet {
        let mut features = HashMap::new();

        #[cfg(target_arch = "x86_64")]
        {
            self.detect_x86_features(&mut features);
        }

        let (vendor, model) = self.get_cpu_info();
        CpuFeatureSet {
            features,
            vendor,
            model,
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn detect_x86_features(&self, features: &mut HashMap<CpuFeature, bool>) {
        let cpuid = raw_cpuid::CpuId::new();

        if let Some(feature_info) = cpuid.get_feature_info() {
            features.insert(CpuFeature::SSE2, feature_info.has_sse2());
            features.insert(CpuFeature::SSSE3, feature_info.has_ssse3());
            features.insert(CpuFeature::SSE4_1, feature_info.has_sse41());
            features.insert(CpuFeature::SSE4_2, feature_info.has_sse42());
            features.insert(CpuFeature::POPCNT, feature_info.has_popcnt());
        }
    }

    fn get_cpu_info(&self) -> (String, String) {
        #[cfg(target_arch = "x86_64")]
        {
            let cpuid = raw_cpuid::CpuId::new();
            let vendor = cpuid
                .get_vendor_info()
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let model = cpuid
                .get_processor_brand_string()
                .map(|b| b.as_str().trim().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            (vendor, model)
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            ("Unknown".to_string(), "Unknown".to_string())
        }
    }
}

// Global CPU feature detection
static CPU_FEATURES: OnceLock<CpuFeatureSet> = OnceLock::new();

/// Get the global CPU feature set (detected once on first call)
pub fn get_cpu_features() -> &'static CpuFeatureSet {
    CPU_FEATURES.get_or_init(|| RuntimeCpuFeatures::new().detect_features())
}

/// Check if a specific CPU feature is available
pub fn has_cpu_feature(feature: CpuFeature) -> bool {
    get_cpu_features().has_feature(feature)
}

//==============================================================================
// KERNEL TIER SELECTION
//==============================================================================

/// Implementation tier every kernel dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdTier {
    /// 16-byte SSE kernels (SSE2 through SSE4.2)
    Sse42,
    /// Portable element-by-element kernels
    Scalar,
}

impl fmt::Display for SimdTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sse42 => write!(f, "sse4.2"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Process-wide kernel capabilities, fixed at initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimdCaps {
    tier: SimdTier,
    hw_popcnt: bool,
    config: SimdConfig,
}

impl SimdCaps {
    /// Choose the tier for `config` given the detected `features`.
    ///
    /// Returns [`KernelError::UnsupportedCpu`] when SIMD is enabled on x86_64
    /// and a required extension is absent.
    pub fn select(config: &SimdConfig, features: &CpuFeatureSet) -> Result<Self> {
        if !config.enable_simd || cfg!(feature = "scalar-only") {
            info!("SIMD disabled by configuration, using scalar kernels");
            return Ok(Self::scalar(config));
        }

        if !cfg!(target_arch = "x86_64") {
            debug!("No vector kernels for this architecture, using scalar kernels");
            return Ok(Self::scalar(config));
        }

        let hw_popcnt = features.has_feature(CpuFeature::POPCNT);

        if let Some(missing) = features.missing_sse_feature(config.require_popcnt) {
            return Err(KernelError::unsupported_cpu(missing.name()));
        }

        debug!(
            "Selected {} kernels ({} {}), hardware popcnt: {}",
            SimdTier::Sse42,
            features.vendor,
            features.model,
            hw_popcnt
        );
        Ok(Self {
            tier: SimdTier::Sse42,
            hw_popcnt,
            config: *config,
        })
    }

    fn scalar(config: &SimdConfig) -> Self {
        Self {
            tier: SimdTier::Scalar,
            hw_popcnt: false,
            config: *config,
        }
    }

    /// Selected tier
    #[inline]
    pub fn tier(&self) -> SimdTier {
        self.tier
    }

    /// Whether `popcnt` may use the POPCNT instruction; never on the scalar tier
    #[inline]
    pub fn has_hw_popcnt(&self) -> bool {
        self.hw_popcnt
    }

    /// Configuration the capabilities were built from
    pub fn config(&self) -> &SimdConfig {
        &self.config
    }

    /// Vector width in bytes
    #[inline]
    pub fn bytes_per_vec(&self) -> usize {
        BYTES_PER_VEC
    }

    /// log2 of the vector width
    #[inline]
    pub fn log2_bytes_per_vec(&self) -> u32 {
        LOG2_BYTES_PER_VEC
    }
}

static SIMD_CAPS: OnceLock<SimdCaps> = OnceLock::new();

/// Install the process-wide capabilities for `config`.
///
/// The first successful call wins; later calls return the installed
/// capabilities unchanged and warn if they asked for something different.
pub fn try_init(config: &SimdConfig) -> Result<&'static SimdCaps> {
    config.validate()?;

    if let Some(caps) = SIMD_CAPS.get() {
        if caps.config != *config {
            warn!(
                "Kernel tier already initialized as {} with {:?}, ignoring {:?}",
                caps.tier, caps.config, config
            );
        }
        return Ok(caps);
    }

    let caps = SimdCaps::select(config, get_cpu_features())?;
    Ok(SIMD_CAPS.get_or_init(|| caps))
}

/// Get the process-wide capabilities, initializing from the environment on
/// first use.
///
/// # Panics
///
/// Panics if the vector tier is enabled and the CPU lacks a required
/// extension. Use [`try_init`] to handle that case.
pub fn simd_caps() -> &'static SimdCaps {
    SIMD_CAPS.get_or_init(|| {
        let config = SimdConfig::from_env().unwrap_or_else(|e| {
            warn!("Ignoring SIMD environment configuration: {}", e);
            SimdConfig::default()
        });
        match SimdCaps::select(&config, get_cpu_features()) {
            Ok(caps) => caps,
            Err(e) => {
                error!("Cannot initialize byte kernels: {}", e);
                panic!("bytekern: {}", e);
            }
        }
    })
}

/// Tier every kernel call dispatches on
#[inline]
pub fn active_tier() -> SimdTier {
    simd_caps().tier()
}

/// Process-wide vector width in bytes
#[inline]
pub fn bytes_per_vec() -> usize {
    simd_caps().bytes_per_vec()
}

/// log2 of [`bytes_per_vec`]
#[inline]
pub fn log2_bytes_per_vec() -> u32 {
    simd_caps().log2_bytes_per_vec()
}
