//! SIMD tier configuration.

use super::{parse_env_bool, Config};
use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Controls which kernel tier the process installs at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimdConfig {
    /// Use the SSE kernels when the target supports them. When false the
    /// scalar tier is installed and no hardware check is made.
    pub enable_simd: bool,
    /// Treat a missing POPCNT instruction as fatal. When false, `popcnt`
    /// falls back to the portable bit count on CPUs without it; the other
    /// vector kernels never need POPCNT.
    pub require_popcnt: bool,
}

impl Default for SimdConfig {
    fn default() -> Self {
        Self {
            enable_simd: !cfg!(feature = "scalar-only"),
            require_popcnt: true,
        }
    }
}

impl Config for SimdConfig {
    fn validate(&self) -> Result<()> {
        if cfg!(feature = "scalar-only") && self.enable_simd {
            return Err(KernelError::configuration(
                "enable_simd is set but the crate was built with the scalar-only feature",
            ));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.enable_simd = parse_env_bool(&format!("{}SIMD_ENABLE", prefix), config.enable_simd);
        config.require_popcnt =
            parse_env_bool(&format!("{}SIMD_REQUIRE_POPCNT", prefix), config.require_popcnt);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            enable_simd: !cfg!(feature = "scalar-only"),
            require_popcnt: true,
        }
    }

    fn scalar_preset() -> Self {
        Self {
            enable_simd: false,
            require_popcnt: false,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            KernelError::configuration(format!("Failed to serialize SIMD config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            KernelError::configuration(format!("Failed to parse SIMD config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
