//! Configuration APIs for bytekern
//!
//! The only tunable behavior is how the process-wide SIMD tier gets chosen.
//! Configuration can come from defaults, presets, environment variables or a
//! JSON file, and is handed to [`crate::system::try_init`] once per process.
//!
//! # Environment Initialization
//!
//! ```rust
//! use bytekern::config::{Config, SimdConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads BYTEKERN_SIMD_ENABLE and BYTEKERN_SIMD_REQUIRE_POPCNT
//! let config = SimdConfig::from_env()?;
//!
//! // Same fields under a custom prefix
//! let config = SimdConfig::from_env_with_prefix("MYAPP_")?;
//! # let _ = config;
//! # Ok(())
//! # }
//! ```
//!
//! # Presets
//!
//! ```rust
//! use bytekern::config::{Config, SimdConfig};
//!
//! // Vector tier with every required extension checked
//! let config = SimdConfig::performance_preset();
//! assert!(config.enable_simd);
//!
//! // Portable scalar tier, no hardware check at all
//! let config = SimdConfig::scalar_preset();
//! assert!(!config.enable_simd);
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod simd;


pub use simd::SimdConfig;

/// Default prefix for environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "BYTEKERN_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Environment variables use the format `BYTEKERN_{COMPONENT}_{FIELD}`,
    /// e.g. `BYTEKERN_SIMD_ENABLE=false` selects the scalar tier.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The environment variable prefix to use
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Get a performance-optimized preset configuration.
    fn performance_preset() -> Self;

    /// Get a preset that avoids every vector instruction.
    fn scalar_preset() -> Self;

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Utility function to parse environment variable with fallback to default.
///
/// Unset or unparsable variables yield `default`.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Utility function to parse boolean environment variable.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
