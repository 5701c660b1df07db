//! Error handling for the bytekern library
//!
//! Only the safe kernel entry points, configuration and capability
//! initialization can fail. Unsafe kernels do not report precondition
//! violations, and allocation failure is fatal just like it is for `Vec`.

use thiserror::Error;

/// Main error type for the bytekern library
#[derive(Error, Debug)]
pub enum KernelError {
    /// A safe kernel was called with arguments that violate its documented
    /// length or range relationship
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition
        message: String,
    },

    /// The CPU lacks an instruction-set extension the vector tier requires
    #[error("Unsupported CPU: {feature} required")]
    UnsupportedCpu {
        /// Name of the missing extension
        feature: String,
    },

    /// Configuration or initialization errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// I/O errors while loading or saving configuration files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KernelError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported CPU error
    pub fn unsupported_cpu<S: Into<String>>(feature: S) -> Self {
        Self::UnsupportedCpu {
            feature: feature.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if the caller can recover by fixing its inputs and retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidArgument { .. } => true,
            Self::Configuration { .. } => true,
            Self::Io(_) => true,
            Self::UnsupportedCpu { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "argument",
            Self::UnsupportedCpu { .. } => "cpu",
            Self::Configuration { .. } => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, KernelError>;

/// Assert that two buffers handed to `kernel` have the same length
#[inline]
pub fn check_same_len(kernel: &str, a: usize, b: usize) -> Result<()> {
    if a != b {
        Err(KernelError::invalid_argument(format!(
            "{}() requires equal lengths, got {} and {}",
            kernel, a, b
        )))
    } else {
        Ok(())
    }
}

/// Assert that a buffer handed to `kernel` has exactly `expected` bytes
#[inline]
pub fn check_len(kernel: &str, what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        Err(KernelError::invalid_argument(format!(
            "{}() requires len({}) == {}, got {}",
            kernel, what, expected, actual
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = KernelError::invalid_argument("test message");
        assert_eq!(err.category(), "argument");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_same_len_checking() {
        assert!(check_same_len("and", 5, 5).is_ok());
        assert!(check_same_len("and", 5, 6).is_err());
        assert!(check_same_len("and", 0, 0).is_ok());
    }

    #[test]
    fn test_len_checking() {
        assert!(check_len("packed_nibble_lookup", "src", 3, 3).is_ok());
        assert!(check_len("packed_nibble_lookup", "src", 2, 3).is_err());
        assert!(check_len("packed_nibble_lookup", "src", 4, 3).is_err());
    }

    #[test]
    fn test_all_error_types() {
        let cpu_err = KernelError::unsupported_cpu("SSE4.2");
        assert_eq!(cpu_err.category(), "cpu");
        assert!(!cpu_err.is_recoverable());

        let config_err = KernelError::configuration("already initialized");
        assert_eq!(config_err.category(), "config");
        assert!(config_err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = check_same_len("xor", 10, 9).unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains("Invalid argument"));
        assert!(display.contains("xor()"));
        assert!(display.contains("10"));
        assert!(display.contains("9"));

        let cpu_err = KernelError::unsupported_cpu("SSSE3");
        assert_eq!(format!("{}", cpu_err), "Unsupported CPU: SSSE3 required");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: KernelError = io_error.into();
        assert_eq!(err.category(), "io");
        assert!(format!("{}", err).contains("I/O error"));
    }

    #[test]
    fn test_error_debug() {
        let err = KernelError::invalid_argument("debug test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidArgument"));
        assert!(debug_str.contains("debug test"));
    }
}
