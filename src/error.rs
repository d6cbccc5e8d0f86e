//! Error types for policy construction and request handling.
//!
//! Invariant violations inside the policy are bugs and panic; only
//! configuration problems and rejected inputs are reported here.

use crate::object::ObjId;

/// Errors produced while parsing or validating policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The parameter string names a key this policy does not have.
    #[error("{policy} does not have parameter {key}")]
    UnknownKey {
        /// Name of the policy that rejected the key.
        policy: String,
        /// The offending key, as written.
        key: String,
    },

    /// A key was given without `=value`.
    #[error("parameter {key} is missing a value")]
    MissingValue {
        /// The key.
        key: String,
    },

    /// A value could not be parsed as the key's type.
    #[error("invalid value '{value}' for parameter {key}")]
    InvalidValue {
        /// The key.
        key: String,
        /// The value, as written.
        value: String,
    },

    /// A ratio or step is outside its allowed range.
    #[error("parameter {key} is out of range: {value}")]
    InvalidRatio {
        /// The key.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Errors returned by policy operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// The policy could not be configured.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Zero-size objects cannot be admitted (the retention score takes a logarithm of size).
    #[error("object {id} has zero size")]
    ZeroSize {
        /// Id of the rejected object.
        id: ObjId,
    },

    /// Reload costs must be finite and non-negative.
    #[error("object {id} has invalid reload cost {cost}")]
    InvalidReloadCost {
        /// Id of the rejected object.
        id: ObjId,
        /// The rejected cost.
        cost: f64,
    },

    /// Operation not supported by this policy.
    #[error("{operation} is not supported for this algorithm")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::UnknownKey {
            policy: "S3FIFO-0.1000-2".to_string(),
            key: "bogus".to_string(),
        };
        assert_eq!(format!("{}", err), "S3FIFO-0.1000-2 does not have parameter bogus");

        assert_eq!(
            format!("{}", PolicyError::ZeroSize { id: 9 }),
            "object 9 has zero size"
        );
        assert_eq!(
            format!("{}", PolicyError::InvalidReloadCost { id: 3, cost: -1.5 }),
            "object 3 has invalid reload cost -1.5"
        );
        assert_eq!(
            format!(
                "{}",
                PolicyError::Unsupported {
                    operation: "to_evict"
                }
            ),
            "to_evict is not supported for this algorithm"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: PolicyError = ConfigError::MissingValue {
            key: "alpha".to_string(),
        }
        .into();
        assert!(matches!(err, PolicyError::Config(ConfigError::MissingValue { .. })));
    }

    #[test]
    fn test_error_is_error_trait() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<PolicyError>();
    }
}
