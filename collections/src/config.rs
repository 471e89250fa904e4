//! Container configuration
//!
//! Construction parameters for arrays and sets, loadable from JSON.
//! Missing fields fall back to the same defaults as the plain constructors.
//!
//! Setting the `COLLECTIONS_DEBUG` environment variable turns on stderr
//! tracing of set resizes and stash overflows.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preconditions::{check_expression, CollectionError};

/// Largest initial capacity a set accepts (2^30)
pub const MAX_SET_CAPACITY: usize = 1 << 30;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] CollectionError),
}

/// Construction parameters for [`DynamicArray`](crate::DynamicArray)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    /// Preserve insertion order on removal (otherwise the last element fills gaps)
    pub ordered: bool,

    /// Initial backing capacity
    pub capacity: usize,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            ordered: true,
            capacity: 16,
        }
    }
}

impl ArrayConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Construction parameters for [`CuckooHashSet`](crate::CuckooHashSet)
///
/// # Example
/// ```
/// use cuckoo_collections::SetConfig;
///
/// let config = SetConfig::from_json(r#"{"initial_capacity": 64, "seed": 7}"#).unwrap();
/// assert_eq!(config.initial_capacity, 64);
/// assert_eq!(config.load_factor, 0.8);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Requested primary table size (rounded up to a power of two)
    pub initial_capacity: usize,

    /// Fraction of the primary table filled before doubling
    pub load_factor: f32,

    /// Seed for the set's eviction engine; `None` seeds it from entropy
    pub seed: Option<u64>,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 32,
            load_factor: 0.8,
            seed: None,
        }
    }
}

impl SetConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CollectionError> {
        validate_set_params(self.initial_capacity, self.load_factor)
    }
}

/// Shared argument checks for every set constructor
pub(crate) fn validate_set_params(
    initial_capacity: usize,
    load_factor: f32,
) -> Result<(), CollectionError> {
    check_expression(
        initial_capacity <= MAX_SET_CAPACITY,
        format!("initial_capacity is too large: {}", initial_capacity),
    )?;
    check_expression(
        load_factor > 0.0 && load_factor.is_finite(),
        format!("load_factor must be > 0: {}", load_factor),
    )?;
    Ok(())
}

/// Whether `COLLECTIONS_DEBUG` tracing is on (read once per process)
pub(crate) fn debug_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("COLLECTIONS_DEBUG").is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plain_constructors() {
        let array = ArrayConfig::default();
        assert!(array.ordered);
        assert_eq!(array.capacity, 16);

        let set = SetConfig::default();
        assert_eq!(set.initial_capacity, 32);
        assert_eq!(set.load_factor, 0.8);
        assert_eq!(set.seed, None);
    }

    #[test]
    fn test_validate_rejects_bad_load_factor() {
        let config = SetConfig {
            load_factor: 0.0,
            ..SetConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CollectionError::InvalidArgument(_))
        ));

        let config = SetConfig {
            load_factor: f32::NAN,
            ..SetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_capacity() {
        let config = SetConfig {
            initial_capacity: MAX_SET_CAPACITY + 1,
            ..SetConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
