//! Configuration schema types.

use serde::{Deserialize, Serialize};
use switchyard_router::{
    DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_NORMALIZE_CACHE_CAPACITY, DEFAULT_POOL_CAPACITY,
};

/// Dispatch core sizing.
///
/// Controls how many idle containers each pool keeps and how many entries
/// the lookup caches accept before they stop inserting.
///
/// # Example
///
/// ```
/// use switchyard_config::DispatchConfig;
///
/// let config = DispatchConfig {
///     pool_capacity: 100,
///     ..Default::default()
/// };
/// assert_eq!(config.match_cache_capacity, 500);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Idle parameter and query containers kept per pool.
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Entries in the static match cache.
    #[serde(default = "default_match_cache_capacity")]
    pub match_cache_capacity: usize,

    /// Entries in the path normalization cache.
    #[serde(default = "default_normalize_cache_capacity")]
    pub normalize_cache_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_capacity: default_pool_capacity(),
            match_cache_capacity: default_match_cache_capacity(),
            normalize_cache_capacity: default_normalize_cache_capacity(),
        }
    }
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

fn default_match_cache_capacity() -> usize {
    DEFAULT_MATCH_CACHE_CAPACITY
}

fn default_normalize_cache_capacity() -> usize {
    DEFAULT_NORMALIZE_CACHE_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.pool_capacity, 50);
        assert_eq!(config.match_cache_capacity, 500);
        assert_eq!(config.normalize_cache_capacity, 200);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: DispatchConfig = toml::from_str("pool_capacity = 8").unwrap();
        assert_eq!(config.pool_capacity, 8);
        assert_eq!(config.normalize_cache_capacity, 200);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<DispatchConfig, _> = toml::from_str("pool_size = 8");
        assert!(result.is_err());
    }
}
