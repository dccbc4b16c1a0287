//! Configuration for seeding runs.

use std::env;
use std::time::Duration;

use academico::COURSE_CACHE_TTL_SECS;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MONGODB_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "academico";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";

/// Store locations and cache lifetime for a seeding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Document store connection string.
    pub mongodb_url: String,

    /// Database holding the `students`, `courses` and `enrollments` collections.
    pub database: String,

    /// Key-value store connection string.
    pub redis_url: String,

    /// Lifetime of cached course entries, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            mongodb_url: DEFAULT_MONGODB_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            cache_ttl_secs: COURSE_CACHE_TTL_SECS,
        }
    }
}

impl SeedConfig {
    /// Reads `MONGODB_URL`, `MONGODB_DATABASE`, `REDIS_URL` and `CACHE_TTL_SECS`,
    /// falling back to the local defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            mongodb_url: lookup("MONGODB_URL").unwrap_or(defaults.mongodb_url),
            database: lookup("MONGODB_DATABASE").unwrap_or(defaults.database),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_ttl_secs: lookup("CACHE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_point_at_local_stores() {
        let config = SeedConfig::default();

        assert_eq!(config.mongodb_url, "mongodb://localhost:27017");
        assert_eq!(config.database, "academico");
        assert_eq!(config.redis_url, "redis://127.0.0.1/");
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars = HashMap::from([
            ("MONGODB_URL", "mongodb://db:27017"),
            ("MONGODB_DATABASE", "academico_staging"),
            ("CACHE_TTL_SECS", "60"),
        ]);
        let config = SeedConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.mongodb_url, "mongodb://db:27017");
        assert_eq!(config.database, "academico_staging");
        assert_eq!(config.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn test_unparsable_ttl_falls_back() {
        let config = SeedConfig::from_lookup(|name| {
            (name == "CACHE_TTL_SECS").then(|| "one hour".to_string())
        });

        assert_eq!(config.cache_ttl_secs, COURSE_CACHE_TTL_SECS);
    }
}
