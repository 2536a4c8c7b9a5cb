//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction-time settings for a [`KvEngine`](crate::KvEngine)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied to writes that request `Ttl::Default` (default: none)
    pub default_ttl_ms: Option<u64>,

    /// Interval for the optional background sweeper (default: disabled)
    pub sweep_interval_ms: Option<u64>,
}

/// Whole milliseconds, rounded up so a non-zero duration never becomes 0
fn duration_to_ms(d: Duration) -> u64 {
    let mut ms = d.as_millis();
    if d.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    u64::try_from(ms).unwrap_or(u64::MAX)
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL used for `Ttl::Default` writes
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_ms = Some(duration_to_ms(ttl));
        self
    }

    /// Enable the background sweeper at the given interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = Some(duration_to_ms(interval));
        self
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_ms.map(Duration::from_millis)
    }

    /// Sweep interval, `None` when unset or zero
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl(), None);
        assert_eq!(config.sweep_interval(), None);
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::new()
            .with_default_ttl(Duration::from_secs(60))
            .with_sweep_interval(Duration::from_millis(250));

        assert_eq!(config.default_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.sweep_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_sub_millisecond_rounds_up() {
        let config = CacheConfig::new()
            .with_default_ttl(Duration::from_micros(500))
            .with_sweep_interval(Duration::from_nanos(1));

        assert_eq!(config.default_ttl(), Some(Duration::from_millis(1)));
        assert_eq!(config.sweep_interval(), Some(Duration::from_millis(1)));

        let config = CacheConfig::new().with_default_ttl(Duration::from_micros(1500));
        assert_eq!(config.default_ttl(), Some(Duration::from_millis(2)));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let config = CacheConfig::new().with_default_ttl(Duration::MAX);
        assert_eq!(config.default_ttl_ms, Some(u64::MAX));
    }

    #[test]
    fn test_zero_sweep_interval_disables_sweeper() {
        let config = CacheConfig::new().with_sweep_interval(Duration::ZERO);
        assert_eq!(config.sweep_interval(), None);

        let config: CacheConfig = serde_json::from_str(r#"{"sweep_interval_ms": 0}"#).unwrap();
        assert_eq!(config.sweep_interval(), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"default_ttl_ms": 1500}"#).unwrap();

        assert_eq!(config.default_ttl(), Some(Duration::from_millis(1500)));
        assert_eq!(config.sweep_interval(), None);
    }
}
