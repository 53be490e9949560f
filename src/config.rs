//! Configuration Module
//!
//! Handles loading, building and clamping the cache configuration.

use std::env;
use std::time::Duration;

// == Defaults ==
/// Idle time after which any item is pruned, prunable or not.
pub const DEFAULT_MAX_UNUSED: Duration = Duration::from_secs(25 * 60 * 60);

/// Idle time after which items saved with `prune` set are pruned.
pub const DEFAULT_PRUNE_AFTER: Duration = Duration::from_secs(18 * 60);

/// Default clock refresh interval.
pub const DEFAULT_REQUEST_ACCURACY: Duration = Duration::from_secs(1);

/// Smallest accepted clock refresh interval.
pub const MIN_REQUEST_ACCURACY: Duration = Duration::from_millis(100);

/// Largest accepted clock refresh interval.
pub const MAX_REQUEST_ACCURACY: Duration = Duration::from_secs(60 * 60);

/// Smallest accepted prune interval when pruning is enabled.
pub const MIN_PRUNE_INTERVAL: Duration = Duration::from_secs(1);

/// Largest accepted prune interval.
pub const MAX_PRUNE_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Pass as `max_unused` to disable idle eviction entirely.
pub const FOREVER: Duration = Duration::MAX;

/// Cache configuration parameters.
///
/// Every field is optional in the sense that a zero value means "use the
/// default". Out of range values are clamped by [`Config::normalized`], never
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How often the worker runs a prune pass. Zero disables pruning.
    pub prune_interval: Duration,
    /// Idle time after which items saved with `prune` set are evicted
    pub prune_after: Duration,
    /// Idle time after which every item is evicted ([`FOREVER`] disables this)
    pub max_unused: Duration,
    /// Interval at which the worker refreshes its cached "now".
    ///
    /// Item timestamps are only as precise as this interval. Raising it to a
    /// few seconds is safe when exact save/access times don't matter, and
    /// lowers the worker's clock overhead.
    pub request_accuracy: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PRUNE_INTERVAL_SECS` - Prune frequency in seconds (default: 0, disabled)
    /// - `CACHE_PRUNE_AFTER_SECS` - Idle time for prunable items (default: 1080)
    /// - `CACHE_MAX_UNUSED_SECS` - Idle time for all items (default: 90000)
    /// - `CACHE_REQUEST_ACCURACY_MS` - Clock refresh interval (default: 1000)
    ///
    /// The result still needs [`Config::normalized`]; `Cache::new` does that.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            prune_interval: env_duration("CACHE_PRUNE_INTERVAL_SECS", Duration::from_secs)
                .unwrap_or(defaults.prune_interval),
            prune_after: env_duration("CACHE_PRUNE_AFTER_SECS", Duration::from_secs)
                .unwrap_or(defaults.prune_after),
            max_unused: env_duration("CACHE_MAX_UNUSED_SECS", Duration::from_secs)
                .unwrap_or(defaults.max_unused),
            request_accuracy: env_duration("CACHE_REQUEST_ACCURACY_MS", Duration::from_millis)
                .unwrap_or(defaults.request_accuracy),
        }
    }

    // == Builders ==
    /// Sets the prune interval. Zero disables pruning.
    pub fn with_prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval = interval;
        self
    }

    /// Sets the idle time after which prunable items are evicted.
    pub fn with_prune_after(mut self, prune_after: Duration) -> Self {
        self.prune_after = prune_after;
        self
    }

    /// Sets the idle time after which any item is evicted.
    pub fn with_max_unused(mut self, max_unused: Duration) -> Self {
        self.max_unused = max_unused;
        self
    }

    /// Sets the clock refresh interval.
    pub fn with_request_accuracy(mut self, accuracy: Duration) -> Self {
        self.request_accuracy = accuracy;
        self
    }

    // == Normalize ==
    /// Returns a copy with zero values replaced by defaults and every
    /// interval clamped to its supported range.
    pub fn normalized(&self) -> Self {
        let request_accuracy = if self.request_accuracy.is_zero() {
            DEFAULT_REQUEST_ACCURACY
        } else {
            self.request_accuracy
                .clamp(MIN_REQUEST_ACCURACY, MAX_REQUEST_ACCURACY)
        };

        let prune_interval = if self.prune_interval.is_zero() {
            Duration::ZERO
        } else {
            self.prune_interval
                .clamp(MIN_PRUNE_INTERVAL, MAX_PRUNE_INTERVAL)
        };

        Self {
            prune_interval,
            prune_after: non_zero_or(self.prune_after, DEFAULT_PRUNE_AFTER),
            max_unused: non_zero_or(self.max_unused, DEFAULT_MAX_UNUSED),
            request_accuracy,
        }
    }

    /// Returns true if the worker should run prune passes.
    pub fn pruning_enabled(&self) -> bool {
        !self.prune_interval.is_zero()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prune_interval: Duration::ZERO,
            prune_after: DEFAULT_PRUNE_AFTER,
            max_unused: DEFAULT_MAX_UNUSED,
            request_accuracy: DEFAULT_REQUEST_ACCURACY,
        }
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}

fn env_duration(name: &str, unit: fn(u64) -> Duration) -> Option<Duration> {
    env::var(name).ok().and_then(|v| v.parse().ok()).map(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.prune_interval, Duration::ZERO);
        assert_eq!(config.prune_after, Duration::from_secs(18 * 60));
        assert_eq!(config.max_unused, Duration::from_secs(25 * 60 * 60));
        assert_eq!(config.request_accuracy, Duration::from_secs(1));
        assert!(!config.pruning_enabled());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_PRUNE_INTERVAL_SECS");
        env::remove_var("CACHE_PRUNE_AFTER_SECS");
        env::remove_var("CACHE_MAX_UNUSED_SECS");
        env::remove_var("CACHE_REQUEST_ACCURACY_MS");

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_normalize_zero_values_take_defaults() {
        let config = Config {
            prune_interval: Duration::from_secs(60),
            prune_after: Duration::ZERO,
            max_unused: Duration::ZERO,
            request_accuracy: Duration::ZERO,
        }
        .normalized();

        assert_eq!(config.prune_after, DEFAULT_PRUNE_AFTER);
        assert_eq!(config.max_unused, DEFAULT_MAX_UNUSED);
        assert_eq!(config.request_accuracy, DEFAULT_REQUEST_ACCURACY);
    }

    #[test]
    fn test_normalize_clamps_request_accuracy() {
        let low = Config::default()
            .with_request_accuracy(Duration::from_millis(1))
            .normalized();
        assert_eq!(low.request_accuracy, MIN_REQUEST_ACCURACY);

        let high = Config::default()
            .with_request_accuracy(Duration::from_secs(2 * 60 * 60))
            .normalized();
        assert_eq!(high.request_accuracy, MAX_REQUEST_ACCURACY);

        let ok = Config::default()
            .with_request_accuracy(Duration::from_secs(5))
            .normalized();
        assert_eq!(ok.request_accuracy, Duration::from_secs(5));
    }

    #[test]
    fn test_normalize_prune_interval() {
        let disabled = Config::default().normalized();
        assert!(!disabled.pruning_enabled());

        let short = Config::default()
            .with_prune_interval(Duration::from_millis(10))
            .normalized();
        assert_eq!(short.prune_interval, MIN_PRUNE_INTERVAL);
        assert!(short.pruning_enabled());
    }

    #[test]
    fn test_normalize_caps_huge_prune_interval() {
        let forever = Config::default().with_prune_interval(FOREVER).normalized();
        assert_eq!(forever.prune_interval, MAX_PRUNE_INTERVAL);
        assert!(forever.pruning_enabled());

        let max_secs = Config::default()
            .with_prune_interval(Duration::from_secs(u64::MAX))
            .normalized();
        assert_eq!(max_secs.prune_interval, MAX_PRUNE_INTERVAL);
    }

    #[test]
    fn test_forever_is_kept() {
        let config = Config::default().with_max_unused(FOREVER).normalized();
        assert_eq!(config.max_unused, FOREVER);
    }
}
