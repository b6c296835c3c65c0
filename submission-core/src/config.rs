use std::env;
use std::time::Duration;

/// Tunables for the submission coordinator. Every knob has a default, so
/// `CoordinatorConfig::default()` is a working production configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Outer attempt budget per key: user-triggered submissions, not the
    /// backoff retries inside a single call.
    pub max_attempts: u32,
    /// Cooldown between submission attempts for the same key.
    pub throttle_window: Duration,
    /// Backoff retries inside a single submission call.
    pub max_retries: usize,
    pub initial_retry_delay: Duration,
    pub max_retry_delay: Duration,
    /// Key prefix for durable guard records.
    pub guard_namespace: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            throttle_window: Duration::from_secs(5),
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            guard_namespace: "submission:guard:".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Builds configuration from `config/{APP_ENV}.toml` with `APP_`-prefixed
    /// environment overrides (`__` as the path separator), falling back to
    /// the defaults for anything unset.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let defaults = Self::default();

        let max_attempts = settings
            .get_int("submission.max_attempts")
            .map(|v| v as u32)
            .unwrap_or(defaults.max_attempts);

        let throttle_window = settings
            .get_int("submission.throttle_window_ms")
            .map(|v| Duration::from_millis(v as u64))
            .unwrap_or(defaults.throttle_window);

        let max_retries = settings
            .get_int("submission.max_retries")
            .map(|v| v as usize)
            .unwrap_or(defaults.max_retries);

        let initial_retry_delay = settings
            .get_int("submission.initial_retry_delay_ms")
            .map(|v| Duration::from_millis(v as u64))
            .unwrap_or(defaults.initial_retry_delay);

        let max_retry_delay = settings
            .get_int("submission.max_retry_delay_ms")
            .map(|v| Duration::from_millis(v as u64))
            .unwrap_or(defaults.max_retry_delay);

        let guard_namespace = settings
            .get_string("submission.guard_namespace")
            .unwrap_or(defaults.guard_namespace);

        Ok(Self {
            max_attempts,
            throttle_window,
            max_retries,
            initial_retry_delay,
            max_retry_delay,
            guard_namespace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "APP_SUBMISSION__MAX_ATTEMPTS",
            "APP_SUBMISSION__THROTTLE_WINDOW_MS",
            "APP_SUBMISSION__GUARD_NAMESPACE",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn load_falls_back_to_defaults() {
        clear_env();
        let cfg = CoordinatorConfig::load().unwrap();
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.throttle_window, Duration::from_secs(5));
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.initial_retry_delay, Duration::from_secs(1));
        assert_eq!(cfg.guard_namespace, "submission:guard:");
    }

    #[test]
    #[serial]
    fn env_overrides_take_precedence() {
        clear_env();
        env::set_var("APP_SUBMISSION__MAX_ATTEMPTS", "5");
        env::set_var("APP_SUBMISSION__THROTTLE_WINDOW_MS", "250");

        let cfg = CoordinatorConfig::load().unwrap();
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.throttle_window, Duration::from_millis(250));

        clear_env();
    }
}
