use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Concurrency limit is at least 1
/// - Stall and probe timeouts are not 0
/// - Event channel capacity is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Registry validation
    if config.registry.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "registry.max_concurrent_jobs must be at least 1".to_string(),
        ));
    }
    if config.registry.stall_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "registry.stall_timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.registry.event_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "registry.event_capacity cannot be 0".to_string(),
        ));
    }

    // Prober validation
    if config.prober.probe_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "prober.probe_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.registry.max_concurrent_jobs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_concurrent_jobs"));
    }

    #[test]
    fn test_validate_zero_timeouts_fail() {
        let mut config = Config::default();
        config.registry.stall_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.prober.probe_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
