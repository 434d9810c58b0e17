use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Jackett and TorrServer URLs are set
/// - Poller makes at least one attempt
/// - Fingerprint length stays within the MD5 hex digest
/// - Message budget is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.jackett.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "jackett.url cannot be empty".to_string(),
        ));
    }

    if config.torrserver.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "torrserver.url cannot be empty".to_string(),
        ));
    }

    if config.poller.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "poller.max_attempts must be at least 1".to_string(),
        ));
    }

    if !(6..=32).contains(&config.results.fingerprint_len) {
        return Err(ConfigError::ValidationError(format!(
            "results.fingerprint_len must be between 6 and 32, got {}",
            config.results.fingerprint_len
        )));
    }

    if config.presentation.message_budget == 0 {
        return Err(ConfigError::ValidationError(
            "presentation.message_budget cannot be 0".to_string(),
        ));
    }

    Ok(())
}
