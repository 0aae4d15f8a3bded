use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Object store credentials are present
/// - Transform program is named
/// - Pipeline timeout and upload buffer are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.access_key_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "AWS_ACCESS_KEY_ID must be set".to_string(),
        ));
    }

    if config.storage.secret_access_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "AWS_SECRET_ACCESS_KEY must be set".to_string(),
        ));
    }

    if config.transform.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "transform.program cannot be empty".to_string(),
        ));
    }

    if config.pipeline.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.pipeline.upload_buffer_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.upload_buffer_bytes cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageConfig;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            storage: StorageConfig {
                access_key_id: "AKIA".to_string(),
                secret_access_key: "secret".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_missing_access_key_fails() {
        let mut config = valid_config();
        config.storage.access_key_id = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn test_validate_blank_secret_fails() {
        let mut config = valid_config();
        config.storage.secret_access_key = "   ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn test_validate_empty_program_fails() {
        let mut config = valid_config();
        config.transform.program = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.pipeline.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
