//! Configuration validation rules.

use super::schema::{CacheBackend, Config, CorsMode};

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }

    if config.cors.mode == CorsMode::Restrictive {
        let origin = config.cors.allowed_origin.trim();
        if origin.is_empty() {
            errors.push("cors.allowed_origin is required when cors.mode is restrictive".to_string());
        } else if origin == "*" || !origin.is_ascii() || origin.chars().any(char::is_whitespace) {
            errors.push(format!(
                "cors.allowed_origin must be a single origin, got '{}'",
                origin
            ));
        }
    }

    if config.cache.backend == CacheBackend::Redis && config.cache.host.trim().is_empty() {
        errors.push("cache.host is required when cache.backend is redis".to_string());
    }
    if config.cache.timeout_secs == 0 {
        errors.push("cache.timeout_secs must be > 0".to_string());
    }
    if config.cache.db < 0 {
        errors.push("cache.db must be >= 0".to_string());
    }

    if config.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".to_string());
    }
    if config.model.api_base.trim().is_empty() {
        errors.push("model.api_base must not be empty".to_string());
    }
    if config.model.timeout_secs == 0 {
        errors.push("model.timeout_secs must be > 0".to_string());
    }
    if let Some(temperature) = config.model.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            errors.push("model.temperature must be in [0.0, 2.0]".to_string());
        }
    }
    if config.model.max_output_tokens == Some(0) {
        errors.push("model.max_output_tokens must be > 0".to_string());
    }

    if config.session.ttl_secs == 0 {
        errors.push("session.ttl_secs must be > 0".to_string());
    }
    if !is_token(&config.session.cookie_name) {
        errors.push(format!(
            "session.cookie_name '{}' is not a valid cookie name",
            config.session.cookie_name
        ));
    }
    if !is_token(&config.session.header_name) {
        errors.push(format!(
            "session.header_name '{}' is not a valid header name",
            config.session.header_name
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

/// RFC 7230 token: non-empty, visible ASCII, no separators.
fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_restrictive_cors_requires_origin() {
        let mut config = Config::default();
        config.cors.mode = CorsMode::Restrictive;

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cors.allowed_origin"));

        config.cors.allowed_origin = "chrome-extension://abcdefghijklmnop".to_string();
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_validate_rejects_wildcard_restrictive_origin() {
        let mut config = Config::default();
        config.cors.mode = CorsMode::Restrictive;
        config.cors.allowed_origin = "*".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("single origin"));
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.session.ttl_secs = 0;
        config.session.cookie_name = "bad name".to_string();
        config.model.temperature = Some(3.0);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("session.ttl_secs"));
        assert!(message.contains("session.cookie_name"));
        assert!(message.contains("model.temperature"));
    }

    #[test]
    fn test_memory_backend_does_not_need_host() {
        let mut config = Config::default();
        config.cache.backend = CacheBackend::Memory;
        config.cache.host = String::new();
        validate_config(&config).unwrap();
    }
}
