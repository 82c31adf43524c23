use crate::config::types::{
    Config, LlmConfig, NormalizerConfig, OutputConfig, ScraperConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_normalizer_config(&config.normalizer)?;
    validate_llm_config(&config.llm)?;
    Ok(())
}

/// Validates scraping and pacing configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_http_url("main-url", &config.main_url)?;

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be at most 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_base_delay > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry-base-delay must be <= 60000ms, got {}ms",
            config.retry_base_delay
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request-timeout must be at least 1 second".to_string(),
        ));
    }

    if let Some(domain) = &config.related_domain {
        if domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "related-domain cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output directories
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, dir) in [
        ("raw-dir", &config.raw_dir),
        ("processed-dir", &config.processed_dir),
        ("web-content-dir", &config.web_content_dir),
    ] {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Validates normalization limits
fn validate_normalizer_config(config: &NormalizerConfig) -> Result<(), ConfigError> {
    if config.max_pdf_sections < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pdf-sections must be >= 1, got {}",
            config.max_pdf_sections
        )));
    }

    Ok(())
}

/// Validates the language-model collaborator settings
fn validate_llm_config(config: &LlmConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    validate_http_url("llm base-url", &config.base_url)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm model cannot be empty".to_string(),
        ));
    }

    if config.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm max-tokens must be >= 1".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "llm temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    Ok(())
}

/// Checks that a configured URL parses and uses HTTP(S)
fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            key, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
