use crate::config::types::Manifest;
use crate::ConfigError;
use url::Url;

/// Parses and validates the base URL
///
/// The URL must be present, non-blank, and absolute.
pub fn validate_base_url(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::InvalidInput("a base URL is required".to_string()))?;

    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Validates a resolved manifest
pub fn validate(manifest: &Manifest) -> Result<(), ConfigError> {
    validate_positive("max_depth", u64::from(manifest.max_depth))?;
    validate_positive("max_workers", u64::from(manifest.max_workers))?;
    validate_positive("rate_limit", u64::from(manifest.rate_limit))?;
    validate_positive("timeout_seconds", manifest.timeout_seconds)?;
    validate_positive("max_sitemap_urls", u64::from(manifest.max_sitemap_urls))?;

    if manifest.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidInput(
            "output_dir cannot be empty".to_string(),
        ));
    }

    validate_patterns("exclude_patterns", &manifest.exclude_patterns)?;
    validate_patterns("include_patterns", &manifest.include_patterns)?;

    Ok(())
}

fn validate_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidInput(format!(
            "{} must be a positive integer, got 0",
            field
        )));
    }
    Ok(())
}

fn validate_patterns(field: &str, patterns: &[String]) -> Result<(), ConfigError> {
    if patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::InvalidInput(format!(
            "{} cannot contain blank patterns",
            field
        )));
    }
    Ok(())
}

/// Validates an explicitly supplied domain restriction
///
/// Accepts plain host names such as `example.com` or `localhost`.
pub fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidInput(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidInput(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidInput(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidInput(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
