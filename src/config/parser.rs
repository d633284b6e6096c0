use crate::config::layers::ConfigLayer;
use crate::config::types::Manifest;
use crate::{ConductorError, ConfigError};
use std::path::{Path, PathBuf};

/// File name of the default configuration document inside a config directory
pub const DEFAULT_CONFIG_FILE: &str = "default.toml";

/// Path of the default configuration document inside a config directory
pub fn default_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(DEFAULT_CONFIG_FILE)
}

/// Loads and parses a configuration layer from the given path
///
/// # Arguments
///
/// * `path` - Path to a flat TOML document with manifest fields
///
/// # Returns
///
/// * `Ok(ConfigLayer)` - Successfully parsed layer
/// * `Err(ConfigError)` - Failed to read or parse the document
pub fn load_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let layer: ConfigLayer = toml::from_str(&content)?;
    Ok(layer)
}

/// Loads the default configuration document from a config directory
///
/// # Returns
///
/// * `Ok(Some(ConfigLayer))` - The document exists and parsed
/// * `Ok(None)` - There is no default document
/// * `Err(ConfigError)` - The document exists but is unreadable or invalid
pub fn load_default_layer(config_dir: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    let path = default_config_path(config_dir);
    if !path.is_file() {
        return Ok(None);
    }
    load_layer(&path).map(Some)
}

/// Writes a resolved manifest as pretty-printed JSON
///
/// # Arguments
///
/// * `manifest` - The manifest to persist
/// * `path` - Destination file; parent directories are created as needed
pub fn save_manifest(manifest: &Manifest, path: &Path) -> Result<(), ConductorError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    tracing::debug!("Manifest written to: {}", path.display());
    Ok(())
}
