//! Built-in and file-backed crawl profiles

use crate::config::types::Profile;
use crate::ConfigError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

struct BuiltinProfile {
    name: &'static str,
    description: &'static str,
    max_depth: u32,
    max_workers: u32,
    rate_limit: u32,
    timeout_seconds: u64,
}

const BUILTIN_PROFILES: &[BuiltinProfile] = &[
    BuiltinProfile {
        name: "fast",
        description: "Fast crawling with high concurrency",
        max_depth: 3,
        max_workers: 50,
        rate_limit: 10,
        timeout_seconds: 300,
    },
    BuiltinProfile {
        name: "deep",
        description: "Deep crawling with moderate speed",
        max_depth: 10,
        max_workers: 20,
        rate_limit: 3,
        timeout_seconds: 1800,
    },
    BuiltinProfile {
        name: "gentle",
        description: "Gentle crawling that goes easy on servers",
        max_depth: 5,
        max_workers: 5,
        rate_limit: 1,
        timeout_seconds: 1200,
    },
];

impl BuiltinProfile {
    fn to_profile(&self) -> Profile {
        Profile {
            name: self.name.to_string(),
            description: self.description.to_string(),
            max_depth: self.max_depth,
            max_workers: self.max_workers,
            rate_limit: self.rate_limit,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

/// Returns the built-in profile with the given name, if any
pub fn builtin_profile(name: &str) -> Option<Profile> {
    BUILTIN_PROFILES
        .iter()
        .find(|p| p.name == name)
        .map(BuiltinProfile::to_profile)
}

/// Path of the profile document for `name` inside a config directory
pub fn profile_path(config_dir: &Path, name: &str) -> PathBuf {
    config_dir.join("profiles").join(format!("{}.toml", name))
}

/// Profile names are plain identifiers; anything else can't name a file
fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Looks up a profile by name
///
/// A profile document in `<config_dir>/profiles/` shadows a built-in profile
/// of the same name.
///
/// # Returns
///
/// * `Ok(Some(Profile))` - The profile was found
/// * `Ok(None)` - No profile of that name exists
/// * `Err(ConfigError)` - A profile document exists but could not be read
pub fn lookup_profile(config_dir: Option<&Path>, name: &str) -> Result<Option<Profile>, ConfigError> {
    if !is_valid_profile_name(name) {
        return Ok(None);
    }

    if let Some(dir) = config_dir {
        let path = profile_path(dir, name);
        if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            let mut profile: Profile = toml::from_str(&content)?;
            if profile.name.is_empty() {
                profile.name = name.to_string();
            }
            return Ok(Some(profile));
        }
    }

    Ok(builtin_profile(name))
}

/// Lists every profile name available, sorted and de-duplicated
pub fn list_profiles(config_dir: Option<&Path>) -> Vec<String> {
    let mut names: BTreeSet<String> = BUILTIN_PROFILES.iter().map(|p| p.name.to_string()).collect();

    if let Some(dir) = config_dir {
        match std::fs::read_dir(dir.join("profiles")) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        if is_valid_profile_name(stem) {
                            names.insert(stem.to_string());
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to list profiles in {}: {}", dir.display(), e),
        }
    }

    names.into_iter().collect()
}
