//! Resolution of a run manifest from layered configuration
//!
//! Precedence, lowest to highest: hardcoded constants, the default
//! configuration document, a named profile, explicit overrides. Each field is
//! resolved on its own; the highest layer that has a value for it wins.

use crate::config::layers::{ConfigLayer, LayerSource, LayerStack, Provenance};
use crate::config::parser::{default_config_path, load_default_layer};
use crate::config::profiles::lookup_profile;
use crate::config::types::{Manifest, Overrides};
use crate::config::validation::{validate, validate_base_url, validate_domain};
use crate::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Domain used when the base URL has no host to restrict to
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Non-fatal problems found while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The requested profile does not exist
    ProfileNotFound { name: String },

    /// The requested profile exists but could not be read
    ProfileUnreadable { name: String, reason: String },

    /// The default configuration document exists but could not be read
    DefaultConfigUnreadable { path: PathBuf, reason: String },

    /// No domain could be derived from the base URL
    DomainUnresolved { url: String },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileNotFound { name } => {
                write!(f, "Profile '{}' not found, continuing without it", name)
            }
            Self::ProfileUnreadable { name, reason } => {
                write!(f, "Profile '{}' could not be loaded ({}), continuing without it", name, reason)
            }
            Self::DefaultConfigUnreadable { path, reason } => write!(
                f,
                "Default config {} could not be loaded ({}), using hardcoded defaults",
                path.display(),
                reason
            ),
            Self::DomainUnresolved { url } => write!(
                f,
                "Could not derive a domain from '{}', using '{}'",
                url, UNKNOWN_DOMAIN
            ),
        }
    }
}

/// Output of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub manifest: Manifest,
    pub warnings: Vec<ResolveWarning>,
    /// Which layer supplied each field
    pub provenance: Provenance,
}

/// Where the resolver looks for configuration documents
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Directory holding `default.toml` and `profiles/`; `None` skips file tiers
    pub config_dir: Option<PathBuf>,

    /// Directory under which default output directories are derived
    pub output_base: PathBuf,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            config_dir: None,
            output_base: default_output_base(),
        }
    }
}

/// `$HOME/Desktop`, or `/tmp/Desktop` when `HOME` is unset
pub fn default_output_base() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("Desktop")
}

/// Computes the output directory used when none is configured
///
/// The result depends only on `base` and `domain`.
pub fn derive_output_dir(base: &Path, domain: &str) -> PathBuf {
    base.join(format!("crawler_results_{}", domain.replace('.', "_")))
}

/// Lower-cased host of a URL, if it has one
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Stateless manifest resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves overrides into a complete manifest
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution)` - The manifest plus any non-fatal warnings
    /// * `Err(ConfigError)` - The base URL is missing or malformed, or a
    ///   resolved value is out of range
    pub fn resolve(&self, overrides: &Overrides) -> Result<Resolution, ConfigError> {
        let base_url = validate_base_url(overrides.base_url.as_deref())?;
        let mut warnings = Vec::new();

        let stack = self.build_stack(overrides, &mut warnings);
        let mut provenance = Provenance::new();

        let allowed_domain = match stack
            .pick_traced("allowed_domain", &mut provenance, |l| non_blank(&l.allowed_domain))
        {
            Some(domain) => {
                validate_domain(&domain)?;
                domain
            }
            None => {
                provenance.insert("allowed_domain", LayerSource::Derived);
                extract_domain(&base_url).unwrap_or_else(|| {
                    raise(
                        &mut warnings,
                        ResolveWarning::DomainUnresolved {
                            url: base_url.to_string(),
                        },
                    );
                    UNKNOWN_DOMAIN.to_string()
                })
            }
        };

        let output_dir = match stack.pick_traced("output_dir", &mut provenance, |l| {
            l.output_dir.clone().filter(|p| !p.as_os_str().is_empty())
        }) {
            Some(dir) => dir,
            None => {
                provenance.insert("output_dir", LayerSource::Derived);
                derive_output_dir(&self.settings.output_base, &allowed_domain)
            }
        };

        // The hardcoded layer is always at the bottom of the stack, so every
        // remaining field has at least one candidate.
        let manifest = Manifest {
            base_url: base_url.to_string(),
            allowed_domain,
            max_depth: required(&stack, &mut provenance, "max_depth", |l| l.max_depth)?,
            max_workers: required(&stack, &mut provenance, "max_workers", |l| l.max_workers)?,
            rate_limit: required(&stack, &mut provenance, "rate_limit", |l| l.rate_limit)?,
            timeout_seconds: required(&stack, &mut provenance, "timeout_seconds", |l| {
                l.timeout_seconds
            })?,
            max_sitemap_urls: required(&stack, &mut provenance, "max_sitemap_urls", |l| {
                l.max_sitemap_urls
            })?,
            output_dir,
            use_sitemap: required(&stack, &mut provenance, "use_sitemap", |l| l.use_sitemap)?,
            respect_robots_txt: required(&stack, &mut provenance, "respect_robots_txt", |l| {
                l.respect_robots_txt
            })?,
            exclude_patterns: required(&stack, &mut provenance, "exclude_patterns", |l| {
                l.exclude_patterns.clone()
            })?,
            include_patterns: required(&stack, &mut provenance, "include_patterns", |l| {
                l.include_patterns.clone()
            })?,
        };

        validate(&manifest)?;

        tracing::debug!("Resolved manifest {}", manifest.fingerprint());

        Ok(Resolution {
            manifest,
            warnings,
            provenance,
        })
    }

    fn build_stack(&self, overrides: &Overrides, warnings: &mut Vec<ResolveWarning>) -> LayerStack {
        let mut stack = LayerStack::new();
        stack.push(LayerSource::Hardcoded, ConfigLayer::hardcoded());

        let config_dir = self.settings.config_dir.as_deref();

        if let Some(dir) = config_dir {
            let path = default_config_path(dir);
            match load_default_layer(dir) {
                Ok(Some(layer)) => {
                    tracing::debug!("Loaded default config from {}", path.display());
                    stack.push(LayerSource::DefaultFile(path), layer);
                }
                Ok(None) => {
                    tracing::debug!("No default config at {}, using hardcoded defaults", path.display());
                }
                Err(e) => raise(
                    warnings,
                    ResolveWarning::DefaultConfigUnreadable {
                        path,
                        reason: e.to_string(),
                    },
                ),
            }
        }

        if let Some(name) = overrides.profile.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            match lookup_profile(config_dir, name) {
                Ok(Some(profile)) => {
                    tracing::info!("Loaded profile: {} - {}", profile.name, profile.description);
                    stack.push(LayerSource::Profile(profile.name.clone()), profile.to_layer());
                }
                Ok(None) => raise(
                    warnings,
                    ResolveWarning::ProfileNotFound {
                        name: name.to_string(),
                    },
                ),
                Err(e) => raise(
                    warnings,
                    ResolveWarning::ProfileUnreadable {
                        name: name.to_string(),
                        reason: e.to_string(),
                    },
                ),
            }
        }

        stack.push(LayerSource::Override, overrides.fields.clone());
        stack
    }
}

/// Logs a warning as soon as it is found, so it is seen even if resolution
/// fails later on
fn raise(warnings: &mut Vec<ResolveWarning>, warning: ResolveWarning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required<T, F>(
    stack: &LayerStack,
    provenance: &mut Provenance,
    name: &'static str,
    field: F,
) -> Result<T, ConfigError>
where
    F: Fn(&ConfigLayer) -> Option<T>,
{
    stack
        .pick_traced(name, provenance, field)
        .ok_or_else(|| ConfigError::InvalidInput(format!("no value resolved for {}", name)))
}
