//! Ordered configuration layers and the field-by-field fold over them

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Hardcoded fallbacks used when no other layer supplies a value
pub const DEFAULT_MAX_DEPTH: u32 = 5;
pub const DEFAULT_MAX_WORKERS: u32 = 20;
pub const DEFAULT_RATE_LIMIT: u32 = 2;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;
pub const DEFAULT_MAX_SITEMAP_URLS: u32 = 1000;
pub const DEFAULT_USE_SITEMAP: bool = true;
pub const DEFAULT_RESPECT_ROBOTS_TXT: bool = true;

/// A partial set of manifest fields contributed by one configuration tier
///
/// This is also the on-disk shape of the default configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigLayer {
    pub allowed_domain: Option<String>,
    pub max_depth: Option<u32>,
    pub max_workers: Option<u32>,
    pub rate_limit: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub max_sitemap_urls: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub use_sitemap: Option<bool>,
    pub respect_robots_txt: Option<bool>,
    pub exclude_patterns: Option<Vec<String>>,
    pub include_patterns: Option<Vec<String>>,
}

impl ConfigLayer {
    /// The hardcoded constants tier
    pub fn hardcoded() -> Self {
        Self {
            allowed_domain: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_workers: Some(DEFAULT_MAX_WORKERS),
            rate_limit: Some(DEFAULT_RATE_LIMIT),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            max_sitemap_urls: Some(DEFAULT_MAX_SITEMAP_URLS),
            output_dir: None,
            use_sitemap: Some(DEFAULT_USE_SITEMAP),
            respect_robots_txt: Some(DEFAULT_RESPECT_ROBOTS_TXT),
            exclude_patterns: Some(Vec::new()),
            include_patterns: Some(Vec::new()),
        }
    }
}

/// Where a layer came from, lowest precedence first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    Hardcoded,
    DefaultFile(PathBuf),
    Profile(String),
    Override,
    /// Value computed by the resolver (derived domain or output directory)
    Derived,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardcoded => write!(f, "hardcoded"),
            Self::DefaultFile(path) => write!(f, "default file {}", path.display()),
            Self::Profile(name) => write!(f, "profile '{}'", name),
            Self::Override => write!(f, "override"),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// Records which layer supplied each manifest field
pub type Provenance = BTreeMap<&'static str, LayerSource>;

/// An ordered list of layers, lowest precedence first
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<(LayerSource, ConfigLayer)>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a layer on top of the stack (highest precedence so far)
    pub fn push(&mut self, source: LayerSource, layer: ConfigLayer) {
        self.layers.push((source, layer));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the value of one field from the highest layer that has it
    ///
    /// Layers are scanned top-down and the first present value wins, so an
    /// absent field in a higher layer never masks a lower one.
    pub fn pick<T, F>(&self, field: F) -> Option<(T, &LayerSource)>
    where
        F: Fn(&ConfigLayer) -> Option<T>,
    {
        self.layers
            .iter()
            .rev()
            .find_map(|(source, layer)| field(layer).map(|value| (value, source)))
    }

    /// Like [`LayerStack::pick`], recording the winning source under `name`
    pub fn pick_traced<T, F>(&self, name: &'static str, provenance: &mut Provenance, field: F) -> Option<T>
    where
        F: Fn(&ConfigLayer) -> Option<T>,
    {
        let (value, source) = self.pick(field)?;
        provenance.insert(name, source.clone());
        Some(value)
    }
}
