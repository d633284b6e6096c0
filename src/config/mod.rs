//! Configuration module for Crawl Conductor
//!
//! This module turns caller input into a complete run manifest. Values come
//! from four tiers, lowest precedence first:
//!
//! 1. Hardcoded constants
//! 2. `<config_dir>/default.toml`
//! 3. A named profile (`<config_dir>/profiles/<name>.toml` or a built-in)
//! 4. Explicit overrides
//!
//! # Example
//!
//! ```no_run
//! use crawl_conductor::config::{Overrides, Resolver};
//!
//! let resolution = Resolver::default()
//!     .resolve(&Overrides::for_url("https://example.com").with_profile("fast"))
//!     .unwrap();
//! println!("Crawling with {} workers", resolution.manifest.max_workers);
//! ```

mod layers;
mod parser;
mod profiles;
mod resolver;
mod types;
mod validation;

// Re-export types
pub use layers::{ConfigLayer, LayerSource, LayerStack, Provenance};
pub use types::{Manifest, Overrides, Profile};

// Re-export resolution and file handling
pub use parser::{default_config_path, load_default_layer, load_layer, save_manifest, DEFAULT_CONFIG_FILE};
pub use profiles::{builtin_profile, list_profiles, lookup_profile};
pub use resolver::{
    default_output_base, derive_output_dir, extract_domain, Resolution, ResolveWarning, Resolver,
    ResolverSettings, UNKNOWN_DOMAIN,
};
pub use validation::validate_domain;
