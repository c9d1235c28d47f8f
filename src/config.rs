//! Runtime configuration loaded from a YAML file.
//!
//! Every tunable the pipeline needs lives here: the backend base URL, the
//! single request timeout, the response-cache TTL, the placeholder image,
//! and the overlay display width. The source site used a different
//! hard-coded timeout at nearly every call site (5000 to 15001 ms); this
//! crate deliberately exposes exactly one.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::info;

/// Pipeline configuration.
///
/// All fields have defaults, so a config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend REST API.
    pub api_base_url: String,
    /// Timeout applied to every backend request, in milliseconds.
    pub request_timeout_ms: u64,
    /// TTL of the in-memory response cache, in seconds.
    pub cache_ttl_secs: u64,
    /// Image URL substituted when a source image URL is empty.
    pub placeholder_image: String,
    /// Rendered page width, in pixels, that overlay boxes are computed at.
    /// The display height is derived from each page's aspect ratio.
    pub display_width: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.example.com".to_string(),
            request_timeout_ms: 10_000,
            cache_ttl_secs: 300,
            placeholder_image: "https://res.cloudinary.com/demo/image/upload/logo.png".to_string(),
            display_width: 1280.0,
        }
    }
}

/// Load configuration from a YAML file.
pub fn load_config(path: &str) -> Result<Config, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&raw)?;
    info!(path, "Loaded configuration");
    Ok(config)
}

/// Load configuration from an optional path, falling back to defaults
/// when no path is given.
pub fn load_or_default(path: Option<&str>) -> Result<Config, Box<dyn Error>> {
    match path {
        Some(p) => load_config(p),
        None => {
            info!("No config file given; using defaults");
            Ok(Config::default())
        }
    }
}
