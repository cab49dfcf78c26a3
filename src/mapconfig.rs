//! Map configuration documents.
//!
//! A map configuration lists the layers of a map. Each layer has a type
//! (`torque`, `mapnik`, ...) and options holding at least the layer's SQL.
//!
//! ```json
//! {
//!   "version": "1.3.0",
//!   "layers": [
//!     { "type": "torque",
//!       "options": { "sql": "SELECT * FROM events", "cartocss": "Map { ... }" } }
//!   ]
//! }
//! ```
//!
//! Documents load from JSON or YAML, either from strings or from files whose
//! extension picks the format.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Layer type served by the torque renderer.
pub const TORQUE_LAYER_TYPE: &str = "torque";

/// Error loading a map configuration.
#[derive(Debug, Error)]
pub enum MapConfigError {
    #[error("map config: cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("map config: invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map config: invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("map config: unsupported file extension for {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

/// Options of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Row-producing query of the layer.
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cartocss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cartocss_version: Option<String>,
    /// Options this crate does not interpret, kept for renderers.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LayerOptions {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            cartocss: None,
            cartocss_version: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the layer style, returning the updated options for chaining.
    pub fn cartocss(mut self, cartocss: impl Into<String>) -> Self {
        self.cartocss = Some(cartocss.into());
        self
    }
}

fn default_layer_type() -> String {
    "mapnik".to_string()
}

/// One map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(rename = "type", default = "default_layer_type")]
    pub kind: String,
    pub options: LayerOptions,
}

impl LayerConfig {
    pub fn new(kind: impl Into<String>, options: LayerOptions) -> Self {
        Self {
            kind: kind.into(),
            options,
        }
    }

    /// Creates a torque layer.
    pub fn torque(options: LayerOptions) -> Self {
        Self::new(TORQUE_LAYER_TYPE, options)
    }

    pub fn is_torque(&self) -> bool {
        self.kind == TORQUE_LAYER_TYPE
    }
}

/// A map configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub layers: Vec<LayerConfig>,
}

impl MapConfig {
    pub fn new(layers: Vec<LayerConfig>) -> Self {
        Self {
            version: None,
            layers,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MapConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, MapConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a configuration file, `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self, MapConfigError> = match extension.as_deref() {
            Some("json") => Self::from_json,
            Some("yaml") | Some("yml") => Self::from_yaml,
            _ => return Err(MapConfigError::UnsupportedExtension(path.to_path_buf())),
        };
        let content = fs::read_to_string(path).map_err(|source| MapConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }

    /// Returns the layer at `index`.
    pub fn layer(&self, index: usize) -> Option<&LayerConfig> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
