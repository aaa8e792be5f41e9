//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Main configuration struct matching the webexport.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,

    #[serde(default)]
    pub export: ExportOptions,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub model: PathBuf,
    pub output: PathBuf,

    /// Extra directory copied verbatim into the output
    #[serde(default)]
    pub assets: Option<PathBuf>,
}

/// Options read by the export engine and the writer around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Link scripts and styles from the shared site root and emit SSI includes
    #[serde(default)]
    pub use_pt_website: bool,

    #[serde(default = "default_ssi_root")]
    pub ssi_root: String,

    /// Copy the bundled JavaScript and CSS into `<output>/javascript`
    #[serde(default = "default_true")]
    pub copy_javascript: bool,

    /// Delete the output directory before writing
    #[serde(default)]
    pub force: bool,

    /// Open the exported index page in a browser
    #[serde(default)]
    pub open: bool,

    /// Add the default "afterImage" paragraph when nothing else ends the body
    #[serde(default = "default_true")]
    pub default_end_text: bool,

    /// Treat every composite node as having an open nested view
    #[serde(default)]
    pub open_composites: bool,
}

fn default_ssi_root() -> String {
    String::from("https://ptolemy.berkeley.edu")
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            use_pt_website: false,
            ssi_root: default_ssi_root(),
            copy_javascript: true,
            force: false,
            open: false,
            default_end_text: true,
            open_composites: false,
        }
    }
}

impl ExportOptions {
    /// Common settings for publishing: force, copy scripts, open composites
    /// and open the result.
    pub fn web(mut self) -> Self {
        self.force = true;
        self.copy_javascript = true;
        self.open_composites = true;
        self.open = true;
        self
    }

    /// Root under which shared scripts and styles are found, seen from a
    /// page whose path back to the output root is `root_prefix`
    pub fn script_root(&self, root_prefix: &str) -> String {
        if self.use_pt_website {
            format!("{}/", self.ssi_root.trim_end_matches('/'))
        } else {
            root_prefix.to_string()
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        if config.paths.model.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("paths.model".into()));
        }

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Get the model file, resolved relative to config file
    pub fn model_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.model)
    }

    /// Directory containing the model file (figures and images resolve here)
    pub fn model_dir(&self) -> PathBuf {
        self.model_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Get the extra assets directory, if configured
    pub fn assets_dir(&self) -> Option<PathBuf> {
        self.paths.assets.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}
