//! Configuration loading, layering, and validation.
//!
//! A [`Config`] is assembled from three layers, lowest first: built-in
//! defaults, an optional config file (YAML, JSON or TOML depending on
//! enabled features), and [`Overrides`] collected from CLI flags and
//! environment variables. Submodules provide the data model and
//! validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::TwinrelayError;
use model::Config;
use validation::validate;

/// File names probed in the working directory when no `--config` is given.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "twinrelay.yaml",
    "twinrelay.yml",
    "twinrelay.json",
    "twinrelay.toml",
];

/// Values supplied on the command line or through the environment.
///
/// Every field is optional; a `None` leaves the file or default value
/// in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen_host: Option<String>,
    pub listen_port: Option<u16>,
    pub main_host: Option<String>,
    pub main_port: Option<u16>,
    pub auth_host: Option<String>,
    pub auth_port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub max_body: Option<usize>,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.listen_host {
            config.listen.host = host;
        }
        if let Some(port) = self.listen_port {
            config.listen.port = port;
        }
        if let Some(host) = self.main_host {
            config.backends.main.host = host;
        }
        if let Some(port) = self.main_port {
            config.backends.main.port = port;
        }
        if let Some(host) = self.auth_host {
            config.backends.auth.host = host;
        }
        if let Some(port) = self.auth_port {
            config.backends.auth.port = port;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(max_body) = self.max_body {
            config.max_body = max_body;
        }
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, TwinrelayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| TwinrelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| TwinrelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| TwinrelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(TwinrelayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read and parse a config file. Validation is left to the caller so that
/// overrides can be applied first.
pub async fn read_file(path: &Path) -> Result<Config, TwinrelayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TwinrelayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TwinrelayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Pick the config file to load: the explicit path if any, otherwise the
/// first auto-detected candidate in `dir`.
pub async fn resolve_file(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Some(path);
        }
    }

    None
}

/// Build the effective configuration: defaults, then `file` when present,
/// then `overrides`, then validation.
pub async fn load(file: Option<&Path>, overrides: Overrides) -> Result<Config, TwinrelayError> {
    let mut config = match file {
        Some(path) => read_file(path).await?,
        None => Config::default(),
    };

    overrides.apply(&mut config);

    validate(&config).map_err(|errors| TwinrelayError::ConfigValidation { errors })?;
    Ok(config)
}
