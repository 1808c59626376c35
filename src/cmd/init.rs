//! `twinrelay init` — generate a starter configuration file.
//!
//! Serializes the built-in defaults in the chosen format, so the file
//! documents every available setting. Refuses to overwrite an existing
//! file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::Config;
use crate::error::TwinrelayError;

pub fn execute(args: &InitArgs) -> Result<(), TwinrelayError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("twinrelay.{}", args.format.extension())));

    if output.exists() {
        return Err(TwinrelayError::FileExists { path: output });
    }

    let content = serialize_config(&Config::default(), &args.format)?;
    std::fs::write(&output, content)?;
    println!("Created {}", output.display());
    Ok(())
}

/// Serialize a `Config` to a formatted string in the given format.
pub fn serialize_config(config: &Config, format: &ConfigFormat) -> Result<String, TwinrelayError> {
    match format {
        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => serde_yml::to_string(config).map_err(|e| TwinrelayError::Serialize {
            source: Box::new(e),
        }),

        #[cfg(not(feature = "yaml"))]
        ConfigFormat::Yaml => Err(TwinrelayError::UnsupportedFormat("yaml".into())),

        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| TwinrelayError::Serialize {
                source: Box::new(e),
            }),

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| TwinrelayError::Serialize {
                source: Box::new(e),
            })
        }

        #[cfg(not(feature = "toml"))]
        ConfigFormat::Toml => Err(TwinrelayError::UnsupportedFormat("toml".into())),
    }
}
