//! `twinrelay validate` — check a configuration file for errors.
//!
//! Parses and validates the config file, reporting results in either
//! human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::parse_config_str;
use crate::config::validation;
use crate::error::TwinrelayError;

pub fn execute(args: &ValidateArgs) -> Result<(), TwinrelayError> {
    let path = &args.config;

    if !path.exists() {
        return Err(TwinrelayError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(TwinrelayError::ConfigValidation { errors });
    }

    let main = config.backends.main.base_url();
    let auth = config.backends.auth.base_url();

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {} is valid", path.display());
            println!(
                "  listen:   {}:{}",
                config.listen.host, config.listen.port
            );
            println!("  main:     {main}");
            println!("  auth:     {auth} (paths starting with /auth)");
            println!("  timeout:  {}s", config.timeout_secs);
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "listen": format!("{}:{}", config.listen.host, config.listen.port),
                    "main": main,
                    "auth": auth,
                    "timeout_secs": config.timeout_secs,
                })
            );
        }
    }

    Ok(())
}
