//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for values that
//! would only fail later at bind or forward time: a listen host that is
//! not an IP address, empty or malformed backend hosts, zero ports, a
//! zero timeout or body limit, and backend bases that do not parse as
//! `http` URLs. Returns a list of [`ValidationError`] values with
//! per-field suggestions.

use std::net::IpAddr;

use url::Url;

use super::model::{Backend, Config};
use crate::error::ValidationError;

/// Validate a host string. Returns `Ok(())` or a human-readable error.
pub fn validate_host(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("host cannot be empty".into());
    }
    if host.contains("://") {
        return Err("host must not include a scheme".into());
    }
    if host
        .chars()
        .any(|c| c == '/' || c == ':' || c.is_whitespace())
    {
        return Err(format!("'{host}' is not a valid host name or IPv4 address"));
    }
    Ok(())
}

/// Validate the base URL a backend expands to. Returns `Ok(())` or a human-readable error.
pub fn validate_base_url(backend: &Backend) -> Result<(), String> {
    let base = backend.base_url();
    match Url::parse(&base) {
        Ok(parsed) if parsed.scheme() == "http" && parsed.host_str().is_some() => Ok(()),
        Ok(_) => Err(format!("'{base}' is not a usable http URL")),
        Err(e) => Err(format!("'{base}' is not a valid URL ({e})")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError {
            field: "listen.host".into(),
            message: format!("'{}' is not an IP address", config.listen.host),
            suggestion: Some("use 0.0.0.0 to listen on all interfaces".into()),
        });
    }

    if config.listen.port == 0 {
        errors.push(ValidationError {
            field: "listen.port".into(),
            message: "port must be non-zero".into(),
            suggestion: Some("the default is 9090".into()),
        });
    }

    for (name, backend) in [
        ("backends.main", &config.backends.main),
        ("backends.auth", &config.backends.auth),
    ] {
        let host_ok = match validate_host(&backend.host) {
            Ok(()) => true,
            Err(message) => {
                let suggestion = backend
                    .host
                    .split_once("://")
                    .map(|(_, rest)| format!("did you mean '{}'?", rest.trim_end_matches('/')));
                errors.push(ValidationError {
                    field: format!("{name}.host"),
                    message,
                    suggestion,
                });
                false
            }
        };

        if backend.port == 0 {
            errors.push(ValidationError {
                field: format!("{name}.port"),
                message: "port must be non-zero".into(),
                suggestion: None,
            });
        } else if host_ok {
            if let Err(message) = validate_base_url(backend) {
                errors.push(ValidationError {
                    field: name.to_string(),
                    message,
                    suggestion: None,
                });
            }
        }
    }

    if config.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "timeout_secs".into(),
            message: "timeout must be non-zero".into(),
            suggestion: Some("the default is 10 seconds".into()),
        });
    }

    if config.max_body == 0 {
        errors.push(ValidationError {
            field: "max_body".into(),
            message: "body limit must be non-zero".into(),
            suggestion: Some("the default is 1048576 bytes".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
