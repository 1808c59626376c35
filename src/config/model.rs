//! Serde data structures for the twinrelay configuration file.
//!
//! Contains [`Config`] (the root), [`Listen`], [`Backends`] and
//! [`Backend`]. All types derive `Serialize` and `Deserialize` with
//! `deny_unknown_fields` for strict parsing, and every field has a
//! default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 9090;
pub const DEFAULT_BACKEND_HOST: &str = "192.168.49.2";
pub const DEFAULT_MAIN_PORT: u16 = 30300;
pub const DEFAULT_AUTH_PORT: u16 = 30400;

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_body() -> usize {
    1_048_576
}

fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_string()
}

const fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bound on the whole outbound exchange, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest inbound body accepted, in bytes.
    #[serde(default = "default_max_body")]
    pub max_body: usize,

    #[serde(default)]
    pub listen: Listen,

    #[serde(default)]
    pub backends: Backends,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_body: default_max_body(),
            listen: Listen::default(),
            backends: Backends::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Listen {
    #[serde(default = "default_listen_host")]
    pub host: String,

    #[serde(default = "default_listen_port")]
    pub port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: default_listen_host(),
            port: default_listen_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Backends {
    #[serde(default = "Backend::default_main")]
    pub main: Backend,

    #[serde(default = "Backend::default_auth")]
    pub auth: Backend,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            main: Backend::default_main(),
            auth: Backend::default_auth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Backend {
    pub host: String,
    pub port: u16,
}

impl Backend {
    fn default_main() -> Self {
        Self {
            host: DEFAULT_BACKEND_HOST.to_string(),
            port: DEFAULT_MAIN_PORT,
        }
    }

    fn default_auth() -> Self {
        Self {
            host: DEFAULT_BACKEND_HOST.to_string(),
            port: DEFAULT_AUTH_PORT,
        }
    }

    /// `http://host:port`, with no trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
