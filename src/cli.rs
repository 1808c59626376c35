//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent for
//! container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;

#[derive(Parser)]
#[command(
    name = "twinrelay",
    version,
    about = "Two-backend HTTP forwarding proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        twinrelay run                                 Start with defaults on :9090\n  \
        twinrelay run --main-host 10.0.0.5            Point the main backend elsewhere\n  \
        twinrelay init                                Write a starter config"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Generate a starter config file
    Init(InitArgs),

    /// Validate a config file without starting
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        twinrelay run                                       Auto-detect config\n  \
        twinrelay run -c twinrelay.yaml                     Specific config file\n  \
        twinrelay run -p 8080 --auth-port 8081 --pretty     Local dev mode")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen port [default: 9090]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address [default: 0.0.0.0]
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    // -- Backends --
    /// Main backend host
    #[arg(long, env = "MAIN_BACKEND_HOST", help_heading = "Backends")]
    pub main_host: Option<String>,

    /// Main backend port
    #[arg(long, env = "MAIN_BACKEND_PORT", help_heading = "Backends")]
    pub main_port: Option<u16>,

    /// Auth backend host (serves every path starting with /auth)
    #[arg(long, env = "AUTH_BACKEND_HOST", help_heading = "Backends")]
    pub auth_host: Option<String>,

    /// Auth backend port
    #[arg(long, env = "AUTH_BACKEND_PORT", help_heading = "Backends")]
    pub auth_port: Option<u16>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Backend timeout in seconds, covering the whole exchange [default: 10]
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Max request body size in bytes [default: 1048576]
    #[arg(long, env = "MAX_BODY_SIZE", help_heading = "Tuning")]
    pub max_body: Option<usize>,
}

impl RunArgs {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            listen_host: self.host.clone(),
            listen_port: self.port,
            main_host: self.main_host.clone(),
            main_port: self.main_port,
            auth_host: self.auth_host.clone(),
            auth_port: self.auth_port,
            timeout_secs: self.timeout,
            max_body: self.max_body,
        }
    }
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        twinrelay init                          Starter config (yaml)\n  \
        twinrelay init -f toml -o proxy.toml    TOML format, custom path")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "twinrelay.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
