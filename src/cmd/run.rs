//! `twinrelay run` — start the proxy server.
//!
//! Loads configuration from defaults, an optional file, and CLI/env
//! overrides, then starts the Axum HTTP server with graceful shutdown.
//! A bind failure is returned as an error so the process exits non-zero.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config;
use crate::error::TwinrelayError;
use crate::logging;
use crate::proxy::target::Target;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), TwinrelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let cwd = std::env::current_dir()?;
    let file = config::resolve_file(args.config.as_deref(), &cwd).await;
    let config = config::load(file.as_deref(), args.overrides()).await?;

    let addr = SocketAddr::new(config.listen.host.parse()?, config.listen.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| TwinrelayError::Bind { addr, source })?;

    let state = Arc::new(AppState::from_config(&config));
    let bases = state.forwarder.bases();

    tracing::info!(
        addr = %addr,
        main = %bases.base(Target::Main),
        auth = %bases.base(Target::Auth),
        timeout = ?state.forwarder.timeout(),
        config_file = ?file,
        "twinrelay started"
    );

    let router = server::build_router(Arc::clone(&state), config.max_body);

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("twinrelay stopped");
    Ok(())
}
