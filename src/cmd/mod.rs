//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], or [`validate`]. Each handler
//! lives in its own submodule.

pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::TwinrelayError;

pub async fn dispatch(cli: Cli) -> Result<(), TwinrelayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  twinrelay v{version} \u{2014} two-backend HTTP forwarding proxy\n\n  \
         No command provided. To get started:\n\n    \
         twinrelay run                     Start the proxy on 0.0.0.0:9090\n    \
         twinrelay run -c twinrelay.yaml   Start with a specific config file\n    \
         twinrelay init                    Generate a starter config\n    \
         twinrelay --help                  See all commands and options\n"
    );
}
