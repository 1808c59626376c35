use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = twinrelay::cli::Cli::parse();
    if let Err(e) = twinrelay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
