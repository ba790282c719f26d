//! binv - bucket inventory for S3-compatible object storage
//!
//! Reports object count, total size and most recent modification for every
//! bucket visible to the configured credentials.

use binv_cli::commands::{self, Cli};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG; logs go to stderr so JSON output stays clean
    let filter = if cli.global.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
