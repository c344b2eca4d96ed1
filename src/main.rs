use clap::Parser;
use nb_ldpc::cli::{Args, Run};
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[termination::display]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    Args::parse().run()
}
