//! `nb-ldpc` CLI application
//!
//! The CLI application is organized in several subcommands. The
//! supported subcommands can be seen by running `nb-ldpc`.
//! See the modules below for examples and more information about
//! how to use each subcommand.

use clap::Parser;
use std::error::Error;

pub mod ber;
pub mod construct;

/// Trait to run a CLI subcommand
pub trait Run {
    /// Run the CLI subcommand
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(author, version, name = "nb-ldpc", about = "Non-binary LDPC codes")]
pub enum Args {
    /// ber subcommand
    Ber(ber::Args),
    /// construct subcommand
    Construct(construct::Args),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match self {
            Args::Ber(x) => x.run(),
            Args::Construct(x) => x.run(),
        }
    }
}
