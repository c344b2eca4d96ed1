//! Pseudorandom construction CLI subcommand.
//!
//! This subcommand builds a random parity check matrix over GF(q) and prints
//! it in non-binary alist format.
//!
//! # Examples
//!
//! A (96, 48) code over GF(16) with column weight 3 can be generated with
//! ```shell
//! $ nb-ldpc construct 96 48 3 16 0 > code.alist
//! ```

use crate::{
    cli::*,
    construction::{Config, FillPolicy},
};
use clap::Parser;
use std::error::Error;

/// Construction CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Generates NB-LDPC parity check matrices")]
pub struct Args {
    /// Codeword length (N)
    n: usize,
    /// Code dimension (K)
    k: usize,
    /// Column weight
    weight: usize,
    /// Field order (q)
    q: usize,
    /// Seed
    seed: u64,
    /// Fill the least loaded rows first
    #[arg(long)]
    balanced: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            n: self.n,
            k: self.k,
            weight: self.weight,
            q: self.q,
            fill_policy: match self.balanced {
                true => FillPolicy::Balanced,
                false => FillPolicy::Random,
            },
        }
    }
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = self.config().run(self.seed)?;
        print!("{}", h.alist(self.q));
        Ok(())
    }
}
