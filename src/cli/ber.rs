//! BER test CLI subcommand.
//!
//! This subcommand can be used to perform a BER test of an NB-LDPC decoder.
//!
//! # Examples
//!
//! A code over GF(16) can be simulated with
//! ```shell
//! $ nb-ldpc ber --min-ebn0 0.0 --max-ebn0 3.05 --step-ebn0 0.5 \
//!       --decoder MinMax code.alist
//! ```
//!
//! The alist file can be generated with the [construct](super::construct)
//! subcommand.

use crate::{
    cli::*,
    decoder::DecoderImplementation,
    gf::GaloisField,
    graph::TannerGraph,
    simulation::ber::{BerTest, BerTestParameters, Report, Reporter, Statistics},
    sparse::SparseMatrix,
};
use clap::Parser;
use console::Term;
use std::{
    error::Error,
    fs::File,
    io::Write,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

/// BER test CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs a BER simulation")]
pub struct Args {
    /// alist file for the code
    alist: String,
    /// Output file for simulation results
    #[arg(long)]
    output_file: Option<String>,
    /// Decoder implementation
    #[arg(long, default_value = "SumProduct")]
    decoder: DecoderImplementation,
    /// Minimum Eb/N0 (dB)
    #[arg(long)]
    min_ebn0: f64,
    /// Maximum Eb/N0 (dB)
    #[arg(long)]
    max_ebn0: f64,
    /// Eb/N0 step (dB)
    #[arg(long)]
    step_ebn0: f64,
    /// Maximum number of iterations
    #[arg(long, default_value = "100")]
    max_iter: usize,
    /// Number of frame errors to collect
    #[arg(long, default_value = "100")]
    frame_errors: u64,
    /// Maximum number of frames per Eb/N0
    #[arg(long, default_value = "100000")]
    max_frames: u64,
    /// Seed
    #[arg(long, default_value = "0")]
    seed: u64,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let (h, q) = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let graph = TannerGraph::new(GaloisField::new(q)?, h)?;
        let mut output_file = if let Some(f) = &self.output_file {
            Some(File::create(f)?)
        } else {
            None
        };
        if !(self.step_ebn0 > 0.0 && self.min_ebn0 <= self.max_ebn0) {
            return Err("invalid Eb/N0 range".into());
        }
        let num_ebn0s = ((self.max_ebn0 - self.min_ebn0) / self.step_ebn0).floor() as usize + 1;
        let ebn0s = (0..num_ebn0s)
            .map(|k| (self.min_ebn0 + k as f64 * self.step_ebn0) as f32)
            .collect::<Vec<_>>();
        let (report_tx, report_rx) = mpsc::channel();
        let reporter = Reporter {
            tx: report_tx,
            interval: Duration::from_millis(500),
        };
        let test = BerTest::new(BerTestParameters {
            graph,
            decoder_implementation: self.decoder,
            max_frame_errors: self.frame_errors,
            max_frames: self.max_frames,
            max_iterations: self.max_iter,
            ebn0s_db: &ebn0s,
            seed: self.seed,
            reporter: Some(reporter),
        })?;
        self.write_details(std::io::stdout(), &test, q)?;
        if let Some(f) = &mut output_file {
            self.write_details(&*f, &test, q)?;
        }
        let mut progress = Progress::new(report_rx, output_file);
        let progress = std::thread::spawn(move || progress.run());
        test.run()?;
        match progress.join() {
            Ok(ret) => ret.map_err(|e| e as Box<dyn Error>),
            Err(_) => Err("progress thread panicked".into()),
        }
    }
}

impl Args {
    fn write_details<W: Write>(&self, mut f: W, test: &BerTest, q: usize) -> std::io::Result<()> {
        writeln!(f, "BER TEST PARAMETERS")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "Simulation:")?;
        writeln!(f, " - Minimum Eb/N0: {:.2} dB", self.min_ebn0)?;
        writeln!(f, " - Maximum Eb/N0: {:.2} dB", self.max_ebn0)?;
        writeln!(f, " - Eb/N0 step: {:.2} dB", self.step_ebn0)?;
        writeln!(f, " - Number of frame errors: {}", self.frame_errors)?;
        writeln!(f, " - Maximum number of frames: {}", self.max_frames)?;
        writeln!(f, " - Seed: {}", self.seed)?;
        writeln!(f, "Channel:")?;
        writeln!(f, " - Modulation: BPSK")?;
        writeln!(f, "NB-LDPC code:")?;
        writeln!(f, " - alist: {}", self.alist)?;
        writeln!(f, " - Field: GF({q})")?;
        writeln!(f, " - Information symbols (K): {}", test.k())?;
        writeln!(f, " - Codeword size (N): {}", test.n())?;
        writeln!(f, " - Code rate: {:.3}", test.rate())?;
        writeln!(f, "NB-LDPC decoder:")?;
        writeln!(f, " - Implementation: {}", self.decoder)?;
        writeln!(f, " - Maximum iterations: {}", self.max_iter)?;
        writeln!(f)?;
        Ok(())
    }
}

#[derive(Debug)]
struct Progress {
    rx: Receiver<Report>,
    term: Term,
    output_file: Option<File>,
}

impl Progress {
    fn new(rx: Receiver<Report>, output_file: Option<File>) -> Progress {
        Progress {
            rx,
            term: Term::stdout(),
            output_file,
        }
    }

    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        ctrlc::set_handler({
            let term = self.term.clone();
            move || {
                let _ = term.write_line("");
                let _ = term.show_cursor();
                std::process::exit(0);
            }
        })?;

        let ret = self.work();
        self.term.write_line("")?;
        self.term.show_cursor()?;
        ret
    }

    fn work(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        self.term.set_title("nb-ldpc ber");
        self.term.hide_cursor()?;
        self.term.write_line(Self::format_header())?;
        if let Some(f) = &mut self.output_file {
            writeln!(f, "{}", Self::format_header())?;
        }
        let mut last_stats: Option<Statistics> = None;
        loop {
            // The BER test drops the sender if it fails
            let Ok(Report::Statistics(stats)) = self.rx.recv() else {
                if let (Some(f), Some(s)) = (&mut self.output_file, &last_stats) {
                    writeln!(f, "{}", &Self::format_progress(s))?;
                }
                return Ok(());
            };
            if let (Some(f), Some(s)) = (&mut self.output_file, &last_stats) {
                if s.ebn0_db != stats.ebn0_db {
                    writeln!(f, "{}", &Self::format_progress(s))?;
                }
            }
            match &last_stats {
                Some(s) if s.ebn0_db == stats.ebn0_db => {
                    self.term.move_cursor_up(1)?;
                    self.term.clear_line()?;
                }
                _ => (),
            };
            self.term.write_line(&Self::format_progress(&stats))?;
            last_stats = Some(stats);
        }
    }

    fn format_header() -> &'static str {
        "  Eb/N0 |   Frames | Symb err | Frame er | False de |     SER |     FER | Avg iter | Throughp | Elapsed\n\
         --------|----------|----------|----------|----------|---------|---------|----------|----------|----------"
    }

    fn format_progress(stats: &Statistics) -> String {
        format!(
            "{:7.2} | {:8} | {:8} | {:8} | {:8} | {:7.2e} | {:7.2e} | {:8.1} | {:8.3} | {}",
            stats.ebn0_db,
            stats.num_frames,
            stats.symbol_errors,
            stats.frame_errors,
            stats.false_decodes,
            stats.ser,
            stats.fer,
            stats.average_iterations,
            stats.throughput_mbps,
            humantime::format_duration(Duration::from_secs(stats.elapsed.as_secs()))
        )
    }
}
