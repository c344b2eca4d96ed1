//! BER simulation
//!
//! This module contains utilities for BER simulation. A [`BerTest`] simulates
//! the transmission of random codewords through an AWGN channel and measures
//! the symbol and frame error rates of an NB-LDPC decoder for a list of Eb/N0
//! values.
//!
//! Frames are simulated in parallel batches with [rayon]. Each frame draws its
//! randomness from its own stream of the test seed (see
//! [`stream_rng`](crate::rand::stream_rng)), so the results only depend on the
//! seed and not on the number of threads.

use super::{
    channel::AwgnChannel,
    modulation::{BpskDemodulator, BpskModulator},
};
use crate::{
    decoder::{DecoderImplementation, LdpcDecoder},
    encoder::Encoder,
    error::{Error, Result},
    graph::TannerGraph,
    rand::stream_rng,
};
use rand::Rng;
use rayon::prelude::*;
use std::{
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

/// BER test parameters.
#[derive(Debug)]
pub struct BerTestParameters<'a> {
    /// Tanner graph of the code.
    pub graph: TannerGraph,
    /// Decoder implementation.
    pub decoder_implementation: DecoderImplementation,
    /// Maximum number of frame errors.
    ///
    /// The simulation of an Eb/N0 stops when this number of frame errors is
    /// reached.
    pub max_frame_errors: u64,
    /// Maximum number of frames.
    ///
    /// The simulation of an Eb/N0 stops when this number of frames have been
    /// simulated, even if `max_frame_errors` has not been reached.
    pub max_frames: u64,
    /// Maximum number of decoder iterations.
    pub max_iterations: usize,
    /// List of Eb/N0's (in dB) to simulate.
    pub ebn0s_db: &'a [f32],
    /// Random seed.
    pub seed: u64,
    /// An optional reporter object to which the BER test will send periodic
    /// updates about its progress.
    pub reporter: Option<Reporter>,
}

/// BER test.
///
/// This struct is used to configure and run a BER test.
#[derive(Debug)]
pub struct BerTest {
    graph: TannerGraph,
    encoder: Encoder,
    modulator: BpskModulator,
    decoder_implementation: DecoderImplementation,
    max_frame_errors: u64,
    max_frames: u64,
    max_iterations: usize,
    ebn0s_db: Vec<f32>,
    seed: u64,
    reporter: Option<Reporter>,
}

/// Progress reporter.
///
/// A reporter can optionally be passed to the BER test to receive periodic
/// progress reports.
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Sender element of a channel used to send the reports.
    pub tx: Sender<Report>,
    /// Reporting interval.
    pub interval: Duration,
}

/// BER test progress report.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Statistics for the Eb/N0 currently being simulated.
    ///
    /// The last report of each Eb/N0 contains its final statistics.
    Statistics(Statistics),
    /// The BER test has finished.
    Finished,
}

/// BER test statistics.
///
/// This structure contains the statistics for a single Eb/N0 case in a BER
/// test.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Eb/N0 in dB units.
    pub ebn0_db: f32,
    /// Standard deviation of the channel noise.
    pub noise_sigma: f64,
    /// Number of frames tested.
    pub num_frames: u64,
    /// Number of symbol errors.
    pub symbol_errors: u64,
    /// Number of frame errors.
    pub frame_errors: u64,
    /// Number of frames falsely decoded.
    ///
    /// These are frames for which the decoder converged to a valid codeword,
    /// but the codeword is different from the transmitted codeword.
    pub false_decodes: u64,
    /// Total number of decoder iterations.
    pub total_iterations: u64,
    /// Symbol error rate.
    pub ser: f64,
    /// Frame error rate.
    pub fer: f64,
    /// Average number of decoder iterations per frame.
    pub average_iterations: f64,
    /// Elapsed time for this test case.
    pub elapsed: Duration,
    /// Throughput in Mbps (referred to information bits).
    pub throughput_mbps: f64,
}

#[derive(Debug, Clone)]
struct CurrentStatistics {
    ebn0_db: f32,
    noise_sigma: f64,
    num_frames: u64,
    symbol_errors: u64,
    frame_errors: u64,
    false_decodes: u64,
    total_iterations: u64,
    start: Instant,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct FrameResult {
    symbol_errors: u64,
    success: bool,
    iterations: usize,
}

// Everything needed to simulate the frames of one Eb/N0.
#[derive(Debug)]
struct FrameSimulator<'a> {
    encoder: &'a Encoder,
    modulator: &'a BpskModulator,
    channel: AwgnChannel,
    demodulator: BpskDemodulator,
    q: usize,
    max_iterations: usize,
    seed: u64,
    point: u64,
}

impl BerTest {
    /// Creates a new BER test.
    ///
    /// This function only defines the BER test. To run it it is necessary to
    /// call the [`BerTest::run`] method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedField`] if the code is not defined over a
    /// binary extension field (which is needed for the BPSK modulation), and
    /// [`Error::InvalidParameter`] if `max_frames` or `max_frame_errors` is
    /// zero or some Eb/N0 is not finite.
    pub fn new(parameters: BerTestParameters<'_>) -> Result<BerTest> {
        if parameters.max_frames == 0 || parameters.max_frame_errors == 0 {
            return Err(Error::InvalidParameter(
                "the maximum number of frames and frame errors must be positive".to_string(),
            ));
        }
        if let Some(x) = parameters.ebn0s_db.iter().find(|x| !x.is_finite()) {
            return Err(Error::InvalidParameter(format!("invalid Eb/N0 {x} dB")));
        }
        let modulator = BpskModulator::new(parameters.graph.field())?;
        let encoder = Encoder::new(&parameters.graph);
        Ok(BerTest {
            graph: parameters.graph,
            encoder,
            modulator,
            decoder_implementation: parameters.decoder_implementation,
            max_frame_errors: parameters.max_frame_errors,
            max_frames: parameters.max_frames,
            max_iterations: parameters.max_iterations,
            ebn0s_db: parameters.ebn0s_db.to_owned(),
            seed: parameters.seed,
            reporter: parameters.reporter,
        })
    }

    /// Returns the codeword size of the code (in symbols).
    pub fn n(&self) -> usize {
        self.graph.num_vars()
    }

    /// Returns the number of information symbols of the code.
    pub fn k(&self) -> usize {
        self.encoder.dimension()
    }

    /// Returns the number of information bits per frame.
    pub fn info_bits(&self) -> usize {
        self.k() * self.modulator.bits_per_symbol()
    }

    /// Returns the rate of the code.
    pub fn rate(&self) -> f64 {
        self.k() as f64 / self.n() as f64
    }

    /// Returns the noise standard deviation corresponding to an Eb/N0.
    ///
    /// Each BPSK symbol carries `rate` information bits and has unit energy,
    /// so `Es/N0 = rate * Eb/N0` and `sigma^2 = 1 / (2 Es/N0)`.
    pub fn noise_sigma(&self, ebn0_db: f32) -> f64 {
        let ebn0 = 10.0_f64.powf(0.1 * f64::from(ebn0_db));
        (0.5 / (self.rate() * ebn0)).sqrt()
    }

    /// Runs the BER test.
    ///
    /// This function runs the BER test until completion. It returns a list of
    /// statistics for each Eb/N0, or an error.
    pub fn run(self) -> std::result::Result<Vec<Statistics>, Box<dyn std::error::Error>> {
        let batch_size = (4 * rayon::current_num_threads()) as u64;
        let mut statistics = Vec::with_capacity(self.ebn0s_db.len());
        for (point, &ebn0_db) in self.ebn0s_db.iter().enumerate() {
            let noise_sigma = self.noise_sigma(ebn0_db);
            tracing::debug!(ebn0_db, noise_sigma, "starting Eb/N0");
            let simulator = FrameSimulator {
                encoder: &self.encoder,
                modulator: &self.modulator,
                channel: AwgnChannel::new(noise_sigma, 0.0)?,
                demodulator: BpskDemodulator::new(noise_sigma, self.graph.field())?,
                q: self.graph.field().order(),
                max_iterations: self.max_iterations,
                seed: self.seed,
                point: point as u64,
            };
            let mut current = CurrentStatistics::new(ebn0_db, noise_sigma);
            let mut last_report = Instant::now();
            while !self.point_finished(&current) {
                let start = current.num_frames;
                let end = (start + batch_size).min(self.max_frames);
                let results = (start..end)
                    .into_par_iter()
                    .map_init(
                        || self.decoder_implementation.build_decoder(self.graph.clone()),
                        |decoder, frame| simulator.simulate_frame(decoder.as_mut(), frame),
                    )
                    .collect::<Result<Vec<_>>>()?;
                // Results are accounted in frame order, so the statistics do
                // not depend on the batch size.
                for result in results {
                    current.account(&result);
                    if self.point_finished(&current) {
                        break;
                    }
                }
                if let Some(reporter) = &self.reporter {
                    if last_report.elapsed() >= reporter.interval {
                        let stats = Statistics::from_current(&current, self.n(), self.info_bits());
                        reporter.tx.send(Report::Statistics(stats))?;
                        last_report = Instant::now();
                    }
                }
            }
            let stats = Statistics::from_current(&current, self.n(), self.info_bits());
            tracing::info!(
                ebn0_db,
                frames = stats.num_frames,
                frame_errors = stats.frame_errors,
                ser = stats.ser,
                fer = stats.fer,
                "Eb/N0 finished"
            );
            if let Some(reporter) = &self.reporter {
                reporter.tx.send(Report::Statistics(stats.clone()))?;
            }
            statistics.push(stats);
        }
        if let Some(reporter) = &self.reporter {
            reporter.tx.send(Report::Finished)?;
        }
        Ok(statistics)
    }

    fn point_finished(&self, current: &CurrentStatistics) -> bool {
        current.frame_errors >= self.max_frame_errors || current.num_frames >= self.max_frames
    }
}

impl FrameSimulator<'_> {
    fn simulate_frame(&self, decoder: &mut dyn LdpcDecoder, frame: u64) -> Result<FrameResult> {
        let mut rng = stream_rng(self.seed, (self.point << 40) | frame);
        let message = (0..self.encoder.dimension())
            .map(|_| rng.gen_range(0..self.q))
            .collect::<Vec<_>>();
        let codeword = self.encoder.encode(&message)?;
        let mut symbols = self.modulator.modulate(&codeword);
        self.channel.add_noise(&mut rng, &mut symbols);
        let probabilities = self.demodulator.demodulate(&symbols)?;
        let (output, success) = match decoder.decode(&probabilities, self.max_iterations) {
            Ok(output) => (output, true),
            Err(Error::NonConvergence(output)) => (output, false),
            Err(e) => return Err(e),
        };
        let symbol_errors = codeword
            .iter()
            .zip(output.codeword.iter())
            .filter(|(a, b)| a != b)
            .count() as u64;
        Ok(FrameResult {
            symbol_errors,
            success,
            iterations: output.iterations,
        })
    }
}

impl CurrentStatistics {
    fn new(ebn0_db: f32, noise_sigma: f64) -> CurrentStatistics {
        CurrentStatistics {
            ebn0_db,
            noise_sigma,
            num_frames: 0,
            symbol_errors: 0,
            frame_errors: 0,
            false_decodes: 0,
            total_iterations: 0,
            start: Instant::now(),
        }
    }

    fn account(&mut self, result: &FrameResult) {
        self.num_frames += 1;
        self.total_iterations += result.iterations as u64;
        self.symbol_errors += result.symbol_errors;
        if result.symbol_errors > 0 || !result.success {
            self.frame_errors += 1;
            if result.success {
                self.false_decodes += 1;
            }
        }
    }
}

impl Statistics {
    fn from_current(stats: &CurrentStatistics, n: usize, info_bits: usize) -> Statistics {
        let elapsed = Instant::now() - stats.start;
        let frames = stats.num_frames as f64;
        Statistics {
            ebn0_db: stats.ebn0_db,
            noise_sigma: stats.noise_sigma,
            num_frames: stats.num_frames,
            symbol_errors: stats.symbol_errors,
            frame_errors: stats.frame_errors,
            false_decodes: stats.false_decodes,
            total_iterations: stats.total_iterations,
            ser: stats.symbol_errors as f64 / (n as f64 * frames),
            fer: stats.frame_errors as f64 / frames,
            average_iterations: stats.total_iterations as f64 / frames,
            elapsed,
            throughput_mbps: 1e-6 * (info_bits as f64 * frames) / elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{construction::build_parity_check_matrix, gf::GaloisField};
    use std::sync::mpsc;

    fn graph(q: usize) -> TannerGraph {
        let h = build_parity_check_matrix(24, 12, 3, q, 0).unwrap();
        TannerGraph::new(GaloisField::new(q).unwrap(), h).unwrap()
    }

    fn parameters(ebn0s_db: &[f32]) -> BerTestParameters<'_> {
        BerTestParameters {
            graph: graph(4),
            decoder_implementation: DecoderImplementation::SumProduct,
            max_frame_errors: 10,
            max_frames: 64,
            max_iterations: 20,
            ebn0s_db,
            seed: 0,
            reporter: None,
        }
    }

    #[test]
    fn high_ebn0() {
        let (tx, rx) = mpsc::channel();
        let test = BerTest::new(BerTestParameters {
            reporter: Some(Reporter {
                tx,
                interval: Duration::from_secs(3600),
            }),
            ..parameters(&[20.0])
        })
        .unwrap();
        assert!(test.k() >= 12);
        let stats = test.run().unwrap();
        assert_eq!(stats.len(), 1);
        let stats = &stats[0];
        assert_eq!(stats.num_frames, 64);
        assert_eq!(stats.frame_errors, 0);
        assert_eq!(stats.symbol_errors, 0);
        assert_eq!(stats.ser, 0.0);
        assert_eq!(stats.fer, 0.0);
        assert!(stats.average_iterations >= 1.0);
        let reports = rx.iter().collect::<Vec<_>>();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0], Report::Statistics(stats.clone()));
        assert_eq!(reports[1], Report::Finished);
    }

    #[test]
    fn low_ebn0() {
        let stats = BerTest::new(parameters(&[-5.0, -4.0]))
            .unwrap()
            .run()
            .unwrap();
        for s in stats.iter() {
            assert_eq!(s.frame_errors, 10);
            assert!(s.num_frames >= 10);
            assert!(s.num_frames <= 64);
            assert!(s.symbol_errors > 0);
            assert!(s.false_decodes <= s.frame_errors);
        }
    }

    #[test]
    fn reproducible() {
        let ebn0s = [1.0, 3.0];
        let a = BerTest::new(parameters(&ebn0s)).unwrap().run().unwrap();
        let b = BerTest::new(parameters(&ebn0s)).unwrap().run().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.num_frames, y.num_frames);
            assert_eq!(x.symbol_errors, y.symbol_errors);
            assert_eq!(x.frame_errors, y.frame_errors);
            assert_eq!(x.total_iterations, y.total_iterations);
        }
    }

    #[test]
    fn noise_sigma() {
        let test = BerTest::new(parameters(&[0.0])).unwrap();
        let expected = (0.5 / test.rate()).sqrt();
        assert!((test.noise_sigma(0.0) - expected).abs() < 1e-12);
        assert!(test.noise_sigma(3.0) < test.noise_sigma(0.0));
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(
            BerTest::new(BerTestParameters {
                graph: graph(5),
                ..parameters(&[1.0])
            }),
            Err(Error::UnsupportedField(5))
        ));
        assert!(matches!(
            BerTest::new(BerTestParameters {
                max_frames: 0,
                ..parameters(&[1.0])
            }),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            BerTest::new(parameters(&[f32::NAN])),
            Err(Error::InvalidParameter(_))
        ));
    }
}
