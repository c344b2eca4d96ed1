//! Channel simulation.
//!
//! This module contains the simulation of an AWGN channel.

use super::modulation::BpskModulator;
use crate::{
    error::{Error, Result},
    gf::GaloisField,
};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// AWGN channel simulation.
///
/// This struct is used to add AWGN to symbols.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    distr: Normal<f64>,
}

impl AwgnChannel {
    /// Creates a new AWGN channel.
    ///
    /// The channel noise follows a (real) normal distribution with mean
    /// `noise_mean` and standard deviation `noise_sigma`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `noise_sigma` is not a
    /// non-negative finite number or `noise_mean` is not finite.
    pub fn new(noise_sigma: f64, noise_mean: f64) -> Result<AwgnChannel> {
        if !(noise_sigma.is_finite() && noise_sigma >= 0.0 && noise_mean.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "invalid noise parameters sigma = {noise_sigma}, mean = {noise_mean}"
            )));
        }
        Ok(AwgnChannel {
            distr: Normal::new(noise_mean, noise_sigma)
                .map_err(|e| Error::InvalidParameter(e.to_string()))?,
        })
    }

    /// Adds noise to a sequence of symbols.
    ///
    /// The noise is added in-place to the slice `symbols`. An [Rng] is used as
    /// source of randomness.
    pub fn add_noise<R: Rng + ?Sized>(&self, rng: &mut R, symbols: &mut [f64]) {
        for x in symbols.iter_mut() {
            *x += self.distr.sample(rng);
        }
    }
}

/// Simulates the transmission of the all-zero codeword.
///
/// Returns the `n * log2(q)` received samples corresponding to `n` GF(q)
/// symbols equal to zero sent with the [`BpskModulator`] mapping (all the
/// channel symbols are +1.0) through an AWGN channel with standard deviation
/// `noise_sigma` and mean `noise_mean`.
///
/// Decoding performance over this symmetric channel does not depend on the
/// transmitted codeword, so the all-zero codeword is enough to measure it.
///
/// # Errors
///
/// Fails if GF(q) is not a supported binary extension field or the noise
/// parameters are invalid.
///
/// # Examples
/// ```
/// # use nb_ldpc::simulation::channel::simulate_channel;
/// let mut rng = rand::thread_rng();
/// let samples = simulate_channel(10, 0.0, 0.0, 16, &mut rng).unwrap();
/// assert_eq!(samples, vec![1.0; 40]);
/// ```
pub fn simulate_channel<R: Rng + ?Sized>(
    n: usize,
    noise_sigma: f64,
    noise_mean: f64,
    q: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let modulator = BpskModulator::new(&GaloisField::new(q)?)?;
    let channel = AwgnChannel::new(noise_sigma, noise_mean)?;
    let mut samples = modulator.modulate(&vec![0; n]);
    channel.add_noise(rng, &mut samples);
    Ok(samples)
}
