//! Modulation and demodulation.
//!
//! This module implements the mapping of GF(2^k) symbols to antipodal (BPSK)
//! channel symbols, and the computation of the symbol probabilities that
//! initialize the decoder from the received samples.
//!
//! Each field element is sent as its k bits, most significant bit first. The
//! bit 0 is mapped to +1.0 and the bit 1 to -1.0, so the all-zero codeword is
//! transmitted as a sequence of +1.0's.

use crate::{
    error::{Error, Result},
    gf::GaloisField,
};

fn bits_per_symbol(field: &GaloisField) -> Result<usize> {
    field
        .bits_per_symbol()
        .ok_or_else(|| Error::UnsupportedField(field.order()))
}

fn check_noise_sigma(noise_sigma: f64) -> Result<()> {
    if noise_sigma.is_finite() && noise_sigma >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "noise sigma {noise_sigma} is not a non-negative finite number"
        )))
    }
}

/// Bit likelihood.
///
/// Returns the probability that `bit` was transmitted given the received
/// sample `y`, for an AWGN channel with standard deviation `noise_sigma` and
/// equiprobable bits. With the mapping 0 → +1, 1 → -1 this is
/// ```text
/// P(1 | y) = 1 / (1 + exp(2 y / sigma^2))
/// P(0 | y) = 1 - P(1 | y)
/// ```
/// A noise sigma of zero gives hard probabilities (0 or 1), and a sample of
/// exactly zero gives 0.5.
///
/// # Examples
/// ```
/// # use nb_ldpc::simulation::modulation::likelihood;
/// assert!(likelihood(1.0, 0.5, false) > 0.99);
/// assert_eq!(likelihood(0.0, 0.5, true), 0.5);
/// assert_eq!(likelihood(-1.0, 0.0, true), 1.0);
/// ```
pub fn likelihood(y: f64, noise_sigma: f64, bit: bool) -> f64 {
    let z = 2.0 * y / (noise_sigma * noise_sigma);
    let p1 = if z.is_nan() {
        0.5
    } else {
        1.0 / (1.0 + z.exp())
    };
    if bit {
        p1
    } else {
        1.0 - p1
    }
}

/// BPSK modulator.
///
/// Maps each symbol to its bits, most significant bit first, and each bit 0
/// to the symbol +1.0 and each bit 1 to the symbol -1.0.
#[derive(Debug, Clone)]
pub struct BpskModulator {
    bits: usize,
}

impl BpskModulator {
    /// Creates a new BPSK modulator for symbols of a field GF(2^k).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedField`] if the field is not a binary
    /// extension field.
    pub fn new(field: &GaloisField) -> Result<BpskModulator> {
        Ok(BpskModulator {
            bits: bits_per_symbol(field)?,
        })
    }

    /// Returns the number of bits per symbol.
    pub fn bits_per_symbol(&self) -> usize {
        self.bits
    }

    /// Modulates a sequence of symbols.
    pub fn modulate(&self, codeword: &[usize]) -> Vec<f64> {
        codeword
            .iter()
            .flat_map(|&s| {
                (0..self.bits)
                    .rev()
                    .map(move |b| if (s >> b) & 1 == 0 { 1.0 } else { -1.0 })
            })
            .collect()
    }
}

/// BPSK demodulator.
///
/// Assumes the same mapping as the [`BpskModulator`]. Computes the
/// probabilities of each symbol value from the bit likelihoods, assuming that
/// the bits of a symbol are independent.
#[derive(Debug, Clone)]
pub struct BpskDemodulator {
    noise_sigma: f64,
    bits: usize,
}

impl BpskDemodulator {
    /// Creates a new BPSK demodulator.
    ///
    /// The `noise_sigma` indicates the channel noise standard deviation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedField`] if the field is not a binary
    /// extension field, and [`Error::InvalidParameter`] if `noise_sigma` is
    /// negative or not finite.
    pub fn new(noise_sigma: f64, field: &GaloisField) -> Result<BpskDemodulator> {
        check_noise_sigma(noise_sigma)?;
        Ok(BpskDemodulator {
            noise_sigma,
            bits: bits_per_symbol(field)?,
        })
    }

    /// Returns the probability vector of a symbol given the samples of its
    /// bits.
    pub fn demodulate_symbol(&self, samples: &[f64]) -> Vec<f64> {
        debug_assert_eq!(samples.len(), self.bits);
        let p1 = samples
            .iter()
            .map(|&y| likelihood(y, self.noise_sigma, true))
            .collect::<Vec<_>>();
        (0..1usize << self.bits)
            .map(|s| {
                p1.iter()
                    .enumerate()
                    .map(|(j, &p)| {
                        // the first sample carries the most significant bit
                        if (s >> (self.bits - 1 - j)) & 1 == 1 {
                            p
                        } else {
                            1.0 - p
                        }
                    })
                    .product::<f64>()
            })
            .collect()
    }

    /// Returns the probability vectors of a sequence of symbols.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the number of samples is not a
    /// multiple of the number of bits per symbol.
    pub fn demodulate(&self, samples: &[f64]) -> Result<Vec<Vec<f64>>> {
        if samples.len() % self.bits != 0 {
            return Err(Error::DimensionMismatch(format!(
                "{} samples is not a multiple of {} bits per symbol",
                samples.len(),
                self.bits
            )));
        }
        Ok(samples
            .chunks_exact(self.bits)
            .map(|y| self.demodulate_symbol(y))
            .collect())
    }
}

/// Computes the initial probability vectors of the decoder.
///
/// The `samples` contain log2(q) received samples per variable node (see
/// [`simulate_channel`](super::channel::simulate_channel)).
///
/// # Errors
///
/// Fails if GF(q) is not a supported binary extension field, if
/// `noise_sigma` is invalid, or if the number of samples is not a multiple of
/// log2(q).
///
/// # Examples
/// ```
/// # use nb_ldpc::simulation::modulation::initial_probabilities;
/// // Two GF(4) symbols, received without noise: 0 and 2 (bits 10)
/// let p = initial_probabilities(&[1.0, 1.0, -1.0, 1.0], 0.0, 4).unwrap();
/// assert_eq!(p, vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 0.0]]);
/// ```
pub fn initial_probabilities(samples: &[f64], noise_sigma: f64, q: usize) -> Result<Vec<Vec<f64>>> {
    BpskDemodulator::new(noise_sigma, &GaloisField::new(q)?)?.demodulate(samples)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn likelihood_values() {
        let tol = 1e-12;
        for &(y, sigma) in &[(0.3, 0.8), (-1.2, 1.5), (2.0, 0.4)] {
            let p0 = likelihood(y, sigma, false);
            let p1 = likelihood(y, sigma, true);
            assert!((p0 + p1 - 1.0).abs() < tol);
            let expected = 1.0 / (1.0 + (2.0 * y / (sigma * sigma)).exp());
            assert!((p1 - expected).abs() < tol);
        }
        // positive samples favour the bit 0
        assert!(likelihood(0.5, 1.0, false) > 0.5);
        assert!(likelihood(-0.5, 1.0, true) > 0.5);
        assert_eq!(likelihood(0.0, 0.0, true), 0.5);
    }

    #[test]
    fn bpsk_modulator() {
        let modulator = BpskModulator::new(&GaloisField::new(8).unwrap()).unwrap();
        assert_eq!(modulator.bits_per_symbol(), 3);
        let x = modulator.modulate(&[6, 1]);
        assert_eq!(&x, &[-1.0, -1.0, 1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn prime_field_not_modulated() {
        assert_eq!(
            BpskModulator::new(&GaloisField::new(5).unwrap()).map(|_| ()),
            Err(Error::UnsupportedField(5))
        );
        assert_eq!(
            initial_probabilities(&[1.0], 0.5, 7),
            Err(Error::UnsupportedField(7))
        );
    }

    #[test]
    fn demodulate_noiseless() {
        let gf = GaloisField::new(8).unwrap();
        let modulator = BpskModulator::new(&gf).unwrap();
        let demodulator = BpskDemodulator::new(0.0, &gf).unwrap();
        let codeword = [0, 5, 7, 2];
        let p = demodulator.demodulate(&modulator.modulate(&codeword)).unwrap();
        for (probs, &s) in p.iter().zip(codeword.iter()) {
            for (j, &x) in probs.iter().enumerate() {
                assert_eq!(x, if j == s { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn demodulate_sums_to_one() {
        let gf = GaloisField::new(16).unwrap();
        let demodulator = BpskDemodulator::new(0.9, &gf).unwrap();
        let p = demodulator
            .demodulate(&[0.3, -1.1, 0.05, 2.0, -0.4, 0.7, 1.0, -0.2])
            .unwrap();
        assert_eq!(p.len(), 2);
        for probs in &p {
            assert_eq!(probs.len(), 16);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        // most likely symbol of the first group is 0b0100
        let best = p[0]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert_eq!(best, 0b0100);
    }

    #[test]
    fn wrong_number_of_samples() {
        assert!(matches!(
            initial_probabilities(&[1.0, 1.0, 1.0], 0.5, 4),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn invalid_noise_sigma() {
        let gf = GaloisField::new(4).unwrap();
        assert!(matches!(
            BpskDemodulator::new(-1.0, &gf),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            BpskDemodulator::new(f64::NAN, &gf),
            Err(Error::InvalidParameter(_))
        ));
    }
}
