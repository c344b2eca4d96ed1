//! # Reproducible random functions
//!
//! The matrix constructions and the simulations in this crate draw their
//! randomness from the [`ChaCha8Rng`] RNG of the [rand_chacha] crate, so that
//! a seed fully determines the results. Independent streams of the same seed
//! (see [`ChaCha8Rng::set_stream`]) are used to give each simulated frame its
//! own generator regardless of which thread processes it.
//!
//! # Examples
//! ```
//! # use nb_ldpc::rand::Rng;
//! # use nb_ldpc::rand::*;
//! let mut a = Rng::seed_from_u64(42);
//! let mut b = Rng::seed_from_u64(42);
//! b.set_stream(1);
//! assert_ne!(a.next_u64(), b.next_u64());
//! ```
use rand_chacha::ChaCha8Rng;
pub use rand_chacha::rand_core::SeedableRng;
pub use rand_core::RngCore;

/// The RNG used throughout this crate.
pub type Rng = ChaCha8Rng;

/// Returns the generator for a particular stream of a seed.
pub fn stream_rng(seed: u64, stream: u64) -> Rng {
    let mut rng = Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}
