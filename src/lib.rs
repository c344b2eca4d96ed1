//! # Non-binary LDPC codes
//!
//! `nb_ldpc` implements non-binary low-density parity-check (NB-LDPC) codes
//! over finite fields GF(q). It provides the field arithmetic, random
//! construction of sparse parity check matrices, a systematic encoder, an AWGN
//! channel model with BPSK modulation, and iterative message passing decoders
//! using the sum-product and the min-max algorithms.
//!
//! It can be used as a Rust library or as a CLI tool that allows access from
//! the command line to the construction of codes and to BER simulations. See
//! [`cli`] for documentation about the usage of the CLI tool.
//!
//! # Examples
//! ```
//! use nb_ldpc::{construction::build_parity_check_matrix, gf::GaloisField,
//!     graph::TannerGraph, decoder::{decode, DecoderImplementation},
//!     simulation::{channel::simulate_channel, modulation::initial_probabilities}};
//! use nb_ldpc::rand::{Rng, SeedableRng};
//!
//! let (n, k, q, sigma) = (48, 24, 16, 0.4);
//! let h = build_parity_check_matrix(n, k, 3, q, 1).unwrap();
//! let graph = TannerGraph::new(GaloisField::new(q).unwrap(), h).unwrap();
//! let samples = simulate_channel(n, sigma, 0.0, q, &mut Rng::seed_from_u64(0)).unwrap();
//! let probabilities = initial_probabilities(&samples, sigma, q).unwrap();
//! match decode(&graph, &probabilities, 30, DecoderImplementation::MinMax) {
//!     Ok(output) => assert!(graph.is_codeword(&output.codeword)),
//!     Err(e) => println!("{e}"),
//! }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod construction;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod gf;
pub mod graph;
pub mod rand;
pub mod simulation;
pub mod sparse;
