//! Simulation.
//!
//! This module contains utilities to simulate the transmission of NB-LDPC
//! codewords over an AWGN channel and to measure the decoder error rates.

pub mod ber;
pub mod channel;
pub mod modulation;
