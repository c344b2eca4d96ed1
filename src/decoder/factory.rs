//! NB-LDPC decoder factory.
//!
//! This module contains routines to build an NB-LDPC decoder generically over
//! the arithmetic implementation. Such decoders are represented by `Box<dyn
//! LdpcDecoder>`, using the trait [`LdpcDecoder`].

use super::{
    arithmetic::{MinMax, SumProduct},
    flooding::Decoder,
    LdpcDecoder,
};
use crate::graph::TannerGraph;
use enum_iterator::Sequence;

/// NB-LDPC decoder implementation.
///
/// This enum lists the decoder implementations corresponding to different
/// arithmetic rules.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Sequence, clap::ValueEnum)]
pub enum DecoderImplementation {
    /// The [`SumProduct`] implementation, working with probabilities.
    #[value(name = "SumProduct")]
    SumProduct,
    /// The [`MinMax`] implementation, working with reliability metrics.
    #[value(name = "MinMax")]
    MinMax,
}

impl DecoderImplementation {
    /// Builds an NB-LDPC decoder.
    ///
    /// Given a Tanner graph, this function builds a flooding decoder
    /// corresponding to this decoder implementation.
    pub fn build_decoder(&self, graph: TannerGraph) -> Box<dyn LdpcDecoder> {
        match self {
            DecoderImplementation::SumProduct => Box::new(Decoder::new(graph, SumProduct::new())),
            DecoderImplementation::MinMax => Box::new(Decoder::new(graph, MinMax::new())),
        }
    }
}

impl std::str::FromStr for DecoderImplementation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SumProduct" => DecoderImplementation::SumProduct,
            "MinMax" => DecoderImplementation::MinMax,
            _ => return Err("invalid decoder implementation"),
        })
    }
}

impl std::fmt::Display for DecoderImplementation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DecoderImplementation::SumProduct => "SumProduct",
                DecoderImplementation::MinMax => "MinMax",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{gf::GaloisField, sparse::SparseMatrix};

    #[test]
    fn names() {
        for implementation in enum_iterator::all::<DecoderImplementation>() {
            let name = implementation.to_string();
            assert_eq!(name.parse::<DecoderImplementation>(), Ok(implementation));
        }
        assert!("BitFlip".parse::<DecoderImplementation>().is_err());
    }

    #[test]
    fn build_all() {
        let h = SparseMatrix::from_dense(&ndarray::arr2(&[[1, 1, 0], [0, 2, 3]]));
        let graph = TannerGraph::new(GaloisField::new(4).unwrap(), h).unwrap();
        for implementation in enum_iterator::all::<DecoderImplementation>() {
            let mut decoder = implementation.build_decoder(graph.clone());
            let output = decoder
                .decode(&[vec![1.0, 0.0, 0.0, 0.0], vec![0.25; 4], vec![0.7, 0.1, 0.1, 0.1]], 5)
                .unwrap();
            assert_eq!(output.codeword, vec![0, 0, 0]);
        }
    }
}
