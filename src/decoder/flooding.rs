//! NB-LDPC decoder with flooding schedule.
//!
//! This module implements a generic message passing NB-LDPC decoder with a
//! flooding schedule. In each iteration all the check nodes are updated using
//! the variable messages of the previous iteration, and then all the variable
//! nodes are updated using the new check messages. Each node writes only its
//! own outgoing messages, so the nodes of each phase are processed in parallel
//! with [rayon].

use super::{
    arithmetic::{DecoderArithmetic, Message},
    check_probabilities, DecoderOutput, IterationReport, LdpcDecoder, SentMessages,
};
use crate::{
    error::{Error, Result},
    graph::TannerGraph,
};
use rayon::prelude::*;

/// NB-LDPC flooding decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder<A: DecoderArithmetic> {
    arithmetic: A,
    graph: TannerGraph,
    // priors and marginals of all the variable nodes, q values each
    priors: Box<[f64]>,
    marginals: Box<[f64]>,
    check_messages: SentMessages,
    var_messages: SentMessages,
    iteration: usize,
}

impl<A: DecoderArithmetic> Decoder<A> {
    /// Creates a new flooding decoder.
    ///
    /// The decoder starts with uniform priors. Use [`Decoder::initialize`] to
    /// load the channel probabilities of a received codeword.
    pub fn new(graph: TannerGraph, arithmetic: A) -> Self {
        let q = graph.field().order();
        let n = graph.num_vars();
        let check_messages = SentMessages::from_degrees(q, graph.check_degrees());
        let var_messages = SentMessages::from_degrees(q, graph.var_degrees());
        let mut decoder = Decoder {
            arithmetic,
            graph,
            priors: vec![0.0; n * q].into_boxed_slice(),
            marginals: vec![0.0; n * q].into_boxed_slice(),
            check_messages,
            var_messages,
            iteration: 0,
        };
        let uniform = vec![1.0; q];
        decoder.load_priors(std::iter::repeat(uniform.as_slice()).take(n));
        decoder
    }

    /// Returns the Tanner graph used by the decoder.
    pub fn graph(&self) -> &TannerGraph {
        &self.graph
    }

    /// Returns the current marginal of a variable node.
    ///
    /// The marginal is given in the domain of the decoder arithmetic
    /// (probabilities, or reliability metrics).
    pub fn marginal(&self, var: usize) -> &[f64] {
        let q = self.q();
        &self.marginals[var * q..(var + 1) * q]
    }

    /// Returns the number of iterations run since the last initialization.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Initializes the decoder state.
    ///
    /// The priors of the variable nodes are set from the probability vectors,
    /// which are normalized if needed. The marginals and the variable messages
    /// are set to the priors, and the check messages carry no information.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the probability vectors are not
    /// valid for the graph of the decoder. The decoder state is not modified
    /// in this case.
    pub fn initialize(&mut self, probabilities: &[Vec<f64>]) -> Result<()> {
        check_probabilities(&self.graph, probabilities)?;
        self.load_priors(probabilities.iter().map(|p| p.as_slice()));
        Ok(())
    }

    fn load_priors<'a, I>(&mut self, probabilities: I)
    where
        I: Iterator<Item = &'a [f64]>,
    {
        let q = self.q();
        for (prior, p) in self.priors.chunks_exact_mut(q).zip(probabilities) {
            self.arithmetic.from_probabilities(p, prior);
        }
        self.marginals.copy_from_slice(&self.priors);
        for (v, messages) in self.var_messages.per_source.iter_mut().enumerate() {
            let prior = &self.priors[v * q..(v + 1) * q];
            for m in messages.chunks_exact_mut(q) {
                m.copy_from_slice(prior);
            }
        }
        // no information from the checks yet
        let one = self.arithmetic.check_one();
        for messages in self.check_messages.per_source.iter_mut() {
            messages.fill(one);
        }
        self.iteration = 0;
    }

    /// Runs one decoder iteration.
    ///
    /// Updates all the check nodes and then all the variable nodes, and
    /// returns a report of the iteration.
    pub fn iterate(&mut self) -> IterationReport {
        self.iteration += 1;
        let check_degenerate = self.process_check_nodes();
        let (var_degenerate, marginal_change) = self.process_variable_nodes();
        let report = IterationReport {
            iteration: self.iteration,
            satisfied_checks: self.graph.satisfied_checks(&self.hard_decisions()),
            marginal_change,
            degenerate_messages: check_degenerate + var_degenerate,
        };
        tracing::trace!(
            iteration = report.iteration,
            satisfied_checks = report.satisfied_checks,
            marginal_change = report.marginal_change,
            degenerate_messages = report.degenerate_messages,
            "decoder iteration"
        );
        report
    }

    /// Returns the hard decisions on the current marginals.
    pub fn hard_decisions(&self) -> Vec<usize> {
        self.marginals
            .chunks_exact(self.q())
            .map(|m| self.arithmetic.hard_decision(m))
            .collect()
    }

    /// Decodes a codeword.
    ///
    /// See [`LdpcDecoder::decode`].
    pub fn decode(
        &mut self,
        probabilities: &[Vec<f64>],
        max_iterations: usize,
    ) -> Result<DecoderOutput> {
        self.decode_observed(probabilities, max_iterations, &mut |_| {})
    }

    /// Decodes a codeword, reporting the progress of each iteration.
    ///
    /// See [`LdpcDecoder::decode_observed`].
    pub fn decode_observed(
        &mut self,
        probabilities: &[Vec<f64>],
        max_iterations: usize,
        observer: &mut dyn FnMut(&IterationReport),
    ) -> Result<DecoderOutput> {
        self.initialize(probabilities)?;
        let mut converged = max_iterations == 0 && self.graph.is_codeword(&self.hard_decisions());
        while !converged && self.iteration < max_iterations {
            let report = self.iterate();
            observer(&report);
            converged = report.satisfied_checks == self.graph.num_checks();
        }
        let output = DecoderOutput {
            codeword: self.hard_decisions(),
            converged,
            iterations: self.iteration,
        };
        tracing::debug!(
            converged,
            iterations = output.iterations,
            "decoding finished"
        );
        if converged {
            Ok(output)
        } else {
            Err(Error::NonConvergence(output))
        }
    }

    fn q(&self) -> usize {
        self.graph.field().order()
    }

    fn process_check_nodes(&mut self) -> usize {
        let arithmetic = &self.arithmetic;
        let graph = &self.graph;
        let var_messages = &self.var_messages;
        let q = self.check_messages.q;
        self.check_messages
            .per_source
            .par_iter_mut()
            .enumerate()
            .map(|(c, outgoing)| {
                let incoming = graph
                    .check_edges(c)
                    .iter()
                    .map(|e| Message {
                        coefficient: e.coefficient,
                        value: var_messages.message(e.var, e.var_slot),
                    })
                    .collect::<Vec<_>>();
                arithmetic.send_check_messages(graph.field(), &incoming, |msg| {
                    outgoing[msg.dest * q..(msg.dest + 1) * q].copy_from_slice(msg.value)
                })
            })
            .sum()
    }

    fn process_variable_nodes(&mut self) -> (usize, f64) {
        let arithmetic = &self.arithmetic;
        let graph = &self.graph;
        let check_messages = &self.check_messages;
        let q = self.var_messages.q;
        self.var_messages
            .per_source
            .par_iter_mut()
            .zip(self.marginals.par_chunks_mut(q))
            .zip(self.priors.par_chunks(q))
            .enumerate()
            .map(|(v, ((outgoing, marginal), prior))| {
                let incoming = graph
                    .var_edges(v)
                    .iter()
                    .map(|e| check_messages.message(e.check, e.check_slot))
                    .collect::<Vec<_>>();
                let previous = marginal.to_vec();
                let degenerate =
                    arithmetic.send_var_messages(prior, &incoming, marginal, |msg| {
                        outgoing[msg.dest * q..(msg.dest + 1) * q].copy_from_slice(msg.value)
                    });
                let change = previous
                    .iter()
                    .zip(marginal.iter())
                    .filter(|(a, b)| a.is_finite() && b.is_finite())
                    .map(|(a, b)| (a - b).abs())
                    .sum::<f64>();
                (degenerate, change)
            })
            .reduce(|| (0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1))
    }
}

impl<A: DecoderArithmetic> LdpcDecoder for Decoder<A> {
    fn decode(
        &mut self,
        probabilities: &[Vec<f64>],
        max_iterations: usize,
    ) -> Result<DecoderOutput> {
        Decoder::decode(self, probabilities, max_iterations)
    }

    fn decode_observed(
        &mut self,
        probabilities: &[Vec<f64>],
        max_iterations: usize,
        observer: &mut dyn FnMut(&IterationReport),
    ) -> Result<DecoderOutput> {
        Decoder::decode_observed(self, probabilities, max_iterations, observer)
    }
}
