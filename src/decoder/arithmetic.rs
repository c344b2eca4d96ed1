//! NB-LDPC decoder arithmetic.
//!
//! This module contains the trait [`DecoderArithmetic`], which defines generic
//! arithmetic rules used by a message passing NB-LDPC decoder, and implementors
//! of that trait. The decoder [`Decoder`](super::flooding::Decoder) is generic
//! over the `DecoderArithmetic` trait, so it can be used to obtain
//! monomorphized implementations for different arithmetic rules.
//!
//! Both the sum-product and the min-max algorithms have the same structure.
//! The check node update is a convolution over the additive group of GF(q),
//! which combines messages with one operation (product, or maximum) and
//! marginalizes over the configurations satisfying the parity check with
//! another operation (sum, or minimum). The variable node update combines the
//! channel prior with the incoming messages (product, or sum of metrics).
//!
//! # References
//!
//! [1] D. Declercq and M. Fossorier, Decoding Algorithms for Nonbinary LDPC
//! Codes Over GF(q), IEEE Transactions on Communications, vol. 55, no. 4,
//! pp. 633-643, April 2007.
//!
//! [2] V. Savin, Min-Max decoding for non binary LDPC codes, IEEE International
//! Symposium on Information Theory, 2008, pp. 960-964.

use crate::gf::GaloisField;

/// Incoming message of a check node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Message<'a> {
    /// Coefficient of the edge through which the message arrives.
    pub coefficient: usize,
    /// Value of the message, indexed by the symbol value of the variable
    /// node.
    pub value: &'a [f64],
}

/// Outgoing message of a node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SentMessage<'a> {
    /// Message destination.
    ///
    /// Contains the position of the destination among the edges of the node
    /// sending the message.
    pub dest: usize,
    /// Value of the message, indexed by the symbol value of the variable
    /// node.
    pub value: &'a [f64],
}

/// NB-LDPC decoder arithmetic.
///
/// This trait models generic arithmetic rules for a message passing NB-LDPC
/// decoder. Implementors define the elementary operations used to combine
/// messages, and how messages are normalized and turned into hard decisions.
/// The node update rules [`DecoderArithmetic::send_check_messages`] and
/// [`DecoderArithmetic::send_var_messages`] are provided in terms of these
/// operations.
///
/// In both node updates, the message sent through an edge never includes the
/// message received through that same edge.
pub trait DecoderArithmetic: std::fmt::Debug + Send + Sync {
    /// Converts a probability vector to the message domain.
    ///
    /// The probability vector has nonnegative entries and a positive sum, but
    /// it is not necessarily normalized.
    fn from_probabilities(&self, probabilities: &[f64], message: &mut [f64]);

    /// Value of an impossible symbol.
    ///
    /// This is the neutral element of [`DecoderArithmetic::check_marginalize`].
    fn check_zero(&self) -> f64;

    /// Value of a certain symbol.
    ///
    /// This is the neutral element of [`DecoderArithmetic::check_combine`].
    fn check_one(&self) -> f64;

    /// Combines the values of the symbols in a configuration at a check node.
    fn check_combine(&self, a: f64, b: f64) -> f64;

    /// Marginalizes the values of two configurations at a check node.
    fn check_marginalize(&self, a: f64, b: f64) -> f64;

    /// Combines two values at a variable node.
    fn var_combine(&self, a: f64, b: f64) -> f64;

    /// Normalizes a message in place.
    ///
    /// Returns `false` if the message is degenerate (it has no mass, or
    /// contains a NaN) and cannot be normalized. The contents of a degenerate
    /// message are unspecified after this call.
    fn normalize(&self, message: &mut [f64]) -> bool;

    /// Returns the most likely symbol given a variable node marginal.
    ///
    /// Ties are resolved in favour of the smallest symbol.
    fn hard_decision(&self, marginal: &[f64]) -> usize;

    /// Send check messages from a check node.
    ///
    /// This function is called with the list of variable messages arriving to
    /// a check node, and a closure that is called to send each check message
    /// outgoing from that check node.
    ///
    /// For the edge with coefficient h_n, the value of the outgoing message for
    /// the symbol s is the marginalization, over all the values of the other
    /// variables that satisfy the parity check when x_n = s, of the
    /// combination of their incoming messages. This is computed with
    /// forward-backward convolutions over GF(q).
    ///
    /// Degenerate outgoing messages are not sent. The function returns the
    /// number of such messages.
    fn send_check_messages<F>(
        &self,
        field: &GaloisField,
        var_messages: &[Message<'_>],
        mut send: F,
    ) -> usize
    where
        F: FnMut(SentMessage<'_>),
        Self: Sized,
    {
        let q = field.order();
        let d = var_messages.len();

        // Messages indexed by the value of h * x instead of x.
        let permuted = var_messages
            .iter()
            .map(|m| {
                let mut t = vec![self.check_zero(); q];
                for (x, &v) in m.value.iter().enumerate() {
                    t[field.mul(m.coefficient, x)] = v;
                }
                t
            })
            .collect::<Vec<_>>();

        // forward[j] is the convolution of the messages 0..=j, and backward[j]
        // the convolution of the messages j..d.
        let mut forward: Vec<Vec<f64>> = Vec::with_capacity(d);
        for t in permuted.iter() {
            let f = match forward.last() {
                Some(prev) => convolve(self, field, prev, t),
                None => t.clone(),
            };
            forward.push(f);
        }
        let mut backward: Vec<Vec<f64>> = vec![Vec::new(); d];
        for j in (0..d).rev() {
            backward[j] = match backward.get(j + 1) {
                Some(next) => convolve(self, field, &permuted[j], next),
                None => permuted[j].clone(),
            };
        }

        // Constraint with no other variables: the sum must be zero.
        let mut unit = vec![self.check_zero(); q];
        unit[0] = self.check_one();

        let mut out = vec![0.0; q];
        let mut degenerate = 0;
        for (j, msg) in var_messages.iter().enumerate() {
            let combined;
            let others: &[f64] = match (j.checked_sub(1).map(|i| &forward[i]), backward.get(j + 1)) {
                (None, None) => &unit,
                (Some(f), None) => f,
                (None, Some(b)) => b,
                (Some(f), Some(b)) => {
                    combined = convolve(self, field, f, b);
                    &combined
                }
            };
            // h_n s + (sum of the other terms) = 0
            for (s, o) in out.iter_mut().enumerate() {
                *o = others[field.neg(field.mul(msg.coefficient, s))];
            }
            if self.normalize(&mut out) {
                send(SentMessage {
                    dest: j,
                    value: &out,
                });
            } else {
                degenerate += 1;
            }
        }
        degenerate
    }

    /// Send variable messages from a variable node.
    ///
    /// This function is called with the channel prior of a variable node
    /// (already in the message domain), the list of check messages arriving to
    /// that variable node, the current marginal of the variable node, and a
    /// closure that is called to send each variable message outgoing from that
    /// variable node.
    ///
    /// The message sent to each check node combines the prior with the
    /// messages from all the other check nodes. The marginal, which combines
    /// the prior with all the messages, is updated in place.
    ///
    /// Degenerate outgoing messages are not sent, and a degenerate marginal
    /// leaves `marginal` unchanged. The function returns the number of such
    /// messages (counting the marginal).
    fn send_var_messages<F>(
        &self,
        prior: &[f64],
        check_messages: &[&[f64]],
        marginal: &mut [f64],
        mut send: F,
    ) -> usize
    where
        F: FnMut(SentMessage<'_>),
        Self: Sized,
    {
        let mut out = vec![0.0; prior.len()];
        let mut degenerate = 0;
        for j in 0..check_messages.len() {
            // Exclude the contribution of the check node j
            for (s, o) in out.iter_mut().enumerate() {
                *o = check_messages
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != j)
                    .fold(prior[s], |acc, (_, m)| self.var_combine(acc, m[s]));
            }
            if self.normalize(&mut out) {
                send(SentMessage {
                    dest: j,
                    value: &out,
                });
            } else {
                degenerate += 1;
            }
        }

        for (s, o) in out.iter_mut().enumerate() {
            *o = check_messages
                .iter()
                .fold(prior[s], |acc, m| self.var_combine(acc, m[s]));
        }
        if self.normalize(&mut out) {
            marginal.copy_from_slice(&out);
        } else {
            degenerate += 1;
        }
        degenerate
    }
}

// Convolution over the additive group of GF(q):
// c[z] = marginalize_{x + y = z} combine(a[x], b[y])
fn convolve<A: DecoderArithmetic>(arithmetic: &A, field: &GaloisField, a: &[f64], b: &[f64]) -> Vec<f64> {
    let zero = arithmetic.check_zero();
    let mut c = vec![zero; a.len()];
    for (x, &ax) in a.iter().enumerate() {
        if ax == zero {
            // contributes nothing
            continue;
        }
        for (y, &by) in b.iter().enumerate() {
            let z = field.add(x, y);
            c[z] = arithmetic.check_marginalize(c[z], arithmetic.check_combine(ax, by));
        }
    }
    c
}

/// Sum-product (belief propagation) arithmetic.
///
/// Messages are probability vectors normalized to sum one. Check messages are
/// computed with sum-of-products convolutions, and variable messages as
/// products of the incoming messages and the prior.
///
/// See Section III in [1].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SumProduct {}

impl SumProduct {
    /// Creates a new [`SumProduct`] decoder arithmetic object.
    pub fn new() -> SumProduct {
        SumProduct::default()
    }
}

impl DecoderArithmetic for SumProduct {
    fn from_probabilities(&self, probabilities: &[f64], message: &mut [f64]) {
        message.copy_from_slice(probabilities);
        self.normalize(message);
    }

    fn check_zero(&self) -> f64 {
        0.0
    }

    fn check_one(&self) -> f64 {
        1.0
    }

    fn check_combine(&self, a: f64, b: f64) -> f64 {
        a * b
    }

    fn check_marginalize(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn var_combine(&self, a: f64, b: f64) -> f64 {
        a * b
    }

    fn normalize(&self, message: &mut [f64]) -> bool {
        let sum = message.iter().sum::<f64>();
        if !(sum > 0.0 && sum.is_finite()) {
            return false;
        }
        for x in message.iter_mut() {
            *x /= sum;
        }
        true
    }

    fn hard_decision(&self, marginal: &[f64]) -> usize {
        let mut best = 0;
        for (s, &p) in marginal.iter().enumerate() {
            if p > marginal[best] {
                best = s;
            }
        }
        best
    }
}

/// Min-max arithmetic.
///
/// Messages are reliability metrics: negative log-likelihoods shifted so that
/// the most likely symbol has metric zero. Impossible symbols have an infinite
/// metric. Check messages take, for each symbol, the minimum over the
/// configurations satisfying the parity check of the maximum metric in the
/// configuration. Variable messages are sums of metrics.
///
/// See [2].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinMax {}

impl MinMax {
    /// Creates a new [`MinMax`] decoder arithmetic object.
    pub fn new() -> MinMax {
        MinMax::default()
    }
}

impl DecoderArithmetic for MinMax {
    fn from_probabilities(&self, probabilities: &[f64], message: &mut [f64]) {
        for (m, &p) in message.iter_mut().zip(probabilities.iter()) {
            *m = -p.ln();
        }
        self.normalize(message);
    }

    fn check_zero(&self) -> f64 {
        f64::INFINITY
    }

    fn check_one(&self) -> f64 {
        0.0
    }

    fn check_combine(&self, a: f64, b: f64) -> f64 {
        a.max(b)
    }

    fn check_marginalize(&self, a: f64, b: f64) -> f64 {
        a.min(b)
    }

    fn var_combine(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn normalize(&self, message: &mut [f64]) -> bool {
        if message.iter().any(|x| x.is_nan()) {
            return false;
        }
        let min = message.iter().copied().fold(f64::INFINITY, f64::min);
        if !min.is_finite() {
            return false;
        }
        for x in message.iter_mut() {
            *x -= min;
        }
        true
    }

    fn hard_decision(&self, marginal: &[f64]) -> usize {
        let mut best = 0;
        for (s, &m) in marginal.iter().enumerate() {
            if m < marginal[best] {
                best = s;
            }
        }
        best
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn gf4() -> GaloisField {
        GaloisField::new(4).unwrap()
    }

    fn collect_check<A: DecoderArithmetic>(
        arithmetic: &A,
        field: &GaloisField,
        messages: &[Message<'_>],
    ) -> (Vec<Option<Vec<f64>>>, usize) {
        let mut sent = vec![None; messages.len()];
        let degenerate = arithmetic.send_check_messages(field, messages, |m| {
            sent[m.dest] = Some(m.value.to_vec());
        });
        (sent, degenerate)
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn sum_product_check_node() {
        // Coefficients equal to one: the outgoing message is the
        // convolution of the other two under XOR.
        let u0 = [0.2, 0.4, 0.3, 0.1];
        let u1 = [0.5, 0.1, 0.1, 0.3];
        let u2 = [0.2, 0.2, 0.4, 0.2];
        let messages = [
            Message {
                coefficient: 1,
                value: &u0,
            },
            Message {
                coefficient: 1,
                value: &u1,
            },
            Message {
                coefficient: 1,
                value: &u2,
            },
        ];
        let (sent, degenerate) = collect_check(&SumProduct::new(), &gf4(), &messages);
        assert_eq!(degenerate, 0);
        assert_close(sent[0].as_ref().unwrap(), &[0.22, 0.26, 0.30, 0.22]);
        for m in sent.iter() {
            let m = m.as_ref().unwrap();
            assert!((m.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sum_product_check_node_coefficients() {
        // Degree 2 check h0 x0 + h1 x1 = 0 with x1 known: x0 = h1 x1 / h0.
        let field = gf4();
        let known = [0.0, 0.0, 0.0, 1.0];
        let uniform = [0.25; 4];
        let messages = [
            Message {
                coefficient: 2,
                value: &uniform,
            },
            Message {
                coefficient: 3,
                value: &known,
            },
        ];
        let (sent, _) = collect_check(&SumProduct::new(), &field, &messages);
        let x0 = field.div(field.mul(3, 3), 2).unwrap();
        let mut expected = [0.0; 4];
        expected[x0] = 1.0;
        assert_close(sent[0].as_ref().unwrap(), &expected);
        assert_close(sent[1].as_ref().unwrap(), &uniform);
    }

    #[test]
    fn degree_one_check_node() {
        let u = [0.1, 0.2, 0.3, 0.4];
        let messages = [Message {
            coefficient: 3,
            value: &u,
        }];
        let (sent, _) = collect_check(&SumProduct::new(), &gf4(), &messages);
        assert_close(sent[0].as_ref().unwrap(), &[1.0, 0.0, 0.0, 0.0]);
        let (sent, _) = collect_check(&MinMax::new(), &gf4(), &messages);
        assert_eq!(
            sent[0].as_ref().unwrap(),
            &[0.0, f64::INFINITY, f64::INFINITY, f64::INFINITY]
        );
    }

    #[test]
    fn min_max_check_node() {
        let u0 = [0.0, 0.0, 0.0, 0.0];
        let u1 = [0.0, 2.0, 1.0, 3.0];
        let u2 = [1.0, 0.0, 2.0, 2.0];
        let messages = [
            Message {
                coefficient: 1,
                value: &u0,
            },
            Message {
                coefficient: 1,
                value: &u1,
            },
            Message {
                coefficient: 1,
                value: &u2,
            },
        ];
        let (sent, degenerate) = collect_check(&MinMax::new(), &gf4(), &messages);
        assert_eq!(degenerate, 0);
        assert_eq!(sent[0].as_ref().unwrap(), &[1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn var_node_extrinsic() {
        let arithmetic = SumProduct::new();
        let prior = [0.25; 4];
        let a = [0.1, 0.2, 0.3, 0.4];
        let b = [0.4, 0.3, 0.2, 0.1];
        let c = [0.5, 0.5, 0.0, 0.0];
        let mut marginal = [0.0; 4];
        let mut sent = vec![Vec::new(); 3];
        let degenerate =
            arithmetic.send_var_messages(&prior, &[&a, &b, &c], &mut marginal, |m| {
                sent[m.dest] = m.value.to_vec();
            });
        assert_eq!(degenerate, 0);
        // to check 0: b * c
        assert_close(&sent[0], &[0.2 / 0.35, 0.15 / 0.35, 0.0, 0.0]);
        // to check 2: a * b
        assert_close(&sent[2], &[0.04 / 0.2, 0.06 / 0.2, 0.06 / 0.2, 0.04 / 0.2]);
        // marginal: a * b * c
        assert_close(&marginal, &[0.02 / 0.05, 0.03 / 0.05, 0.0, 0.0]);
        assert_eq!(arithmetic.hard_decision(&marginal), 1);
    }

    #[test]
    fn var_node_degenerate() {
        let arithmetic = SumProduct::new();
        let prior = [1.0, 0.0, 0.0, 0.0];
        let a = [0.0, 1.0, 0.0, 0.0];
        let b = [0.5, 0.5, 0.0, 0.0];
        let mut marginal = [1.0, 0.0, 0.0, 0.0];
        let mut sent = vec![None; 2];
        let degenerate = arithmetic.send_var_messages(&prior, &[&a, &b], &mut marginal, |m| {
            sent[m.dest] = Some(m.value.to_vec());
        });
        // The message to check 1 and the marginal have no mass
        assert_eq!(degenerate, 2);
        assert_eq!(sent[0], Some(vec![1.0, 0.0, 0.0, 0.0]));
        assert_eq!(sent[1], None);
        assert_eq!(marginal, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn min_max_var_node() {
        let arithmetic = MinMax::new();
        let prior = [0.0, 1.0, 2.0, f64::INFINITY];
        let a = [1.0, 0.0, 0.0, 0.0];
        let b = [3.0, 0.0, 1.0, 2.0];
        let mut marginal = [0.0; 4];
        let mut sent = vec![Vec::new(); 2];
        arithmetic.send_var_messages(&prior, &[&a, &b], &mut marginal, |m| {
            sent[m.dest] = m.value.to_vec();
        });
        // prior + b = [3, 1, 3, inf] -> [2, 0, 2, inf]
        assert_eq!(sent[0], vec![2.0, 0.0, 2.0, f64::INFINITY]);
        // prior + a = [1, 1, 2, inf] -> [0, 0, 1, inf]
        assert_eq!(sent[1], vec![0.0, 0.0, 1.0, f64::INFINITY]);
        // prior + a + b = [4, 1, 3, inf] -> [3, 0, 2, inf]
        assert_eq!(marginal, [3.0, 0.0, 2.0, f64::INFINITY]);
        assert_eq!(arithmetic.hard_decision(&marginal), 1);
    }

    #[test]
    fn normalization() {
        let mut m = [2.0, 1.0, 1.0, 0.0];
        assert!(SumProduct::new().normalize(&mut m));
        assert_eq!(m, [0.5, 0.25, 0.25, 0.0]);
        assert!(!SumProduct::new().normalize(&mut [0.0; 4]));
        assert!(!SumProduct::new().normalize(&mut [f64::NAN, 1.0, 0.0, 0.0]));

        let mut m = [3.0, 2.5, f64::INFINITY, 4.0];
        assert!(MinMax::new().normalize(&mut m));
        assert_eq!(m, [0.5, 0.0, f64::INFINITY, 1.5]);
        assert!(!MinMax::new().normalize(&mut [f64::INFINITY; 4]));
        assert!(!MinMax::new().normalize(&mut [f64::NAN, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn probabilities_to_metrics() {
        let mut m = [0.0; 4];
        MinMax::new().from_probabilities(&[0.5, 0.25, 0.25, 0.0], &mut m);
        let ln2 = 2.0f64.ln();
        assert_close(&m[..3], &[0.0, ln2, ln2]);
        assert_eq!(m[3], f64::INFINITY);
        SumProduct::new().from_probabilities(&[2.0, 1.0, 1.0, 0.0], &mut m);
        assert_eq!(m, [0.5, 0.25, 0.25, 0.0]);
    }

    #[test]
    fn hard_decision_ties() {
        assert_eq!(SumProduct::new().hard_decision(&[0.25; 4]), 0);
        assert_eq!(MinMax::new().hard_decision(&[1.0, 0.0, 0.0, 2.0]), 1);
    }
}
