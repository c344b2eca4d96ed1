//! Finite field GF(q) arithmetic.
//!
//! This module contains the struct [`GaloisField`], which implements the
//! arithmetic of the finite field with q elements. Elements are represented
//! as integers in `0..q`. Binary extension fields GF(2^k), for k up to 16, and
//! prime fields GF(p) are supported.
//!
//! For GF(2^k), the integer representation of an element gives the
//! coefficients of a polynomial in the primitive element α (bit `i` is the
//! coefficient of α^i), so addition is XOR. For GF(p), elements are integers
//! modulo p.
//!
//! Multiplication and inversion are done with exponential and logarithm
//! tables built when the field is constructed.
//!
//! # Examples
//! ```
//! # use nb_ldpc::gf::GaloisField;
//! let gf = GaloisField::new(4).unwrap();
//! // α * α = α + 1 in GF(4)
//! assert_eq!(gf.mul(2, 2), 3);
//! assert_eq!(gf.add(2, 3), 1);
//! assert_eq!(gf.mul(3, gf.inv(3).unwrap()), 1);
//! ```

use crate::error::{Error, Result};
use std::ops::Range;

// Primitive polynomials for GF(2^k), indexed by k. Bit i holds the coefficient
// of x^i.
const PRIMITIVE_POLYNOMIALS: [usize; 17] = [
    0, 0x3, 0x7, 0xb, 0x13, 0x25, 0x43, 0x89, 0x11d, 0x211, 0x409, 0x805, 0x1053, 0x201b, 0x4443,
    0x8003, 0x1100b,
];

/// Finite field GF(q).
///
/// A value of this type describes the field. Field elements are plain
/// integers in `0..q` and all the arithmetic functions are total over that
/// range, except [`GaloisField::inv`] and [`GaloisField::div`], which fail
/// with [`Error::InvalidFieldOperand`] for the additive identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GaloisField {
    q: usize,
    characteristic: usize,
    // exp[i] = g^i for i in 0..2(q-1), so that exp[log a + log b] needs no
    // reduction.
    exp: Box<[usize]>,
    // log[a] = i such that g^i = a, for a != 0. log[0] is unused.
    log: Box<[usize]>,
}

impl GaloisField {
    /// Creates the field GF(q).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedField`] if `q` is neither a power of two
    /// between 2 and 2^16 nor a prime.
    pub fn new(q: usize) -> Result<GaloisField> {
        if q.is_power_of_two() && (2..=1 << 16).contains(&q) {
            Self::binary_extension(q)
        } else if is_prime(q) {
            Self::prime(q)
        } else {
            Err(Error::UnsupportedField(q))
        }
    }

    fn binary_extension(q: usize) -> Result<GaloisField> {
        let poly = PRIMITIVE_POLYNOMIALS[q.trailing_zeros() as usize];
        let mut x = 1;
        let exp = (0..q - 1)
            .map(|_| {
                let y = x;
                x <<= 1;
                if x & q != 0 {
                    x ^= poly;
                }
                y
            })
            .collect::<Vec<_>>();
        Self::from_exp(q, 2, exp)
    }

    fn prime(p: usize) -> Result<GaloisField> {
        // Search for a generator of the multiplicative group.
        for g in 1..p {
            let mut exp = Vec::with_capacity(p - 1);
            let mut x = 1;
            loop {
                exp.push(x);
                x = x * g % p;
                if x == 1 {
                    break;
                }
            }
            if exp.len() == p - 1 {
                return Self::from_exp(p, p, exp);
            }
        }
        Err(Error::UnsupportedField(p))
    }

    fn from_exp(q: usize, characteristic: usize, exp: Vec<usize>) -> Result<GaloisField> {
        let mut log = vec![usize::MAX; q];
        for (j, &a) in exp.iter().enumerate() {
            if a == 0 || a >= q || log[a] != usize::MAX {
                // The generator does not span the multiplicative group.
                return Err(Error::UnsupportedField(q));
            }
            log[a] = j;
        }
        let exp = exp.iter().chain(exp.iter()).copied().collect::<Vec<_>>();
        Ok(GaloisField {
            q,
            characteristic,
            exp: exp.into_boxed_slice(),
            log: log.into_boxed_slice(),
        })
    }

    /// Returns the number of elements q of the field.
    pub fn order(&self) -> usize {
        self.q
    }

    /// Returns the characteristic of the field.
    pub fn characteristic(&self) -> usize {
        self.characteristic
    }

    /// Returns the number of bits per symbol.
    ///
    /// This is `Some(k)` for GF(2^k) and `None` for prime fields other than
    /// GF(2).
    pub fn bits_per_symbol(&self) -> Option<usize> {
        if self.characteristic == 2 {
            Some(self.q.trailing_zeros() as usize)
        } else {
            None
        }
    }

    /// Returns an iterator over all the elements of the field.
    pub fn elements(&self) -> Range<usize> {
        0..self.q
    }

    /// Returns an iterator over the nonzero elements of the field.
    pub fn nonzero_elements(&self) -> Range<usize> {
        1..self.q
    }

    /// Returns `true` if `a` is an element of the field.
    pub fn contains(&self, a: usize) -> bool {
        a < self.q
    }

    /// Field addition.
    pub fn add(&self, a: usize, b: usize) -> usize {
        debug_assert!(self.contains(a) && self.contains(b));
        if self.characteristic == 2 {
            a ^ b
        } else {
            (a + b) % self.q
        }
    }

    /// Additive inverse.
    pub fn neg(&self, a: usize) -> usize {
        debug_assert!(self.contains(a));
        if self.characteristic == 2 || a == 0 {
            a
        } else {
            self.q - a
        }
    }

    /// Field subtraction.
    pub fn sub(&self, a: usize, b: usize) -> usize {
        self.add(a, self.neg(b))
    }

    /// Field multiplication.
    pub fn mul(&self, a: usize, b: usize) -> usize {
        debug_assert!(self.contains(a) && self.contains(b));
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[self.log[a] + self.log[b]]
        }
    }

    /// Multiplicative inverse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldOperand`] if `a` is zero.
    pub fn inv(&self, a: usize) -> Result<usize> {
        debug_assert!(self.contains(a));
        if a == 0 {
            return Err(Error::InvalidFieldOperand);
        }
        let n = self.q - 1;
        Ok(self.exp[(n - self.log[a]) % n])
    }

    /// Field division.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldOperand`] if `b` is zero.
    pub fn div(&self, a: usize, b: usize) -> Result<usize> {
        Ok(self.mul(a, self.inv(b)?))
    }
}

fn is_prime(n: usize) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}
