//! Tanner graph.
//!
//! This module contains [`TannerGraph`], the validated bipartite graph of
//! variable (symbol) nodes and check nodes induced by the nonzero entries of a
//! parity check matrix over GF(q). The graph is built once and is read-only
//! during decoding.
//!
//! Each node keeps the list of its edges. The position of an edge in that list
//! is its *slot*. Every edge record also stores the slot that the same edge
//! occupies at the node on the other side, so that messages can be stored per
//! sending node and looked up by the receiving node without searching.

use crate::{
    error::{Error, Result},
    gf::GaloisField,
    sparse::SparseMatrix,
};

/// Edge seen from a check node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CheckEdge {
    /// Variable node at the other end of the edge.
    pub var: usize,
    /// Nonzero coefficient of the edge.
    pub coefficient: usize,
    /// Slot of this edge at the variable node.
    pub var_slot: usize,
}

/// Edge seen from a variable node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VarEdge {
    /// Check node at the other end of the edge.
    pub check: usize,
    /// Nonzero coefficient of the edge.
    pub coefficient: usize,
    /// Slot of this edge at the check node.
    pub check_slot: usize,
}

/// Tanner graph of an NB-LDPC code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TannerGraph {
    field: GaloisField,
    h: SparseMatrix,
    checks: Box<[Box<[CheckEdge]>]>,
    vars: Box<[Box<[VarEdge]>]>,
}

impl TannerGraph {
    /// Creates the Tanner graph of a parity check matrix over a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMatrix`] if the matrix has no rows or no
    /// columns, if some column has no nonzero entries (isolated variable
    /// node), or if some entry is not a nonzero element of the field.
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::{gf::GaloisField, graph::TannerGraph, sparse::SparseMatrix};
    /// let gf = GaloisField::new(4).unwrap();
    /// let h = SparseMatrix::from_dense(&ndarray::arr2(&[[1, 2, 3]]));
    /// let graph = TannerGraph::new(gf, h).unwrap();
    /// assert_eq!(graph.num_edges(), 3);
    /// // 1*1 + 2*1 + 3*1 = 0 in GF(4)
    /// assert!(graph.is_codeword(&[1, 1, 1]));
    /// ```
    pub fn new(field: GaloisField, h: SparseMatrix) -> Result<TannerGraph> {
        if h.num_rows() == 0 || h.num_cols() == 0 {
            return Err(Error::MalformedMatrix(format!(
                "matrix has size {} x {}",
                h.num_rows(),
                h.num_cols()
            )));
        }
        if let Some(col) = (0..h.num_cols()).find(|&c| h.col_weight(c) == 0) {
            return Err(Error::MalformedMatrix(format!(
                "column {col} has no nonzero entries"
            )));
        }
        if let Some((row, col, value)) = h
            .iter_all()
            .find(|&(_, _, v)| v == 0 || !field.contains(v))
        {
            return Err(Error::MalformedMatrix(format!(
                "entry ({row}, {col}) = {value} is not a nonzero element of GF({})",
                field.order()
            )));
        }

        let vars = (0..h.num_cols())
            .map(|c| {
                h.iter_col(c)
                    .map(|e| VarEdge {
                        check: e.index,
                        coefficient: e.value,
                        check_slot: h
                            .iter_row(e.index)
                            .position(|f| f.index == c)
                            .unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
                    .into_boxed_slice()
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let checks = (0..h.num_rows())
            .map(|r| {
                h.iter_row(r)
                    .map(|e| CheckEdge {
                        var: e.index,
                        coefficient: e.value,
                        var_slot: h
                            .iter_col(e.index)
                            .position(|f| f.index == r)
                            .unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
                    .into_boxed_slice()
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(TannerGraph {
            field,
            h,
            checks,
            vars,
        })
    }

    /// Returns the field over which the code is defined.
    pub fn field(&self) -> &GaloisField {
        &self.field
    }

    /// Returns the parity check matrix.
    pub fn h(&self) -> &SparseMatrix {
        &self.h
    }

    /// Returns the number of variable nodes (the codeword length N).
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of check nodes (the number of parity checks M).
    pub fn num_checks(&self) -> usize {
        self.checks.len()
    }

    /// Returns the number of edges.
    pub fn num_edges(&self) -> usize {
        self.vars.iter().map(|v| v.len()).sum()
    }

    /// Returns the edges of a check node.
    pub fn check_edges(&self, check: usize) -> &[CheckEdge] {
        &self.checks[check]
    }

    /// Returns the edges of a variable node.
    pub fn var_edges(&self, var: usize) -> &[VarEdge] {
        &self.vars[var]
    }

    /// Returns the degrees of the check nodes.
    pub fn check_degrees(&self) -> impl Iterator<Item = usize> + '_ {
        self.checks.iter().map(|c| c.len())
    }

    /// Returns the degrees of the variable nodes.
    pub fn var_degrees(&self) -> impl Iterator<Item = usize> + '_ {
        self.vars.iter().map(|v| v.len())
    }

    /// Evaluates the parity check equation of a check node.
    ///
    /// Returns `sum_n h[check, n] * symbols[n]`, which is zero if the check is
    /// satisfied.
    pub fn syndrome(&self, check: usize, symbols: &[usize]) -> usize {
        self.checks[check].iter().fold(0, |acc, e| {
            self.field
                .add(acc, self.field.mul(e.coefficient, symbols[e.var]))
        })
    }

    /// Returns the number of parity checks satisfied by a vector of symbols.
    pub fn satisfied_checks(&self, symbols: &[usize]) -> usize {
        assert_eq!(symbols.len(), self.num_vars());
        (0..self.num_checks())
            .filter(|&c| self.syndrome(c, symbols) == 0)
            .count()
    }

    /// Returns `true` if a vector of symbols satisfies all the parity checks.
    pub fn is_codeword(&self, symbols: &[usize]) -> bool {
        self.satisfied_checks(symbols) == self.num_checks()
    }
}
