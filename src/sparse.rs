//! # Sparse matrix over GF(q)
//!
//! This module implements a representation for sparse matrices whose nonzero
//! entries are elements of a finite field. The representation is based on the
//! non-binary alist format used to handle NB-LDPC parity check matrices: each
//! row and each column keeps the list of its nonzero entries together with
//! their values.

use crate::error::{Error, Result};
use ndarray::Array2;
use std::slice::Iter;

/// Nonzero entry of a row or column of a [`SparseMatrix`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Entry {
    /// Column index (for an entry of a row) or row index (for an entry of a
    /// column).
    pub index: usize,
    /// Value of the entry, as a field element.
    pub value: usize,
}

/// A sparse matrix with field-valued entries.
///
/// Each (row, column) position holds at most one entry. Entries equal to zero
/// are not stored.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SparseMatrix {
    rows: Vec<Vec<Entry>>,
    cols: Vec<Vec<Entry>>,
}

impl SparseMatrix {
    /// Create a new sparse matrix of a given size
    ///
    /// The matrix is inizialized to the zero matrix.
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::sparse::SparseMatrix;
    /// let h = SparseMatrix::new(10, 30);
    /// assert_eq!(h.num_rows(), 10);
    /// assert_eq!(h.num_cols(), 30);
    /// ```
    pub fn new(nrows: usize, ncols: usize) -> SparseMatrix {
        use std::iter::repeat_with;
        let rows = repeat_with(Vec::new).take(nrows).collect();
        let cols = repeat_with(Vec::new).take(ncols).collect();
        SparseMatrix { rows, cols }
    }

    /// Returns the number of rows of the matrix
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns of the matrix
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Returns the number of nonzero entries of the matrix
    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Returns the row weight of `row`
    ///
    /// The row weight is defined as the number of nonzero entries in a
    /// particular row. Rows are indexed starting by zero.
    pub fn row_weight(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// Returns the column weight of `column`
    ///
    /// The column weight is defined as the number of nonzero entries in a
    /// particular column. Columns are indexed starting by zero.
    pub fn col_weight(&self, col: usize) -> usize {
        self.cols[col].len()
    }

    /// Returns the value of the entry at a particular row and column, or
    /// `None` if the entry is zero.
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        // typically columns are shorter, so we search in the column
        self.cols[col]
            .iter()
            .find(|e| e.index == row)
            .map(|e| e.value)
    }

    /// Returns `true` if the entry corresponding to a particular
    /// row and column is nonzero
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// Sets the entry at a particular row and column
    ///
    /// If the position already holds an entry, its value is replaced, so that
    /// there is never more than one entry per position. Setting a value of
    /// zero removes the entry.
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::sparse::SparseMatrix;
    /// let mut h = SparseMatrix::new(10, 30);
    /// assert!(!h.contains(3, 7));
    /// h.insert(3, 7, 2);
    /// assert_eq!(h.get(3, 7), Some(2));
    /// h.insert(3, 7, 5);
    /// assert_eq!(h.get(3, 7), Some(5));
    /// assert_eq!(h.row_weight(3), 1);
    /// ```
    pub fn insert(&mut self, row: usize, col: usize, value: usize) {
        self.remove(row, col);
        if value != 0 {
            self.rows[row].push(Entry { index: col, value });
            self.cols[col].push(Entry { index: row, value });
        }
    }

    /// Removes the entry at a particular row and column
    pub fn remove(&mut self, row: usize, col: usize) {
        self.rows[row].retain(|e| e.index != col);
        self.cols[col].retain(|e| e.index != row);
    }

    /// Returns an [Iterator] over the nonzero entries in a particular row
    pub fn iter_row(&self, row: usize) -> Iter<'_, Entry> {
        self.rows[row].iter()
    }

    /// Returns an [Iterator] over the nonzero entries in a particular column
    pub fn iter_col(&self, col: usize) -> Iter<'_, Entry> {
        self.cols[col].iter()
    }

    /// Returns an [Iterator] over all the nonzero entries, as `(row, col,
    /// value)` triples in row order
    pub fn iter_all(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().map(move |e| (r, e.index, e.value)))
    }

    /// Returns the dense representation of the matrix
    pub fn to_dense(&self) -> Array2<usize> {
        let mut a = Array2::zeros((self.num_rows(), self.num_cols()));
        for (r, c, v) in self.iter_all() {
            a[[r, c]] = v;
        }
        a
    }

    /// Constructs a sparse matrix from a dense matrix
    ///
    /// # Examples
    /// ```
    /// # use nb_ldpc::sparse::SparseMatrix;
    /// let a = ndarray::arr2(&[[1, 0, 3], [0, 2, 1]]);
    /// let h = SparseMatrix::from_dense(&a);
    /// assert_eq!(h.num_entries(), 4);
    /// assert_eq!(h.to_dense(), a);
    /// ```
    pub fn from_dense(a: &Array2<usize>) -> SparseMatrix {
        let (nrows, ncols) = a.dim();
        let mut h = SparseMatrix::new(nrows, ncols);
        for ((r, c), &v) in a.indexed_iter() {
            if v != 0 {
                h.insert(r, c, v);
            }
        }
        h
    }

    /// Writes the matrix in non-binary alist format to a writer
    ///
    /// The field order `q` is written in the header line.
    ///
    /// # Errors
    /// If a call to `write!()` returns an error, this function returns
    /// such an error.
    pub fn write_alist<W: std::fmt::Write>(&self, q: usize, w: &mut W) -> std::fmt::Result {
        writeln!(w, "{} {} {}", self.num_cols(), self.num_rows(), q)?;
        let directions = [&self.cols, &self.rows];
        for dir in directions.iter() {
            write!(w, "{} ", dir.iter().map(|el| el.len()).max().unwrap_or(0))?;
        }
        writeln!(w)?;
        for dir in directions.iter() {
            for el in *dir {
                write!(w, "{} ", el.len())?;
            }
            writeln!(w)?;
        }
        for dir in directions.iter() {
            for el in *dir {
                let mut v = el.clone();
                v.sort_unstable_by_key(|e| e.index);
                for e in &v {
                    write!(w, "{} {} ", e.index + 1, e.value)?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }

    /// Returns a [`String`] with the non-binary alist representation of the
    /// matrix
    pub fn alist(&self, q: usize) -> String {
        let mut s = String::new();
        // Writing to a String cannot fail
        let _ = self.write_alist(q, &mut s);
        s
    }

    /// Constructs a sparse matrix from its non-binary alist representation
    ///
    /// Returns the matrix and the field order `q` given in the alist header.
    ///
    /// # Errors
    /// `alist` should hold a valid alist representation. If an error is found
    /// while parsing `alist`, an [`Error::Alist`] describing the error will be
    /// returned.
    pub fn from_alist(alist: &str) -> Result<(SparseMatrix, usize)> {
        let err = |s: &str| Error::Alist(String::from(s));
        let parse = |s: &str, what: &str| -> Result<usize> {
            s.parse()
                .map_err(|_| Error::Alist(format!("{what} is not a number")))
        };
        let mut alist = alist.lines();
        let sizes = alist
            .next()
            .ok_or_else(|| err("alist first line not found"))?;
        let mut sizes = sizes.split_whitespace();
        let mut next_size = |what| {
            sizes
                .next()
                .ok_or_else(|| err("alist first line does not contain enough elements"))
                .and_then(|s| parse(s, what))
        };
        let ncols = next_size("ncols")?;
        let nrows = next_size("nrows")?;
        let q = next_size("q")?;
        let mut h = SparseMatrix::new(nrows, ncols);
        alist.next(); // skip max weights
        alist.next();
        alist.next(); // skip weights
        for col in 0..ncols {
            let col_data = alist
                .next()
                .ok_or_else(|| err("alist does not contain expected number of lines"))?;
            let col_data = col_data.split_whitespace().collect::<Vec<_>>();
            if col_data.len() % 2 != 0 {
                return Err(err("column entries are not (row, value) pairs"));
            }
            for pair in col_data.chunks(2) {
                let row = parse(pair[0], "row")?;
                let value = parse(pair[1], "value")?;
                if row == 0 || row > nrows {
                    return Err(Error::Alist(format!("row {row} out of range")));
                }
                if h.contains(row - 1, col) {
                    return Err(Error::Alist(format!(
                        "duplicate entry at row {row}, column {}",
                        col + 1
                    )));
                }
                h.insert(row - 1, col, value);
            }
        }
        // we do not need to process the rows of the alist
        Ok((h, q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert() {
        let mut h = SparseMatrix::new(100, 300);
        assert!(!h.contains(27, 154));
        h.insert(27, 154, 3);
        assert!(h.contains(27, 154));
        assert_eq!(h.get(27, 154), Some(3));
        assert!(!h.contains(28, 154));
        h.insert(27, 154, 0);
        assert!(!h.contains(27, 154));
        assert_eq!(h.num_entries(), 0);
    }

    #[test]
    fn single_entry_per_position() {
        let mut h = SparseMatrix::new(2, 2);
        h.insert(0, 1, 1);
        h.insert(0, 1, 2);
        assert_eq!(h.row_weight(0), 1);
        assert_eq!(h.col_weight(1), 1);
        assert_eq!(h.iter_row(0).next(), Some(&Entry { index: 1, value: 2 }));
    }

    #[test]
    fn test_alist() {
        let mut h = SparseMatrix::new(2, 4);
        h.insert(0, 0, 1);
        h.insert(0, 1, 2);
        h.insert(0, 3, 3);
        h.insert(1, 1, 3);
        h.insert(1, 2, 1);
        h.insert(1, 3, 2);
        let expected = "4 2 4\n\
                        2 3 \n\
                        1 2 1 2 \n\
                        3 3 \n\
                        1 1 \n\
                        1 2 2 3 \n\
                        2 1 \n\
                        1 3 2 2 \n\
                        1 1 2 2 4 3 \n\
                        2 3 3 1 4 2 \n";
        assert_eq!(h.alist(4), expected);

        let (h2, q) = SparseMatrix::from_alist(expected).unwrap();
        assert_eq!(q, 4);
        assert_eq!(h2.alist(4), expected);
        assert_eq!(h2.to_dense(), h.to_dense());
    }

    #[test]
    fn alist_errors() {
        assert!(matches!(SparseMatrix::from_alist(""), Err(Error::Alist(_))));
        assert!(matches!(
            SparseMatrix::from_alist("2 1\n"),
            Err(Error::Alist(_))
        ));
        let bad_row = "1 1 4\n1 1\n1\n1\n2 1\n1 1\n";
        assert!(matches!(
            SparseMatrix::from_alist(bad_row),
            Err(Error::Alist(_))
        ));
        let odd = "1 1 4\n1 1\n1\n1\n1\n1 1\n";
        assert!(matches!(SparseMatrix::from_alist(odd), Err(Error::Alist(_))));
    }

    #[test]
    fn dense_round_trip() {
        let a = ndarray::arr2(&[[0, 1, 2], [3, 0, 1]]);
        let h = SparseMatrix::from_dense(&a);
        assert_eq!(h.get(1, 0), Some(3));
        assert_eq!(h.get(0, 0), None);
        assert_eq!(
            h.iter_all().collect::<Vec<_>>(),
            vec![(0, 1, 1), (0, 2, 2), (1, 0, 3), (1, 2, 1)]
        );
        assert_eq!(h.to_dense(), a);
    }
}
