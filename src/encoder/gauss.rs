use crate::gf::GaloisField;
use ndarray::Array2;

/// Reduces a matrix over GF(q) to reduced row echelon form.
///
/// The reduction is done in place. Returns the pivot columns, in order. The
/// rows after the last pivot row are zero when the matrix does not have full
/// row rank.
pub fn gauss_reduction(field: &GaloisField, array: &mut Array2<usize>) -> Vec<usize> {
    let (n, m) = array.dim();
    let mut pivots = Vec::with_capacity(n);

    for col in 0..m {
        let row = pivots.len();
        if row == n {
            break;
        }
        // Find non-zero element in current column
        let Some(k) = (row..n).find(|&t| array[[t, col]] != 0) else {
            continue;
        };

        if k != row {
            // Swap rows
            for t in col..m {
                array.swap([row, t], [k, t]);
            }
        }

        // Make a 1 by dividing
        let x = array[[row, col]];
        if x != 1 {
            let y = field.inv(x).unwrap_or(1);
            for t in col..m {
                array[[row, t]] = field.mul(array[[row, t]], y);
            }
        }

        // Subtract to all the other rows to make zeros in the pivot column
        for t in (0..n).filter(|&t| t != row) {
            let x = array[[t, col]];
            if x != 0 {
                // avoid calculations if we're subtracting zero
                for u in col..m {
                    array[[t, u]] = field.sub(array[[t, u]], field.mul(x, array[[row, u]]));
                }
            }
        }

        pivots.push(col);
    }

    pivots
}
