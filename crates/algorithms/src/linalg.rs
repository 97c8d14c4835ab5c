//! Small dense linear solves shared by the Kriging system and the
//! Levenberg–Marquardt normal equations.

use geokrige_core::{Error, Result};
use ndarray::{Array1, Array2};

/// Pivots below this magnitude are treated as singular.
const PIVOT_EPS: f64 = 1e-14;

/// Solve `a · x = b` using Gaussian elimination with partial pivoting.
///
/// Both inputs are consumed as scratch space. Meant for systems of a few
/// dozen unknowns at most.
pub(crate) fn solve_dense(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(Error::Algorithm(format!(
            "linear system shape mismatch: {}x{} matrix, {} rhs",
            a.nrows(),
            a.ncols(),
            n
        )));
    }

    // Forward elimination
    for col in 0..n {
        let mut max_val = a[[col, col]].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = a[[row, col]].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val.is_nan() || max_val < PIVOT_EPS {
            return Err(Error::Algorithm("singular matrix".into()));
        }

        if max_row != col {
            for j in 0..n {
                a.swap([col, j], [max_row, j]);
            }
            b.swap(col, max_row);
        }

        let pivot = a[[col, col]];
        for row in (col + 1)..n {
            let factor = a[[row, col]] / pivot;
            a[[row, col]] = 0.0;
            for j in (col + 1)..n {
                a[[row, j]] -= factor * a[[col, j]];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = Array1::<f64>::zeros(n);
    for col in (0..n).rev() {
        let mut sum = b[col];
        for j in (col + 1)..n {
            sum -= a[[col, j]] * x[j];
        }
        x[col] = sum / a[[col, col]];
    }

    Ok(x)
}
