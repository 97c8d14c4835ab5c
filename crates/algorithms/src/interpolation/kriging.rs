//! Ordinary Kriging at a single target
//!
//! The system for the k associated stations:
//! ```text
//! [γ(x₁,x₁) ... γ(x₁,xₖ) 1] [w₁]   [γ(x₁,x₀)]
//! [   ...     ...    ...    .]  [. ] = [   ...    ]
//! [γ(xₖ,x₁) ... γ(xₖ,xₖ) 1] [wₖ]   [γ(xₖ,x₀)]
//! [  1       ...    1       0] [μ ]   [    1     ]
//! ```
//! μ is the Lagrange multiplier enforcing Σwᵢ = 1.
//!
//! Reference:
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use geokrige_core::{Coordinate, Error, Result};
use ndarray::{Array1, Array2};

use crate::linalg::solve_dense;
use crate::variogram::VariogramFunction;

/// Kriging estimate and its estimation variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrigingEstimate {
    pub value: f64,
    pub variance: f64,
}

/// Solve the ordinary Kriging system for `target`.
///
/// `samples` are `(coordinate, value)` pairs of the neighbor stations.
///
/// # Errors
/// - `Algorithm` if fewer than 2 samples are given or the system is singular
pub fn ordinary_kriging_estimate(
    target: &Coordinate,
    samples: &[(Coordinate, f64)],
    variogram: &VariogramFunction,
) -> Result<KrigingEstimate> {
    let k = samples.len();
    if k < 2 {
        return Err(Error::Algorithm("Kriging requires at least 2 sample points".into()));
    }

    // A sample on top of the target is exact.
    if let Some((_, v)) = samples.iter().find(|(c, _)| c.distance(target) < 1e-12) {
        return Ok(KrigingEstimate {
            value: *v,
            variance: 0.0,
        });
    }

    let m = k + 1;
    let mut mat = Array2::<f64>::zeros((m, m));
    let mut rhs = Array1::<f64>::zeros(m);

    for i in 0..k {
        for j in 0..k {
            if i != j {
                mat[[i, j]] = variogram.evaluate(samples[i].0.distance(&samples[j].0));
            }
        }
        mat[[i, k]] = 1.0;
        mat[[k, i]] = 1.0;
        rhs[i] = variogram.evaluate(samples[i].0.distance(target));
    }
    rhs[k] = 1.0;

    let solution = solve_dense(mat, rhs.clone())?;

    let value = (0..k).map(|i| solution[i] * samples[i].1).sum();
    // σ² = Σ wᵢ·γ(xᵢ,x₀) + μ
    let variance = (0..k).map(|i| solution[i] * rhs[i]).sum::<f64>() + solution[k];

    Ok(KrigingEstimate {
        value,
        variance: variance.max(0.0),
    })
}
