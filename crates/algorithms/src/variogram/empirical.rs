//! Empirical semivariogram from one time step of station data
//!
//! ```text
//! γ(h) = (1/2N(h)) Σ [z(xᵢ) - z(xⱼ)]²   for all pairs with |xᵢ-xⱼ| in bin h
//! ```
//! Bin 0 of the output is the origin `(0, 0)`. Lag bins follow from index 1
//! and carry the mean separation of the pairs that fell into them. Empty lag
//! bins are left out.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.

use geokrige_core::{Error, Result, StationCatalog, ValueMap};
use serde::{Deserialize, Serialize};

use super::{EmpiricalVariogram, VariogramBin};

/// Parameters for empirical variogram computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmpiricalParams {
    /// Number of lag bins (default 15)
    pub n_lags: usize,
    /// Maximum lag distance. If None, half the largest pair distance.
    pub max_lag: Option<f64>,
}

impl Default for EmpiricalParams {
    fn default() -> Self {
        Self {
            n_lags: 15,
            max_lag: None,
        }
    }
}

/// Compute the empirical variogram of the stations that have a value.
///
/// Stations in `values` but not in `stations` are ignored.
///
/// # Errors
/// - `Algorithm` if fewer than 2 stations carry a value
/// - `InvalidParameter` if `n_lags` is 0 or `max_lag` is not positive
pub fn empirical_variogram(
    stations: &StationCatalog,
    values: &ValueMap,
    params: &EmpiricalParams,
) -> Result<EmpiricalVariogram> {
    let points: Vec<_> = values
        .iter()
        .filter_map(|(id, v)| stations.get(id).map(|c| (*c, v)))
        .collect();

    let n = points.len();
    if n < 2 {
        return Err(Error::Algorithm(
            "Need at least 2 stations with values for a variogram".into(),
        ));
    }
    if params.n_lags == 0 {
        return Err(Error::InvalidParameter {
            name: "n_lags",
            value: "0".into(),
            reason: "at least one lag bin is required".into(),
        });
    }

    let max_lag = match params.max_lag {
        Some(m) => m,
        None => {
            let mut max_dist = 0.0_f64;
            for i in 0..n {
                for j in (i + 1)..n {
                    max_dist = max_dist.max(points[i].0.distance(&points[j].0));
                }
            }
            max_dist / 2.0
        }
    };

    if !(max_lag > 0.0 && max_lag.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "max_lag",
            value: max_lag.to_string(),
            reason: "must be positive and finite".into(),
        });
    }

    let bin_width = max_lag / params.n_lags as f64;
    let mut dist_sum = vec![0.0_f64; params.n_lags];
    let mut sq_sum = vec![0.0_f64; params.n_lags];
    let mut counts = vec![0_usize; params.n_lags];

    for i in 0..n {
        for j in (i + 1)..n {
            let d = points[i].0.distance(&points[j].0);
            if d > max_lag {
                continue;
            }
            let bin = ((d / bin_width) as usize).min(params.n_lags - 1);
            let dz = points[i].1 - points[j].1;
            dist_sum[bin] += d;
            sq_sum[bin] += dz * dz;
            counts[bin] += 1;
        }
    }

    let mut variogram = EmpiricalVariogram::new();
    variogram.insert(0, VariogramBin::new(0.0, 0.0));
    for k in 0..params.n_lags {
        if counts[k] > 0 {
            let c = counts[k] as f64;
            variogram.insert(k + 1, VariogramBin::new(dist_sum[k] / c, sq_sum[k] / (2.0 * c)));
        }
    }

    Ok(variogram)
}
