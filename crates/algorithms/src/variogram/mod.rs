//! Variograms: empirical binning, model family and parameter fitting
//!
//! - [`empirical_variogram`]: binned semivariance from one step of station data
//! - [`VariogramModel`]: named parametric shapes
//! - [`VariogramFitter`]: default estimates plus nonlinear least squares
//! - [`LevenbergMarquardt`]: the default [`CurveFitter`]

mod empirical;
mod fit;
mod lm;
mod model;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use empirical::{EmpiricalParams, empirical_variogram};
pub use fit::{VariogramFit, VariogramFitter, default_parameters};
pub use lm::{CurveFitter, FitParams, LevenbergMarquardt};
pub use model::{VariogramFunction, VariogramModel};

/// Sill coefficient, range and nugget of a variogram model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramParameters {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl VariogramParameters {
    pub fn new(sill: f64, range: f64, nugget: f64) -> Self {
        Self { sill, range, nugget }
    }

    pub fn is_finite(&self) -> bool {
        self.sill.is_finite() && self.range.is_finite() && self.nugget.is_finite()
    }

    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.sill, self.range, self.nugget]
    }

    pub(crate) fn from_array(x: [f64; 3]) -> Self {
        Self::new(x[0], x[1], x[2])
    }
}

impl fmt::Display for VariogramParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(sill={}, range={}, nugget={})",
            self.sill, self.range, self.nugget
        )
    }
}

/// One variogram bin: lag distance and semivariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramBin {
    pub distance: f64,
    pub semivariance: f64,
}

impl VariogramBin {
    pub fn new(distance: f64, semivariance: f64) -> Self {
        Self { distance, semivariance }
    }
}

/// Empirical variogram keyed by bin index.
///
/// Bin 0 is the origin bin by convention and is left out of every summary
/// statistic and of the fit itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalVariogram {
    pub bins: BTreeMap<usize, VariogramBin>,
}

impl EmpiricalVariogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(distance, semivariance)` pairs, indexed from 0.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            bins: pairs
                .into_iter()
                .enumerate()
                .map(|(i, (d, g))| (i, VariogramBin::new(d, g)))
                .collect(),
        }
    }

    pub fn insert(&mut self, index: usize, bin: VariogramBin) {
        self.bins.insert(index, bin);
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bins with index ≥ 1, in index order.
    pub fn lag_bins(&self) -> impl Iterator<Item = &VariogramBin> {
        self.bins.range(1..).map(|(_, b)| b)
    }
}

/// Model semivariance recomputed at every empirical bin distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalVariogram {
    pub function: VariogramFunction,
    pub bins: BTreeMap<usize, VariogramBin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_bins_skip_origin() {
        let emp = EmpiricalVariogram::from_pairs(vec![(0.0, 0.0), (1.0, 2.0), (2.0, 3.0)]);
        let lags: Vec<f64> = emp.lag_bins().map(|b| b.distance).collect();
        assert_eq!(lags, vec![1.0, 2.0]);
        assert_eq!(emp.len(), 3);
    }
}
