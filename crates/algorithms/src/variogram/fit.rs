//! Theoretical variogram fitting with deterministic fallback
//!
//! Default parameters are derived from the empirical bins (bin 0 excluded):
//! ```text
//! range  = max lag distance / 3
//! nugget = mean semivariance of the first 3 lag bins
//! sill   = mean semivariance of the last 5 lag bins
//! ```
//! They seed a nonlinear least-squares fit. If the fit fails the defaults
//! become the final parameters and a warning is logged.

use std::collections::BTreeMap;

use geokrige_core::{Error, Result};
use tracing::{debug, warn};

use super::lm::{CurveFitter, LevenbergMarquardt};
use super::{
    EmpiricalVariogram, TheoreticalVariogram, VariogramBin, VariogramFunction, VariogramModel,
    VariogramParameters,
};

/// Number of leading lag bins averaged into the default nugget.
const NUGGET_BINS: usize = 3;
/// Number of trailing lag bins averaged into the default sill.
const SILL_BINS: usize = 5;

/// Result of fitting a model to an empirical variogram
#[derive(Debug, Clone, PartialEq)]
pub struct VariogramFit {
    /// Final parameters: fitted, or `defaults` when the fit failed
    pub parameters: VariogramParameters,
    /// Deterministic estimates used as the initial guess, brought into the
    /// model's domain by [`VariogramModel::seed`]
    pub defaults: VariogramParameters,
    /// Whether the curve fitter produced the final parameters
    pub converged: bool,
    /// Model evaluated at every empirical bin distance, bin 0 included
    pub theoretical: TheoreticalVariogram,
}

impl VariogramFit {
    pub fn model(&self) -> VariogramModel {
        self.theoretical.function.model()
    }

    /// Model bound to the final parameters, ready for a Kriging solver.
    pub fn function(&self) -> VariogramFunction {
        self.theoretical.function
    }
}

/// Fits one model shape to empirical variograms.
#[derive(Debug, Clone)]
pub struct VariogramFitter<F = LevenbergMarquardt> {
    model: VariogramModel,
    fitter: F,
}

impl VariogramFitter {
    pub fn new(model: VariogramModel) -> Self {
        Self {
            model,
            fitter: LevenbergMarquardt::default(),
        }
    }

    /// Fitter for a model given by name, e.g. `"exponential"`.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }
}

impl<F: CurveFitter> VariogramFitter<F> {
    /// Use a custom curve-fitting capability.
    pub fn with_fitter(model: VariogramModel, fitter: F) -> Self {
        Self { model, fitter }
    }

    pub fn model(&self) -> VariogramModel {
        self.model
    }

    /// Fit the model to `empirical`.
    ///
    /// # Errors
    /// - `MalformedVariogram` if there are no lag bins or a bin is not finite
    /// - `ModelDomain` if the final parameters fall outside the model's domain
    pub fn fit(&self, empirical: &EmpiricalVariogram) -> Result<VariogramFit> {
        let defaults = self.model.seed(default_parameters(empirical)?);

        let data: Vec<(f64, f64)> = empirical
            .lag_bins()
            .map(|b| (b.distance, b.semivariance))
            .collect();

        let (parameters, converged) = match self.fitter.fit(self.model, defaults, &data) {
            Some(p) if p.is_finite() => {
                debug!(model = %self.model, fitted = %p, "variogram fit converged");
                (p, true)
            }
            _ => {
                warn!(
                    model = %self.model,
                    defaults = %defaults,
                    "variogram fit did not converge, using default parameters"
                );
                (defaults, false)
            }
        };

        let function = VariogramFunction::new(self.model, parameters)?;
        let bins: BTreeMap<usize, VariogramBin> = empirical
            .bins
            .iter()
            .map(|(&i, b)| (i, VariogramBin::new(b.distance, function.evaluate(b.distance))))
            .collect();

        Ok(VariogramFit {
            parameters,
            defaults,
            converged,
            theoretical: TheoreticalVariogram { function, bins },
        })
    }
}

/// Deterministic parameter estimates from the lag bins (index ≥ 1).
///
/// When fewer than 3 or 5 lag bins exist, the nugget and sill average over
/// all of them.
///
/// # Errors
/// - `MalformedVariogram` if there are no lag bins or any bin is not finite
pub fn default_parameters(empirical: &EmpiricalVariogram) -> Result<VariogramParameters> {
    if let Some((i, _)) = empirical
        .bins
        .iter()
        .find(|(_, b)| !b.distance.is_finite() || !b.semivariance.is_finite())
    {
        return Err(Error::MalformedVariogram(format!(
            "bin {i} has a non-finite distance or semivariance"
        )));
    }

    let lags: Vec<&VariogramBin> = empirical.lag_bins().collect();
    if lags.is_empty() {
        return Err(Error::MalformedVariogram(
            "no lag bins beyond the origin bin".into(),
        ));
    }

    let max_distance = lags
        .iter()
        .map(|b| b.distance)
        .fold(f64::NEG_INFINITY, f64::max);

    let mean = |bins: &[&VariogramBin]| {
        bins.iter().map(|b| b.semivariance).sum::<f64>() / bins.len() as f64
    };

    let head = &lags[..lags.len().min(NUGGET_BINS)];
    let tail = &lags[lags.len().saturating_sub(SILL_BINS)..];

    Ok(VariogramParameters {
        sill: mean(tail),
        range: max_distance / 3.0,
        nugget: mean(head),
    })
}
