//! Theoretical variogram model family
//!
//! Every model has the form
//! ```text
//! γ(h) = c₀ + c·f(h, a)   for h > 0
//! γ(0) = 0
//! ```
//! with nugget c₀, sill coefficient c and range a. The nugget is the limit of
//! γ as h → 0⁺; the origin itself is always zero.
//!
//! Reference:
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.
//! Webster, R., Oliver, M.A. (2007). Geostatistics for Environmental Scientists.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use geokrige_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::VariogramParameters;

const POWER_SEED_EXPONENT: f64 = 1.0;

/// Named parametric variogram shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariogramModel {
    /// c₀ + c·[1 - exp(-h/a)]
    Exponential,
    /// c₀ + c·[1 - exp(-(h/a)²)]
    Gaussian,
    /// c₀ + c·[1.5(h/a) - 0.5(h/a)³] for h < a; c₀ + c beyond
    Spherical,
    /// c₀ + c·[1 - (2/π)acos(h/a) + (2/π)(h/a)√(1-(h/a)²)] for h < a
    Circular,
    /// c₀ + c·[15/8(h/a) - 5/4(h/a)³ + 3/8(h/a)⁵] for h < a
    Pentaspherical,
    /// c₀ + c·(h/a) for h < a
    Linear,
    /// c₀ + c·h^a, with the range acting as exponent (0 < a < 2)
    Power,
    /// Hole effect: c₀ + c·[1 - sin(h/a)/(h/a)]
    Hole,
    /// c₀ + c·[1 - cos(2πh/a)]
    Periodic,
    /// c₀ + c·ln(h/a)
    Logarithmic,
}

impl VariogramModel {
    pub const ALL: [VariogramModel; 10] = [
        VariogramModel::Exponential,
        VariogramModel::Gaussian,
        VariogramModel::Spherical,
        VariogramModel::Circular,
        VariogramModel::Pentaspherical,
        VariogramModel::Linear,
        VariogramModel::Power,
        VariogramModel::Hole,
        VariogramModel::Periodic,
        VariogramModel::Logarithmic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VariogramModel::Exponential => "exponential",
            VariogramModel::Gaussian => "gaussian",
            VariogramModel::Spherical => "spherical",
            VariogramModel::Circular => "circular",
            VariogramModel::Pentaspherical => "pentaspherical",
            VariogramModel::Linear => "linear",
            VariogramModel::Power => "power",
            VariogramModel::Hole => "hole",
            VariogramModel::Periodic => "periodic",
            VariogramModel::Logarithmic => "logarithmic",
        }
    }

    /// Check that `params` lie inside this model's domain.
    pub fn validate(&self, params: &VariogramParameters) -> Result<()> {
        let reject = |reason: String| Error::ModelDomain {
            model: self.name(),
            reason,
        };

        if !params.is_finite() {
            return Err(reject(format!("non-finite parameters {params}")));
        }
        if params.range <= 0.0 {
            return Err(reject(format!("range must be positive, got {}", params.range)));
        }
        if *self == VariogramModel::Power && params.range >= 2.0 {
            return Err(reject(format!(
                "power exponent must lie in (0, 2), got {}",
                params.range
            )));
        }
        Ok(())
    }

    /// Bring default parameters into this model's domain.
    ///
    /// Only `power` needs it: its range is an exponent in (0, 2), which a
    /// distance-derived default rarely satisfies. Such a range is replaced
    /// by 1 (a linear trend).
    pub fn seed(&self, defaults: VariogramParameters) -> VariogramParameters {
        match self {
            VariogramModel::Power if !(defaults.range > 0.0 && defaults.range < 2.0) => {
                VariogramParameters {
                    range: POWER_SEED_EXPONENT,
                    ..defaults
                }
            }
            _ => defaults,
        }
    }

    /// Semivariance at distance `h`, after checking the parameter domain.
    pub fn evaluate(&self, h: f64, params: &VariogramParameters) -> Result<f64> {
        self.validate(params)?;
        Ok(self.semivariance(h, params))
    }

    /// Semivariance without the domain check. Callers must validate first.
    pub(crate) fn semivariance(&self, h: f64, params: &VariogramParameters) -> f64 {
        if h < 1e-15 {
            return 0.0;
        }

        let c0 = params.nugget;
        let c = params.sill;
        let a = params.range;
        let r = h / a;

        let shape = match self {
            VariogramModel::Exponential => 1.0 - (-r).exp(),
            VariogramModel::Gaussian => 1.0 - (-r * r).exp(),
            VariogramModel::Spherical => {
                if r < 1.0 {
                    1.5 * r - 0.5 * r * r * r
                } else {
                    1.0
                }
            }
            VariogramModel::Circular => {
                if r < 1.0 {
                    1.0 - (2.0 / PI) * r.acos() + (2.0 / PI) * r * (1.0 - r * r).sqrt()
                } else {
                    1.0
                }
            }
            VariogramModel::Pentaspherical => {
                if r < 1.0 {
                    let r3 = r * r * r;
                    15.0 / 8.0 * r - 5.0 / 4.0 * r3 + 3.0 / 8.0 * r3 * r * r
                } else {
                    1.0
                }
            }
            VariogramModel::Linear => r.min(1.0),
            VariogramModel::Power => h.powf(a),
            VariogramModel::Hole => 1.0 - r.sin() / r,
            VariogramModel::Periodic => 1.0 - (2.0 * PI * r).cos(),
            VariogramModel::Logarithmic => r.ln(),
        };

        c0 + c * shape
    }
}

impl fmt::Display for VariogramModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VariogramModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        VariogramModel::ALL
            .into_iter()
            .find(|m| m.name() == needle)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

/// A model shape bound to parameters already checked against its domain.
///
/// This is what a Kriging solver consumes for covariance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramFunction {
    model: VariogramModel,
    parameters: VariogramParameters,
}

impl VariogramFunction {
    pub fn new(model: VariogramModel, parameters: VariogramParameters) -> Result<Self> {
        model.validate(&parameters)?;
        Ok(Self { model, parameters })
    }

    pub fn model(&self) -> VariogramModel {
        self.model
    }

    pub fn parameters(&self) -> VariogramParameters {
        self.parameters
    }

    #[inline]
    pub fn evaluate(&self, h: f64) -> f64 {
        self.model.semivariance(h, &self.parameters)
    }
}
