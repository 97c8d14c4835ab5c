//! Levenberg–Marquardt curve fitting of variogram models
//!
//! Minimizes Σ [γ(hᵢ; sill, range, nugget) - γ̂ᵢ]² over the three model
//! parameters. The Jacobian is built by finite differences so any model in
//! the family can be fitted without hand-written derivatives.
//!
//! Reference:
//! Marquardt, D.W. (1963). An algorithm for least-squares estimation of
//! nonlinear parameters. SIAM J. Appl. Math., 11(2).

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{VariogramModel, VariogramParameters};
use crate::linalg::solve_dense;

/// Capability to fit a model shape to `(distance, semivariance)` data.
///
/// Returns `None` when the fit does not converge or produces no usable
/// parameters. Implementations must be deterministic.
pub trait CurveFitter {
    fn fit(
        &self,
        model: VariogramModel,
        initial: VariogramParameters,
        data: &[(f64, f64)],
    ) -> Option<VariogramParameters>;
}

/// Parameters controlling the Levenberg–Marquardt iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitParams {
    /// Iteration budget; exhausting it counts as non-convergence (default 1000)
    pub max_iterations: usize,
    /// Stop when an accepted step reduces the cost by less than this fraction
    pub cost_tolerance: f64,
    /// Stop when the step is smaller than this, relative to the parameter norm
    pub step_tolerance: f64,
    /// Stop when the gradient norm falls below this
    pub gradient_tolerance: f64,
    /// Initial damping factor λ
    pub initial_damping: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            cost_tolerance: 1e-10,
            step_tolerance: 1e-10,
            gradient_tolerance: 1e-12,
            initial_damping: 1e-3,
        }
    }
}

const DAMPING_UP: f64 = 10.0;
const DAMPING_DOWN: f64 = 0.1;
const DAMPING_MIN: f64 = 1e-12;
/// Beyond this damping no descent step exists at working precision.
const DAMPING_MAX: f64 = 1e16;

/// Default [`CurveFitter`]: damped Gauss–Newton with Marquardt scaling.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    pub params: FitParams,
}

impl LevenbergMarquardt {
    pub fn new(params: FitParams) -> Self {
        Self { params }
    }
}

impl CurveFitter for LevenbergMarquardt {
    fn fit(
        &self,
        model: VariogramModel,
        initial: VariogramParameters,
        data: &[(f64, f64)],
    ) -> Option<VariogramParameters> {
        if data.is_empty() || model.validate(&initial).is_err() {
            return None;
        }

        let opts = &self.params;
        let mut x = initial.to_array();
        let mut fx = residuals(model, &x, data)?;
        let mut cost = fx.dot(&fx);
        let mut lambda = opts.initial_damping;

        // Cost small relative to the data energy means an exact fit.
        let energy: f64 = data.iter().map(|(_, g)| g * g).sum();
        let exact = f64::EPSILON * f64::EPSILON * energy.max(f64::MIN_POSITIVE);

        for _ in 0..opts.max_iterations {
            if cost <= exact {
                return finish(model, x);
            }

            let jac = jacobian(model, &x, &fx, data)?;
            let jtj = jac.t().dot(&jac);
            let jtf = jac.t().dot(&fx);

            if jtf.dot(&jtf).sqrt() < opts.gradient_tolerance {
                return finish(model, x);
            }

            let mut damped = jtj.clone();
            for i in 0..3 {
                damped[[i, i]] += lambda * jtj[[i, i]].max(DAMPING_MIN);
            }

            let step = match solve_dense(damped, -&jtf) {
                Ok(step) => step,
                Err(_) => {
                    lambda *= DAMPING_UP;
                    if lambda > DAMPING_MAX {
                        return None;
                    }
                    continue;
                }
            };

            let trial = [x[0] + step[0], x[1] + step[1], x[2] + step[2]];
            let trial_fx = if model
                .validate(&VariogramParameters::from_array(trial))
                .is_ok()
            {
                residuals(model, &trial, data)
            } else {
                None
            };

            match trial_fx {
                Some(trial_fx) if trial_fx.dot(&trial_fx) < cost => {
                    let trial_cost = trial_fx.dot(&trial_fx);
                    let reduction = (cost - trial_cost) / cost;
                    let step_norm = step.dot(&step).sqrt();
                    let x_norm = trial.iter().map(|v| v * v).sum::<f64>().sqrt();

                    x = trial;
                    fx = trial_fx;
                    cost = trial_cost;
                    lambda = (lambda * DAMPING_DOWN).max(DAMPING_MIN);

                    if reduction < opts.cost_tolerance
                        || step_norm < opts.step_tolerance * (x_norm + opts.step_tolerance)
                    {
                        return finish(model, x);
                    }
                }
                _ => {
                    lambda *= DAMPING_UP;
                    if lambda > DAMPING_MAX {
                        // No step improves the cost: already at a minimum.
                        return finish(model, x);
                    }
                }
            }
        }

        None
    }
}

fn finish(model: VariogramModel, x: [f64; 3]) -> Option<VariogramParameters> {
    let params = VariogramParameters::from_array(x);
    model.validate(&params).ok().map(|_| params)
}

/// Model minus data at every point; `None` if any residual is not finite.
fn residuals(model: VariogramModel, x: &[f64; 3], data: &[(f64, f64)]) -> Option<Array1<f64>> {
    let params = VariogramParameters::from_array(*x);
    let r: Array1<f64> = data
        .iter()
        .map(|&(h, g)| model.semivariance(h, &params) - g)
        .collect();
    r.iter().all(|v| v.is_finite()).then_some(r)
}

/// Forward-difference Jacobian, switching to a backward difference when the
/// forward probe leaves the model's domain.
fn jacobian(
    model: VariogramModel,
    x: &[f64; 3],
    fx: &Array1<f64>,
    data: &[(f64, f64)],
) -> Option<Array2<f64>> {
    let m = data.len();
    let mut jac = Array2::<f64>::zeros((m, 3));

    for j in 0..3 {
        let h = f64::EPSILON.sqrt() * x[j].abs().max(1.0);
        let probe = |delta: f64| {
            let mut xp = *x;
            xp[j] += delta;
            if model.validate(&VariogramParameters::from_array(xp)).is_err() {
                return None;
            }
            residuals(model, &xp, data)
        };

        let (f_probe, delta) = match probe(h) {
            Some(f) => (f, h),
            None => (probe(-h)?, -h),
        };

        for i in 0..m {
            jac[[i, j]] = (f_probe[i] - fx[i]) / delta;
        }
    }

    Some(jac)
}
