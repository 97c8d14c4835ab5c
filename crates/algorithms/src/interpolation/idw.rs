//! Inverse Distance Weighting at a single target
//!
//! ```text
//! z₀ = Σ(wᵢ · zᵢ) / Σ(wᵢ),   wᵢ = 1 / dᵢ^p
//! ```
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use serde::{Deserialize, Serialize};

/// Parameters for IDW estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdwParams {
    /// Power parameter (default: 2.0).
    /// Higher values give more weight to nearby stations.
    pub power: f64,
    /// A station closer than this to the target supplies its value directly.
    pub snap_distance: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            snap_distance: 1e-10,
        }
    }
}

/// Weighted mean of `(distance, value)` samples; `None` if there are none.
pub fn idw_estimate(samples: &[(f64, f64)], params: &IdwParams) -> Option<f64> {
    if let Some(&(_, v)) = samples.iter().find(|(d, _)| *d < params.snap_distance) {
        return Some(v);
    }

    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for &(d, v) in samples {
        let w = 1.0 / d.powf(params.power);
        sum_w += w;
        sum_wz += w * v;
    }

    (sum_w > 0.0).then(|| sum_wz / sum_w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equidistant_is_mean() {
        let v = idw_estimate(&[(2.0, 10.0), (2.0, 20.0), (2.0, 30.0)], &IdwParams::default());
        assert!((v.unwrap() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearer_weighs_more() {
        let v = idw_estimate(&[(1.0, 10.0), (3.0, 40.0)], &IdwParams::default()).unwrap();
        // weights 1 and 1/9
        assert!((v - (10.0 + 40.0 / 9.0) / (1.0 + 1.0 / 9.0)).abs() < 1e-12);
    }

    #[test]
    fn test_snap_to_coincident_station() {
        let v = idw_estimate(&[(0.0, 7.0), (1.0, 100.0)], &IdwParams::default());
        assert_eq!(v, Some(7.0));
    }

    #[test]
    fn test_power_effect() {
        let samples = [(1.0, 10.0), (4.0, 50.0)];
        let low = idw_estimate(&samples, &IdwParams { power: 1.0, ..Default::default() }).unwrap();
        let high = idw_estimate(&samples, &IdwParams { power: 4.0, ..Default::default() }).unwrap();
        assert!((high - 10.0).abs() < (low - 10.0).abs());
    }

    #[test]
    fn test_empty() {
        assert_eq!(idw_estimate(&[], &IdwParams::default()), None);
    }
}
