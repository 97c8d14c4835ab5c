//! Station–target association and interpolation method selection
//!
//! For every target point and time step the engine picks the neighboring
//! stations and decides whether Kriging, IDW, or the raw station value is
//! justified:
//! - **Kriging**: enough non-zero, non-uniform neighbors within the Kriging
//!   radius and enough accumulated history
//! - **IDW**: at least two differing neighbors within the IDW radius
//! - **Raw data**: a single neighbor, or all neighbors share one value
//! - **No data**: no station within reach

mod engine;
mod history;

use std::fmt;

use geokrige_core::{Error, PointId, Result};
use serde::{Deserialize, Serialize};

pub use engine::{AssociationEngine, AssociationEngineBuilder, StepAssociation};
pub use history::HistoryWindow;

/// Interpolation method chosen for one target at one time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationMethod {
    #[serde(rename = "KRIGING")]
    Kriging,
    #[serde(rename = "IDW")]
    Idw,
    /// Use the single (or uniform) neighbor value directly
    #[serde(rename = "NOINTERPOLATION_USE_RAW_DATA")]
    NoInterpolationUseRawData,
    #[serde(rename = "NODATA")]
    NoData,
}

impl InterpolationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMethod::Kriging => "KRIGING",
            InterpolationMethod::Idw => "IDW",
            InterpolationMethod::NoInterpolationUseRawData => "NOINTERPOLATION_USE_RAW_DATA",
            InterpolationMethod::NoData => "NODATA",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A station selected for a target, with its distance to the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub distance: f64,
    pub station_id: PointId,
}

/// Method tag plus the neighbors it was decided on, nearest first.
///
/// Built once per target and time step; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPointAssociation {
    method: InterpolationMethod,
    neighbors: Vec<Neighbor>,
}

impl TargetPointAssociation {
    pub(crate) fn new(method: InterpolationMethod, neighbors: Vec<Neighbor>) -> Self {
        Self { method, neighbors }
    }

    pub(crate) fn no_data() -> Self {
        Self::new(InterpolationMethod::NoData, Vec::new())
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    pub fn station_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.neighbors.iter().map(|n| n.station_id)
    }

    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.neighbors.iter().map(|n| n.distance)
    }

    pub fn nearest(&self) -> Option<&Neighbor> {
        self.neighbors.first()
    }
}

/// Parameters for the association engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationParams {
    /// Search radius for Kriging neighbors
    pub max_dist_kriging: Option<f64>,
    /// Search radius for the IDW fallback
    pub max_dist_idw: Option<f64>,
    /// Maximum number of neighbors kept per target
    pub max_closest_stations: Option<usize>,
    /// Minimum count of non-zero neighbor values to allow Kriging (default 3)
    pub min_non_zero_stations_for_kriging: usize,
    /// Steps of history required before Kriging is allowed (default 5)
    pub number_of_previous_data: usize,
}

impl Default for AssociationParams {
    fn default() -> Self {
        Self {
            max_dist_kriging: Some(10_000.0),
            max_dist_idw: Some(100_000.0),
            max_closest_stations: Some(100),
            min_non_zero_stations_for_kriging: 3,
            number_of_previous_data: 5,
        }
    }
}

/// How neighbors are searched, derived from [`AssociationParams`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeighborSearch {
    /// Radius-limited, count-capped search with the history gate
    Bounded {
        max_dist_kriging: f64,
        max_dist_idw: f64,
        max_closest: usize,
    },
    /// Every valid station is a neighbor; no history gate
    Unbounded,
}

impl AssociationParams {
    /// Parameters with all three search thresholds cleared.
    pub fn unbounded() -> Self {
        Self {
            max_dist_kriging: None,
            max_dist_idw: None,
            max_closest_stations: None,
            ..Default::default()
        }
    }

    pub fn search(&self) -> NeighborSearch {
        match (
            self.max_dist_kriging,
            self.max_dist_idw,
            self.max_closest_stations,
        ) {
            (Some(max_dist_kriging), Some(max_dist_idw), Some(max_closest)) => {
                NeighborSearch::Bounded {
                    max_dist_kriging,
                    max_dist_idw,
                    max_closest,
                }
            }
            _ => NeighborSearch::Unbounded,
        }
    }

    /// Whether some, but not all, of the three thresholds are set.
    pub fn is_partially_bounded(&self) -> bool {
        let set = [
            self.max_dist_kriging.is_some(),
            self.max_dist_idw.is_some(),
            self.max_closest_stations.is_some(),
        ];
        set.iter().any(|s| *s) && !set.iter().all(|s| *s)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_dist_kriging", self.max_dist_kriging),
            ("max_dist_idw", self.max_dist_idw),
        ] {
            if let Some(d) = value
                && !(d.is_finite() && d > 0.0)
            {
                return Err(Error::InvalidParameter {
                    name,
                    value: d.to_string(),
                    reason: "must be positive and finite".into(),
                });
            }
        }
        if self.max_closest_stations == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_closest_stations",
                value: "0".into(),
                reason: "must be a positive integer".into(),
            });
        }
        if self.min_non_zero_stations_for_kriging == 0 {
            return Err(Error::InvalidParameter {
                name: "min_non_zero_stations_for_kriging",
                value: "0".into(),
                reason: "must be a positive integer".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bounded() {
        assert_eq!(
            AssociationParams::default().search(),
            NeighborSearch::Bounded {
                max_dist_kriging: 10_000.0,
                max_dist_idw: 100_000.0,
                max_closest: 100,
            }
        );
        assert_eq!(AssociationParams::unbounded().search(), NeighborSearch::Unbounded);
    }

    #[test]
    fn test_partial_thresholds_are_unbounded() {
        let params = AssociationParams {
            max_dist_idw: None,
            ..Default::default()
        };
        assert!(params.is_partially_bounded());
        assert_eq!(params.search(), NeighborSearch::Unbounded);
        assert!(!AssociationParams::default().is_partially_bounded());
        assert!(!AssociationParams::unbounded().is_partially_bounded());
    }

    #[test]
    fn test_validate() {
        assert!(AssociationParams::default().validate().is_ok());
        assert!(AssociationParams::unbounded().validate().is_ok());

        let bad_radius = AssociationParams {
            max_dist_kriging: Some(-1.0),
            ..Default::default()
        };
        assert!(bad_radius.validate().is_err());

        let zero_cap = AssociationParams {
            max_closest_stations: Some(0),
            ..Default::default()
        };
        assert!(zero_cap.validate().is_err());

        let zero_min = AssociationParams {
            min_non_zero_stations_for_kriging: 0,
            ..Default::default()
        };
        assert!(zero_min.validate().is_err());
    }

    #[test]
    fn test_method_names() {
        assert_eq!(InterpolationMethod::Kriging.to_string(), "KRIGING");
        assert_eq!(
            InterpolationMethod::NoInterpolationUseRawData.to_string(),
            "NOINTERPOLATION_USE_RAW_DATA"
        );
    }
}
