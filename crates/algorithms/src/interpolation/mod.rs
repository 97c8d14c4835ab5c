//! Point estimates from a target's association
//!
//! Turns a [`TargetPointAssociation`] into a value using the method it was
//! tagged with:
//! - NODATA: no value
//! - raw data: the nearest station's value
//! - IDW: inverse distance weighted mean
//! - Kriging: ordinary Kriging, with IDW when the system is singular

mod idw;
mod kriging;

use std::collections::BTreeMap;

use geokrige_core::{Coordinate, PointId, StationCatalog, ValueMap};
use tracing::debug;

use crate::association::{InterpolationMethod, StepAssociation, TargetPointAssociation};
use crate::maybe_rayon::*;
use crate::variogram::VariogramFunction;

pub use idw::{IdwParams, idw_estimate};
pub use kriging::{KrigingEstimate, ordinary_kriging_estimate};

/// Estimate one target from its association.
///
/// Neighbors missing from `stations` or `values` are skipped.
pub fn interpolate_target(
    target: &Coordinate,
    association: &TargetPointAssociation,
    stations: &StationCatalog,
    values: &ValueMap,
    variogram: &VariogramFunction,
    params: &IdwParams,
) -> Option<f64> {
    let idw_samples = || -> Vec<(f64, f64)> {
        association
            .neighbors()
            .iter()
            .filter_map(|n| values.get(n.station_id).map(|v| (n.distance, v)))
            .collect()
    };

    match association.method() {
        InterpolationMethod::NoData => None,
        InterpolationMethod::NoInterpolationUseRawData => association
            .station_ids()
            .find_map(|id| values.get(id)),
        InterpolationMethod::Idw => idw_estimate(&idw_samples(), params),
        InterpolationMethod::Kriging => {
            let samples: Vec<(Coordinate, f64)> = association
                .station_ids()
                .filter_map(|id| Some((*stations.get(id)?, values.get(id)?)))
                .collect();
            match ordinary_kriging_estimate(target, &samples, variogram) {
                Ok(est) => Some(est.value),
                Err(e) => {
                    debug!(error = %e, "Kriging failed, falling back to IDW");
                    idw_estimate(&idw_samples(), params)
                }
            }
        }
    }
}

/// Estimate every target of a step.
pub fn interpolate_step(
    step: &StepAssociation,
    variogram: &VariogramFunction,
    params: &IdwParams,
) -> BTreeMap<PointId, Option<f64>> {
    let jobs: Vec<(PointId, &TargetPointAssociation)> =
        step.associations.iter().map(|(id, a)| (*id, a)).collect();

    jobs.into_par_iter()
        .map(|(id, association)| {
            let value = step.targets.get(id).and_then(|target| {
                interpolate_target(
                    target,
                    association,
                    &step.stations,
                    &step.values,
                    variogram,
                    params,
                )
            });
            (id, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationEngine, AssociationParams, Neighbor};
    use crate::variogram::{VariogramModel, VariogramParameters};

    fn variogram() -> VariogramFunction {
        VariogramFunction::new(
            VariogramModel::Exponential,
            VariogramParameters::new(10.0, 5.0, 0.0),
        )
        .unwrap()
    }

    fn catalog(points: &[(PointId, f64, f64)]) -> StationCatalog {
        points
            .iter()
            .map(|&(id, x, y)| (id, Coordinate::new(x, y, 0.0)))
            .collect()
    }

    fn values(v: &[(PointId, f64)]) -> ValueMap {
        v.iter().copied().collect()
    }

    fn neighbor(distance: f64, station_id: PointId) -> Neighbor {
        Neighbor {
            distance,
            station_id,
        }
    }

    #[test]
    fn test_nodata_has_no_value() {
        let a = TargetPointAssociation::no_data();
        let v = interpolate_target(
            &Coordinate::new(0.0, 0.0, 0.0),
            &a,
            &StationCatalog::new(),
            &ValueMap::new(),
            &variogram(),
            &IdwParams::default(),
        );
        assert_eq!(v, None);
    }

    #[test]
    fn test_raw_uses_nearest() {
        let a = TargetPointAssociation::new(
            InterpolationMethod::NoInterpolationUseRawData,
            vec![
                neighbor(1.0, 7),
                neighbor(2.0, 3),
            ],
        );
        let v = interpolate_target(
            &Coordinate::new(0.0, 0.0, 0.0),
            &a,
            &catalog(&[(7, 1.0, 0.0), (3, 2.0, 0.0)]),
            &values(&[(7, 4.5), (3, 4.5)]),
            &variogram(),
            &IdwParams::default(),
        );
        assert_eq!(v, Some(4.5));
    }

    #[test]
    fn test_step_end_to_end() {
        let stations = catalog(&[(1, -1.0, 0.0), (2, 1.0, 0.0), (3, 0.0, 1.0), (4, 0.0, -1.0)]);
        let targets = catalog(&[(100, 0.0, 0.0), (200, 500.0, 500.0)]);
        let params = AssociationParams {
            max_dist_kriging: Some(10.0),
            max_dist_idw: Some(20.0),
            max_closest_stations: Some(10),
            number_of_previous_data: 0,
            ..Default::default()
        };
        let mut engine = AssociationEngine::new(stations, targets, params).unwrap();
        let step = engine.process(values(&[(1, 2.0), (2, 4.0), (3, 6.0), (4, 8.0)]));
        assert_eq!(step.get(100).unwrap().method(), InterpolationMethod::Kriging);

        let out = interpolate_step(&step, &variogram(), &IdwParams::default());
        assert_eq!(out.len(), 2);
        // Symmetric layout: all weights equal.
        let v = out[&100].unwrap();
        assert!((v - 5.0).abs() < 1e-9, "got {v}");
        assert_eq!(out[&200], None);
    }

    #[test]
    fn test_singular_kriging_falls_back_to_idw() {
        // Two stations sharing one coordinate make the system singular.
        let stations = catalog(&[(1, 1.0, 0.0), (2, 1.0, 0.0), (3, 3.0, 0.0)]);
        let a = TargetPointAssociation::new(
            InterpolationMethod::Kriging,
            vec![
                neighbor(1.0, 1),
                neighbor(1.0, 2),
                neighbor(3.0, 3),
            ],
        );
        let vals = values(&[(1, 1.0), (2, 3.0), (3, 9.0)]);
        let v = interpolate_target(
            &Coordinate::new(0.0, 0.0, 0.0),
            &a,
            &stations,
            &vals,
            &variogram(),
            &IdwParams::default(),
        )
        .unwrap();
        let expected = (1.0 + 3.0 + 9.0 / 9.0) / (1.0 + 1.0 + 1.0 / 9.0);
        assert!((v - expected).abs() < 1e-12, "got {v}");
    }

    #[test]
    fn test_idw_skips_missing_values() {
        let a = TargetPointAssociation::new(
            InterpolationMethod::Idw,
            vec![
                neighbor(1.0, 1),
                neighbor(2.0, 2),
            ],
        );
        let v = interpolate_target(
            &Coordinate::new(0.0, 0.0, 0.0),
            &a,
            &catalog(&[(1, 1.0, 0.0), (2, 2.0, 0.0)]),
            &values(&[(2, 6.0)]),
            &variogram(),
            &IdwParams::default(),
        );
        assert_eq!(v, Some(6.0));
    }
}
