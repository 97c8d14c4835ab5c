//! Per-step association engine
//!
//! Bounded search, for each target:
//! 1. stations with distance < `max_dist_kriging`, nearest first, capped
//!    at `max_closest_stations`
//! 2. Kriging iff `non_zero ≥ min_non_zero`, the values are not all equal,
//!    and the history window is ready
//! 3. otherwise redo the search with `max_dist_idw`: empty → NODATA,
//!    uniform or single → raw data, else IDW
//!
//! Unbounded search uses every valid station and skips the history gate.
//!
//! Targets are independent within a step and are evaluated in parallel when
//! the `parallel` feature is on. The history window is advanced once per step,
//! after all targets are decided.

use std::collections::BTreeMap;

use geokrige_core::{Coordinate, Error, PointId, Result, StationCatalog, TargetCatalog, ValueMap};
use tracing::{debug, warn};

use super::{
    AssociationParams, HistoryWindow, InterpolationMethod, Neighbor, NeighborSearch,
    TargetPointAssociation,
};
use crate::maybe_rayon::*;

/// A station with both a coordinate and a value this step
#[derive(Debug, Clone, Copy)]
struct ValidStation {
    id: PointId,
    coordinate: Coordinate,
    value: f64,
}

/// Output of one [`AssociationEngine::process`] call
#[derive(Debug, Clone, PartialEq)]
pub struct StepAssociation {
    /// One entry for every target id
    pub associations: BTreeMap<PointId, TargetPointAssociation>,
    /// Coordinates of the stations that had valid data this step
    pub stations: StationCatalog,
    /// Coordinates of every target
    pub targets: TargetCatalog,
    /// The step's measurements
    pub values: ValueMap,
}

impl StepAssociation {
    pub fn get(&self, target: PointId) -> Option<&TargetPointAssociation> {
        self.associations.get(&target)
    }

    /// Number of targets tagged with `method`.
    pub fn count(&self, method: InterpolationMethod) -> usize {
        self.associations
            .values()
            .filter(|a| a.method() == method)
            .count()
    }
}

/// Builder that fails fast when a catalog was never supplied.
#[derive(Debug, Default)]
pub struct AssociationEngineBuilder {
    stations: Option<StationCatalog>,
    targets: Option<TargetCatalog>,
    params: AssociationParams,
}

impl AssociationEngineBuilder {
    pub fn stations(mut self, stations: StationCatalog) -> Self {
        self.stations = Some(stations);
        self
    }

    pub fn targets(mut self, targets: TargetCatalog) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn params(mut self, params: AssociationParams) -> Self {
        self.params = params;
        self
    }

    /// # Errors
    /// - `MissingInput` if the station or target catalog is missing
    /// - `InvalidParameter` if the parameters do not validate
    pub fn build(self) -> Result<AssociationEngine> {
        let stations = self.stations.ok_or(Error::MissingInput("station catalog"))?;
        let targets = self.targets.ok_or(Error::MissingInput("target catalog"))?;
        AssociationEngine::new(stations, targets, self.params)
    }
}

/// Selects neighbors and interpolation methods step after step.
///
/// The engine owns its [`HistoryWindow`]; time steps must be fed by a single
/// caller in order.
#[derive(Debug)]
pub struct AssociationEngine {
    stations: StationCatalog,
    targets: TargetCatalog,
    params: AssociationParams,
    search: NeighborSearch,
    history: HistoryWindow,
}

impl AssociationEngine {
    pub fn builder() -> AssociationEngineBuilder {
        AssociationEngineBuilder::default()
    }

    pub fn new(
        stations: StationCatalog,
        targets: TargetCatalog,
        params: AssociationParams,
    ) -> Result<Self> {
        params.validate()?;
        if params.is_partially_bounded() {
            warn!(
                max_dist_kriging = ?params.max_dist_kriging,
                max_dist_idw = ?params.max_dist_idw,
                max_closest_stations = ?params.max_closest_stations,
                "search thresholds only partially set, using unbounded neighbor search"
            );
        }

        Ok(Self {
            search: params.search(),
            history: HistoryWindow::new(params.number_of_previous_data),
            stations,
            targets,
            params,
        })
    }

    pub fn params(&self) -> &AssociationParams {
        &self.params
    }

    pub fn search(&self) -> NeighborSearch {
        self.search
    }

    pub fn stations(&self) -> &StationCatalog {
        &self.stations
    }

    pub fn targets(&self) -> &TargetCatalog {
        &self.targets
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// Associate every target with stations for one time step, then advance
    /// the history window.
    pub fn process(&mut self, values: ValueMap) -> StepAssociation {
        let mut valid = Vec::with_capacity(values.len());
        for (id, value) in values.iter() {
            match self.stations.get(id) {
                Some(c) => valid.push(ValidStation {
                    id,
                    coordinate: *c,
                    value,
                }),
                None => warn!(station = id, "station has a value but no coordinate, ignored"),
            }
        }

        let ready = self.history.is_ready();
        let search = self.search;
        let min_non_zero = self.params.min_non_zero_stations_for_kriging;
        let valid_ref = &valid;

        let targets: Vec<(PointId, Coordinate)> =
            self.targets.iter().map(|(id, c)| (id, *c)).collect();
        let associations: BTreeMap<PointId, TargetPointAssociation> = targets
            .into_par_iter()
            .map(|(id, c)| (id, associate(&c, valid_ref, search, min_non_zero, ready)))
            .collect();

        let stations: StationCatalog = valid.iter().map(|s| (s.id, s.coordinate)).collect();

        self.history.push(values.clone());

        let step = StepAssociation {
            associations,
            stations,
            targets: self.targets.clone(),
            values,
        };
        debug!(
            valid_stations = step.stations.len(),
            kriging = step.count(InterpolationMethod::Kriging),
            idw = step.count(InterpolationMethod::Idw),
            raw = step.count(InterpolationMethod::NoInterpolationUseRawData),
            nodata = step.count(InterpolationMethod::NoData),
            history = self.history.len(),
            "associated targets"
        );
        step
    }
}

/// Neighbors of one target plus the statistics the decision needs
struct Selection {
    neighbors: Vec<Neighbor>,
    non_zero: usize,
    all_same: bool,
}

impl Selection {
    fn is_raw(&self) -> bool {
        self.all_same || self.neighbors.len() == 1
    }

    fn into_association(self, method: InterpolationMethod) -> TargetPointAssociation {
        TargetPointAssociation::new(method, self.neighbors)
    }
}

/// Stations strictly closer than `max_dist`, sorted by (distance, id) and
/// capped at `max_count`. Equidistant stations are all kept.
fn select(
    target: &Coordinate,
    valid: &[ValidStation],
    max_dist: Option<f64>,
    max_count: Option<usize>,
) -> Selection {
    let mut candidates: Vec<(f64, &ValidStation)> = valid
        .iter()
        .map(|s| (s.coordinate.distance(target), s))
        .filter(|(d, _)| max_dist.is_none_or(|m| *d < m))
        .collect();

    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
    if let Some(k) = max_count {
        candidates.truncate(k);
    }

    let non_zero = candidates.iter().filter(|(_, s)| s.value != 0.0).count();
    let all_same = candidates.windows(2).all(|w| w[0].1.value == w[1].1.value);

    Selection {
        neighbors: candidates
            .into_iter()
            .map(|(distance, s)| Neighbor {
                distance,
                station_id: s.id,
            })
            .collect(),
        non_zero,
        all_same,
    }
}

fn associate(
    target: &Coordinate,
    valid: &[ValidStation],
    search: NeighborSearch,
    min_non_zero: usize,
    ready: bool,
) -> TargetPointAssociation {
    match search {
        NeighborSearch::Bounded {
            max_dist_kriging,
            max_dist_idw,
            max_closest,
        } => {
            let kriging = select(target, valid, Some(max_dist_kriging), Some(max_closest));
            if kriging.non_zero >= min_non_zero && !kriging.all_same && ready {
                return kriging.into_association(InterpolationMethod::Kriging);
            }

            let idw = select(target, valid, Some(max_dist_idw), Some(max_closest));
            if idw.neighbors.is_empty() {
                TargetPointAssociation::no_data()
            } else if idw.is_raw() {
                idw.into_association(InterpolationMethod::NoInterpolationUseRawData)
            } else {
                idw.into_association(InterpolationMethod::Idw)
            }
        }
        NeighborSearch::Unbounded => {
            let all = select(target, valid, None, None);
            if all.neighbors.is_empty() {
                TargetPointAssociation::no_data()
            } else if all.is_raw() {
                all.into_association(InterpolationMethod::NoInterpolationUseRawData)
            } else if all.non_zero >= min_non_zero {
                all.into_association(InterpolationMethod::Kriging)
            } else {
                all.into_association(InterpolationMethod::Idw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(points: &[(PointId, f64, f64)]) -> StationCatalog {
        points
            .iter()
            .map(|&(id, x, y)| (id, Coordinate::new(x, y, 0.0)))
            .collect()
    }

    fn values(v: &[(PointId, f64)]) -> ValueMap {
        v.iter().copied().collect()
    }

    fn bounded(kriging: f64, idw: f64, closest: usize, previous: usize) -> AssociationParams {
        AssociationParams {
            max_dist_kriging: Some(kriging),
            max_dist_idw: Some(idw),
            max_closest_stations: Some(closest),
            min_non_zero_stations_for_kriging: 3,
            number_of_previous_data: previous,
        }
    }

    fn engine(stations: StationCatalog, params: AssociationParams) -> AssociationEngine {
        AssociationEngine::new(stations, catalog(&[(100, 0.0, 0.0)]), params).unwrap()
    }

    fn five_stations() -> StationCatalog {
        catalog(&[
            (1, 1.0, 0.0),
            (2, 2.0, 0.0),
            (3, 3.0, 0.0),
            (4, 4.0, 0.0),
            (5, 5.0, 0.0),
        ])
    }

    #[test]
    fn test_builder_requires_catalogs() {
        let err = AssociationEngine::builder()
            .targets(TargetCatalog::new())
            .build()
            .unwrap_err();
        assert_eq!(err, Error::MissingInput("station catalog"));

        let err = AssociationEngine::builder()
            .stations(StationCatalog::new())
            .build()
            .unwrap_err();
        assert_eq!(err, Error::MissingInput("target catalog"));

        assert!(
            AssociationEngine::builder()
                .stations(StationCatalog::new())
                .targets(TargetCatalog::new())
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_bounded_kriging() {
        let mut e = engine(five_stations(), bounded(100.0, 1000.0, 10, 0));
        let step = e.process(values(&[(1, 0.0), (2, 0.0), (3, 5.0), (4, 7.0), (5, 9.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::Kriging);
        assert_eq!(a.station_ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_kriging_waits_for_history() {
        let mut e = engine(five_stations(), bounded(100.0, 1000.0, 10, 2));
        let data = values(&[(1, 1.0), (2, 2.0), (3, 5.0), (4, 7.0), (5, 9.0)]);

        let methods: Vec<InterpolationMethod> = (0..5)
            .map(|_| e.process(data.clone()).get(100).unwrap().method())
            .collect();
        assert_eq!(
            methods,
            vec![
                InterpolationMethod::Idw,
                InterpolationMethod::Idw,
                InterpolationMethod::Idw,
                InterpolationMethod::Kriging,
                InterpolationMethod::Kriging,
            ]
        );
        assert_eq!(e.history().len(), 3);
    }

    #[test]
    fn test_idw_radius_fallback() {
        // Only station 1 lies inside the Kriging radius.
        let mut e = engine(five_stations(), bounded(1.5, 3.5, 10, 0));
        let step = e.process(values(&[(1, 1.0), (2, 2.0), (3, 5.0), (4, 7.0), (5, 9.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::Idw);
        assert_eq!(a.station_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_single_neighbor_is_raw() {
        let mut e = engine(five_stations(), bounded(1.5, 1.5, 10, 0));
        let step = e.process(values(&[(1, 4.0), (2, 2.0), (3, 5.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::NoInterpolationUseRawData);
        assert_eq!(a.neighbors().len(), 1);
    }

    #[test]
    fn test_nothing_in_reach_is_nodata() {
        let mut e = engine(five_stations(), bounded(0.5, 0.9, 10, 0));
        let step = e.process(values(&[(1, 4.0), (2, 2.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::NoData);
        assert!(a.neighbors().is_empty());
    }

    #[test]
    fn test_cap_on_closest_stations() {
        let mut e = engine(five_stations(), bounded(100.0, 100.0, 2, 0));
        let step = e.process(values(&[(1, 1.0), (2, 2.0), (3, 5.0), (4, 7.0), (5, 9.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::Idw);
        assert_eq!(a.station_ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_equidistant_stations_are_kept() {
        let stations = catalog(&[(9, 0.0, 2.0), (4, 2.0, 0.0), (6, -2.0, 0.0)]);
        let mut e = engine(stations, bounded(10.0, 10.0, 10, 0));
        let step = e.process(values(&[(9, 1.0), (4, 2.0), (6, 3.0)]));
        let a = step.get(100).unwrap();
        assert_eq!(a.station_ids().collect::<Vec<_>>(), vec![4, 6, 9]);
        assert_eq!(a.method(), InterpolationMethod::Kriging);
    }

    #[test]
    fn test_unknown_station_is_absent() {
        let mut e = engine(five_stations(), AssociationParams::unbounded());
        let step = e.process(values(&[(1, 1.0), (42, 7.0)]));
        assert_eq!(step.stations.len(), 1);
        let a = step.get(100).unwrap();
        assert_eq!(a.method(), InterpolationMethod::NoInterpolationUseRawData);
        assert_eq!(a.station_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_unbounded_ignores_history_gate() {
        let params = AssociationParams {
            number_of_previous_data: 50,
            ..AssociationParams::unbounded()
        };
        let mut e = engine(five_stations(), params);
        let step = e.process(values(&[(1, 0.0), (2, 0.0), (3, 5.0), (4, 7.0), (5, 9.0)]));
        assert_eq!(step.get(100).unwrap().method(), InterpolationMethod::Kriging);
    }

    #[test]
    fn test_unbounded_too_few_non_zero_is_idw() {
        let mut e = engine(five_stations(), AssociationParams::unbounded());
        let step = e.process(values(&[(1, 0.0), (2, 0.0), (3, 0.0), (4, 7.0), (5, 9.0)]));
        assert_eq!(step.get(100).unwrap().method(), InterpolationMethod::Idw);
    }

    #[test]
    fn test_empty_step_is_nodata_everywhere() {
        let mut e = engine(five_stations(), AssociationParams::default());
        let step = e.process(ValueMap::new());
        assert_eq!(step.count(InterpolationMethod::NoData), 1);
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn test_neighbors_sorted_ascending() {
        let stations = catalog(&[(1, 9.0, 0.0), (2, 1.0, 0.0), (3, 4.0, 0.0), (4, 2.0, 0.0)]);
        let mut e = engine(stations, AssociationParams::unbounded());
        let step = e.process(values(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]));
        let d: Vec<f64> = step.get(100).unwrap().distances().collect();
        assert_eq!(d, vec![1.0, 2.0, 4.0, 9.0]);
    }
}
