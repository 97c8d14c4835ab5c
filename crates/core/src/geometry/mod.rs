//! Point coordinates and id-keyed point catalogs
//!
//! Stations and interpolation targets are both plain points with an
//! auxiliary `z` value (usually elevation). Catalogs are built once per run
//! and are read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Integer identifier of a station or a target point.
pub type PointId = i64;

/// A point location. `z` is an auxiliary scalar, not a third spatial axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared planar distance to another coordinate
    #[inline]
    pub fn distance_sq(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Planar Euclidean distance; `z` does not take part.
    #[inline]
    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

/// Mapping from point id to coordinate.
///
/// Iteration order is ascending by id, which keeps every downstream
/// result deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCatalog {
    points: BTreeMap<PointId, Coordinate>,
}

/// Catalog of measurement stations.
pub type StationCatalog = PointCatalog;
/// Catalog of points where values must be estimated.
pub type TargetCatalog = PointCatalog;

impl PointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, replacing any previous coordinate with the same id.
    pub fn insert(&mut self, id: PointId, coordinate: Coordinate) -> Option<Coordinate> {
        self.points.insert(id, coordinate)
    }

    pub fn get(&self, id: PointId) -> Option<&Coordinate> {
        self.points.get(&id)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, &Coordinate)> {
        self.points.iter().map(|(id, c)| (*id, c))
    }

    pub fn ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.keys().copied()
    }
}

impl FromIterator<(PointId, Coordinate)> for PointCatalog {
    fn from_iter<I: IntoIterator<Item = (PointId, Coordinate)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
