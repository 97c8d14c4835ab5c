//! # geokrige Core
//!
//! Core types for station-based geostatistical interpolation.
//!
//! This crate provides:
//! - `Coordinate` and id-keyed `PointCatalog`s for stations and targets
//! - `Feature` / `FeatureCollection` and catalog construction from features
//! - `ValueMap`: one time step of station measurements, sentinel-filtered
//! - The crate-wide `Error` and `Result`

pub mod error;
pub mod geometry;
pub mod series;
pub mod vector;

pub use error::{Error, Result};
pub use geometry::{Coordinate, PointCatalog, PointId, StationCatalog, TargetCatalog};
pub use series::{NOVALUE, ValueMap};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Coordinate, PointCatalog, PointId, StationCatalog, TargetCatalog};
    pub use crate::series::{NOVALUE, ValueMap};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
