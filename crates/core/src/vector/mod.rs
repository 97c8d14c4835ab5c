//! Vector features and point catalog construction
//!
//! Station and target layers arrive from an external feature reader as
//! point geometries with attribute bags. A catalog is built from them by
//! naming the id field and the elevation field.

use geo_types::{Coord, Geometry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::geometry::{Coordinate, PointCatalog, PointId};

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the attribute, `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view; floats are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// First vertex of the geometry, if any.
    pub fn first_coord(&self) -> Option<Coord<f64>> {
        match self.geometry.as_ref()? {
            Geometry::Point(p) => Some(p.0),
            Geometry::MultiPoint(mp) => mp.0.first().map(|p| p.0),
            Geometry::Line(l) => Some(l.start),
            Geometry::LineString(ls) => ls.0.first().copied(),
            Geometry::Polygon(poly) => poly.exterior().0.first().copied(),
            _ => None,
        }
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl PointCatalog {
    /// Build a catalog from point features.
    ///
    /// `id_field` must hold a number (a missing or non-numeric id reads as 0);
    /// `z_field` gives the auxiliary coordinate (missing or non-numeric reads
    /// as 0.0). Later features overwrite earlier ones with the same id.
    ///
    /// # Errors
    /// - `MissingInput` if a field name is empty or a feature has no geometry
    pub fn from_features(
        features: &FeatureCollection,
        id_field: &str,
        z_field: &str,
    ) -> Result<Self> {
        if id_field.is_empty() {
            return Err(Error::MissingInput("id field name"));
        }
        if z_field.is_empty() {
            return Err(Error::MissingInput("elevation field name"));
        }

        let mut catalog = PointCatalog::new();
        for feature in features.iter() {
            let xy = feature
                .first_coord()
                .ok_or(Error::MissingInput("feature geometry"))?;
            let id: PointId = feature
                .get_property(id_field)
                .and_then(AttributeValue::as_i64)
                .unwrap_or(0);
            let z = feature
                .get_property(z_field)
                .and_then(AttributeValue::as_f64)
                .unwrap_or(0.0);
            catalog.insert(id, Coordinate::new(xy.x, xy.y, z));
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point};

    fn station(id: i64, x: f64, y: f64, z: f64) -> Feature {
        Feature::new(Geometry::Point(Point::new(x, y)))
            .with_property("ID", AttributeValue::Int(id))
            .with_property("elev", AttributeValue::Float(z))
    }

    #[test]
    fn test_catalog_from_point_features() {
        let fc: FeatureCollection = vec![
            station(1, 10.0, 20.0, 350.0),
            station(2, 30.0, 40.0, 1200.5),
        ]
        .into_iter()
        .collect();

        let catalog = PointCatalog::from_features(&fc, "ID", "elev").unwrap();
        assert_eq!(catalog.len(), 2);
        let c = catalog.get(2).unwrap();
        assert_eq!((c.x, c.y, c.z), (30.0, 40.0, 1200.5));
    }

    #[test]
    fn test_non_numeric_attributes_default() {
        let f = Feature::new(Geometry::LineString(LineString::from(vec![(5.0, 6.0), (7.0, 8.0)])))
            .with_property("ID", AttributeValue::Float(12.9))
            .with_property("elev", AttributeValue::String("high".into()));
        let fc: FeatureCollection = vec![f].into_iter().collect();

        let catalog = PointCatalog::from_features(&fc, "ID", "elev").unwrap();
        let c = catalog.get(12).unwrap();
        assert_eq!((c.x, c.y, c.z), (5.0, 6.0, 0.0));
    }

    #[test]
    fn test_missing_geometry_is_error() {
        let fc: FeatureCollection = vec![Feature::empty()].into_iter().collect();
        let err = PointCatalog::from_features(&fc, "ID", "elev").unwrap_err();
        assert_eq!(err, Error::MissingInput("feature geometry"));
    }

    #[test]
    fn test_empty_field_name_is_error() {
        let fc = FeatureCollection::new();
        assert!(PointCatalog::from_features(&fc, "", "elev").is_err());
        assert!(PointCatalog::from_features(&fc, "ID", "").is_err());
    }
}
