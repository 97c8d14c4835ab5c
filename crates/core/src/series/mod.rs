//! Per-time-step station measurements

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::PointId;

/// Sentinel written by time-series readers for a missing measurement.
pub const NOVALUE: f64 = -9999.0;

/// Check a raw reading against the no-value sentinel.
#[inline]
pub fn is_novalue(value: f64, novalue: f64) -> bool {
    !value.is_finite() || value == novalue
}

/// Station measurements for one time step.
///
/// Every key present carries a valid scalar: sentinel and non-finite
/// readings are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMap {
    values: BTreeMap<PointId, f64>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw reader output, dropping `novalue` entries.
    pub fn from_raw<I>(raw: I, novalue: f64) -> Self
    where
        I: IntoIterator<Item = (PointId, f64)>,
    {
        raw.into_iter()
            .filter(|(_, v)| !is_novalue(*v, novalue))
            .collect()
    }

    /// Insert a reading. Returns `false` (and stores nothing) for non-finite values.
    pub fn insert(&mut self, id: PointId, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.values.insert(id, value);
        true
    }

    pub fn get(&self, id: PointId) -> Option<f64> {
        self.values.get(&id).copied()
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, f64)> + '_ {
        self.values.iter().map(|(id, v)| (*id, *v))
    }
}

impl FromIterator<(PointId, f64)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (PointId, f64)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (id, v) in iter {
            map.insert(id, v);
        }
        map
    }
}
