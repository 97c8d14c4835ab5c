//! # geokrige Algorithms
//!
//! Station–target association and variogram fitting for per-time-step
//! geostatistical interpolation.
//!
//! ## Modules
//!
//! - **association**: neighbor selection and the Kriging / IDW / raw / no-data
//!   decision for every target at every step
//! - **variogram**: model family, empirical variogram, default parameters and
//!   Levenberg–Marquardt fitting with a guaranteed fallback
//! - **interpolation**: point estimates from an association (IDW, ordinary
//!   Kriging)

pub mod association;
pub mod interpolation;
pub mod variogram;

pub(crate) mod linalg;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::association::{
        AssociationEngine, AssociationParams, InterpolationMethod, Neighbor, NeighborSearch,
        StepAssociation, TargetPointAssociation,
    };
    pub use crate::interpolation::{IdwParams, interpolate_step, interpolate_target};
    pub use crate::variogram::{
        EmpiricalParams, EmpiricalVariogram, TheoreticalVariogram, VariogramFit,
        VariogramFitter, VariogramFunction, VariogramModel, VariogramParameters,
        empirical_variogram,
    };
    pub use geokrige_core::prelude::*;
}
