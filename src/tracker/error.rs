//! Numerical fault reporting for the per-track estimator.

use std::fmt;

use thiserror::Error;

/// Which half of the filter recursion a fault surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    Predict,
    Update,
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStep::Predict => write!(f, "predict"),
            FilterStep::Update => write!(f, "update"),
        }
    }
}

/// Unrecoverable numerical fault in a track's filter state.
///
/// Any of these means the covariance no longer describes a valid
/// distribution; the estimator must not be stepped again. The owning track
/// manager decides whether to drop the track or abort outright.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum KalmanFault {
    #[error("covariance determinant turned negative during {step} ({determinant:.6e})")]
    IndefiniteCovariance { step: FilterStep, determinant: f64 },
    #[error("covariance contains non-finite entries after {step}")]
    NonFiniteCovariance { step: FilterStep },
    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,
}
