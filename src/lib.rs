//! Per-object state estimation for JPDAF-based visual multi-target tracking
//! from a rotating camera.
//!
//! Each tracked object owns a [`KalmanFilter`] over its image-plane position
//! and velocity. `predict` advances the estimate under a constant-velocity
//! model while compensating for the camera's own rotation; `update` fuses the
//! probability-weighted measurement candidates produced by an external data
//! association stage. Detection, gating, association weights and track
//! lifecycle all live outside this crate.

pub mod tracker;

pub use tracker::{Detection, FilterStep, KalmanFault, KalmanFilter, Track, TrackerConfig};
