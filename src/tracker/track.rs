//! Single tracked object: a process-unique identity around its estimator.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Vector2, Vector3};
use tracing::error;

use crate::tracker::config::TrackerConfig;
use crate::tracker::detection::Detection;
use crate::tracker::error::KalmanFault;
use crate::tracker::kalman_filter::KalmanFilter;

/// Global track ID counter for unique ID generation.
static TRACK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reset the global track ID counter (useful for testing).
pub fn reset_track_id_counter() {
    TRACK_ID_COUNTER.store(0, Ordering::SeqCst);
}

/// Get the next unique track ID.
fn next_track_id() -> u64 {
    TRACK_ID_COUNTER.fetch_add(1, Ordering::SeqCst) + 1
}

/// A tracked object: an estimator plus the id the surrounding system
/// addresses it by.
///
/// Spawn/merge/delete decisions belong to the external track manager; this
/// type only carries identity and routes estimator faults into the log with
/// the offending track named.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    filter: KalmanFilter,
}

impl Track {
    /// Spawn a track at `position` with zero initial velocity.
    pub fn new(position: Vector2<f64>, config: &TrackerConfig) -> Self {
        Self {
            track_id: next_track_id(),
            filter: KalmanFilter::new(position, config),
        }
    }

    /// Spawn a track with an explicit initial velocity guess.
    pub fn with_velocity(
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        config: &TrackerConfig,
    ) -> Self {
        Self {
            track_id: next_track_id(),
            filter: KalmanFilter::with_velocity(position, velocity, config),
        }
    }

    pub fn predict(&mut self, dt: f64, omega: Vector3<f64>) -> Result<(), KalmanFault> {
        self.filter.predict(dt, omega).inspect_err(|fault| {
            error!("track {}: {fault}", self.track_id);
        })
    }

    pub fn update(
        &mut self,
        detections: &[Detection],
        weights: &[f64],
        no_association_weight: f64,
    ) -> Result<(), KalmanFault> {
        self.filter
            .update(detections, weights, no_association_weight)
            .inspect_err(|fault| {
                error!("track {}: {fault}", self.track_id);
            })
    }

    pub fn filter(&self) -> &KalmanFilter {
        &self.filter
    }

    /// Advance every track by one frame interval.
    ///
    /// Tracks are mutually independent, so a concurrent caller may fan this
    /// out per track instead, as long as all predictions complete before the
    /// next frame's association weights are computed.
    pub fn multi_predict(
        tracks: &mut [Track],
        dt: f64,
        omega: Vector3<f64>,
    ) -> Result<(), KalmanFault> {
        for track in tracks.iter_mut() {
            track.predict(dt, omega)?;
        }
        Ok(())
    }
}
