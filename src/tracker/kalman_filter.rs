//! Per-object Kalman filter with rotation compensation and JPDAF soft update.
//!
//! One instance per tracked object. The filter runs in image-plane pixel
//! coordinates with state `[x, vx, y, vy]` and is driven by the surrounding
//! tracker in strict predict/update alternation, once per frame. All math is
//! `f64` on nalgebra's statically-sized types.

use nalgebra::{Matrix2, Matrix4, SMatrix, Vector2, Vector3, Vector4};
use tracing::warn;

use crate::tracker::config::TrackerConfig;
use crate::tracker::detection::Detection;
use crate::tracker::error::{FilterStep, KalmanFault};

/// Fixed measurement projection selecting the position components.
fn observation_matrix() -> SMatrix<f64, 2, 4> {
    SMatrix::<f64, 2, 4>::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Jacobian of the camera's rotational motion field at image point `z`.
///
/// Maps the three angular-velocity components to the optical flow they
/// induce at `z`, linearized around the current apparent position. The
/// velocity rows are zero: camera rotation displaces the apparent position
/// but does not enter the velocity equations.
fn rotation_flow_jacobian(
    z: Vector2<f64>,
    principal_point: Vector2<f64>,
    focal_length: f64,
    alpha: f64,
) -> SMatrix<f64, 4, 3> {
    let u = z.x - principal_point.x;
    let v = z.y - principal_point.y;
    let f = focal_length;

    let mut b = SMatrix::<f64, 4, 3>::zeros();
    b[(0, 0)] = u * v / f;
    b[(0, 1)] = -(f * alpha + u * u / (f * alpha));
    b[(0, 2)] = alpha * v;
    b[(2, 0)] = f + v * v / f;
    b[(2, 1)] = -(u * v) / (alpha * f);
    b[(2, 2)] = -u / alpha;
    b
}

fn check_covariance(covariance: &Matrix4<f64>, step: FilterStep) -> Result<(), KalmanFault> {
    let determinant = covariance.determinant();
    if determinant < 0.0 {
        return Err(KalmanFault::IndefiniteCovariance { step, determinant });
    }
    if covariance.iter().any(|e| !e.is_finite()) {
        return Err(KalmanFault::NonFiniteCovariance { step });
    }
    Ok(())
}

/// Per-object state estimator.
///
/// Owns the state mean and covariance together with the innovation
/// covariance and predicted measurement retained from the most recent step.
/// `update` must always follow the `predict` that produced them; the caller
/// enforces the alternation.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    state: Vector4<f64>,
    covariance: Matrix4<f64>,
    /// S = H·P·Hᵀ + R, retained from the last step for gating and update
    innovation_cov: Matrix2<f64>,
    /// z = H·x, recomputed after every predict and update
    predicted_measurement: Vector2<f64>,
    measurement_noise: Matrix2<f64>,
    process_noise_tau: Vector2<f64>,
    focal_length: f64,
    alpha_cam: f64,
    principal_point: Vector2<f64>,
}

impl KalmanFilter {
    /// Spawn an estimator at `position` with zero initial velocity.
    pub fn new(position: Vector2<f64>, config: &TrackerConfig) -> Self {
        Self::with_velocity(position, Vector2::zeros(), config)
    }

    /// Spawn an estimator with an explicit initial velocity guess.
    pub fn with_velocity(
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        config: &TrackerConfig,
    ) -> Self {
        let state = Vector4::new(position.x, velocity.x, position.y, velocity.y);
        let covariance = config.initial_covariance;
        let h = observation_matrix();

        Self {
            state,
            covariance,
            innovation_cov: h * covariance * h.transpose() + config.measurement_noise,
            predicted_measurement: h * state,
            measurement_noise: config.measurement_noise,
            process_noise_tau: config.process_noise_tau,
            focal_length: config.focal_length,
            alpha_cam: config.alpha_cam,
            principal_point: config.principal_point,
        }
    }

    /// Advance the state by `dt` seconds under constant velocity, displaced
    /// by the apparent motion induced by the camera rotating at `omega`.
    ///
    /// If the rotation compensation evaluates to non-finite values (a
    /// diverging track whose projected position ran off the image plane),
    /// the step is skipped with state and covariance untouched and `Ok` is
    /// returned; such a track is left for the manager to retire. A
    /// covariance that comes out indefinite or non-finite is unrecoverable
    /// and reported as a [`KalmanFault`].
    pub fn predict(&mut self, dt: f64, omega: Vector3<f64>) -> Result<(), KalmanFault> {
        let transition = Matrix4::new(
            1.0, dt, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, dt, //
            0.0, 0.0, 0.0, 1.0,
        );

        // Velocity is the stochastically driven quantity; position noise is
        // its time-integral.
        let tau = self.process_noise_tau;
        let process_noise = Matrix4::from_diagonal(&Vector4::new(
            dt * dt * tau.x / 2.0,
            dt * tau.x,
            dt * dt * tau.y / 2.0,
            dt * tau.y,
        ));

        let rotation = rotation_flow_jacobian(
            self.predicted_measurement,
            self.principal_point,
            self.focal_length,
            self.alpha_cam,
        );

        if rotation.iter().any(|e| !e.is_finite()) {
            warn!("rotation compensation is non-finite, skipping predict");
            return Ok(());
        }

        let control = omega * dt;

        self.state = transition * self.state + rotation * control;
        self.covariance = transition * self.covariance * transition.transpose() + process_noise;

        check_covariance(&self.covariance, FilterStep::Predict)?;

        let h = observation_matrix();
        self.innovation_cov = h * self.covariance * h.transpose() + self.measurement_noise;
        self.predicted_measurement = h * self.state;

        Ok(())
    }

    /// Fuse the gated candidate detections into the posterior, weighted by
    /// their association probabilities.
    ///
    /// `weights[i]` is the probability that `detections[i]` belongs to this
    /// track; `no_association_weight` is the mass on "no matching detection
    /// this frame". Together they are expected to sum to one, which the
    /// filter does not verify. The posterior covariance blends the prior,
    /// the standard-form correction and a mixture term that grows with the
    /// disagreement among the weighted candidate innovations.
    pub fn update(
        &mut self,
        detections: &[Detection],
        weights: &[f64],
        no_association_weight: f64,
    ) -> Result<(), KalmanFault> {
        debug_assert_eq!(detections.len(), weights.len());

        let s_inv = self
            .innovation_cov
            .try_inverse()
            .ok_or(KalmanFault::SingularInnovationCovariance)?;
        let gain = self.covariance * observation_matrix().transpose() * s_inv;

        let mut combined = Vector2::zeros();
        let mut weighted_outer = Matrix2::zeros();
        for (detection, &weight) in detections.iter().zip(weights) {
            let innovation = detection.position() - self.predicted_measurement;
            combined += weight * innovation;
            weighted_outer += weight * innovation * innovation.transpose();
        }

        self.state += gain * combined;

        // Sign is `-` here; the `+` found in some published derivations of
        // this correction is a misprint.
        let corrected = self.covariance - gain * self.innovation_cov * gain.transpose();

        let spread = weighted_outer - combined * combined.transpose();
        let mixture = gain * spread * gain.transpose();

        self.covariance = no_association_weight * self.covariance
            + (1.0 - no_association_weight) * corrected
            + mixture;

        check_covariance(&self.covariance, FilterStep::Update)?;

        self.predicted_measurement = observation_matrix() * self.state;

        Ok(())
    }

    /// State mean `[x, vx, y, vy]`.
    pub fn state(&self) -> &Vector4<f64> {
        &self.state
    }

    pub fn covariance(&self) -> &Matrix4<f64> {
        &self.covariance
    }

    /// Projection of the current state onto measurement space.
    pub fn predicted_measurement(&self) -> Vector2<f64> {
        self.predicted_measurement
    }

    /// Innovation covariance from the most recent step, as consumed by the
    /// external gating and association-weight stages.
    pub fn innovation_covariance(&self) -> &Matrix2<f64> {
        &self.innovation_cov
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.state[0], self.state[2])
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.state[1], self.state[3])
    }
}
