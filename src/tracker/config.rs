use nalgebra::{Matrix2, Matrix4, Vector2, Vector4};

/// Construction-time configuration for per-track estimators.
///
/// Copied into each filter at spawn and immutable thereafter. The camera
/// intrinsics (`focal_length`, `alpha_cam`, `principal_point`) define how
/// the camera's angular velocity maps to apparent motion on the image
/// plane.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Measurement noise covariance, pixels squared
    pub measurement_noise: Matrix2<f64>,
    /// Per-axis process-noise time constants (x, y)
    pub process_noise_tau: Vector2<f64>,
    /// Initial state covariance for freshly spawned tracks
    pub initial_covariance: Matrix4<f64>,
    /// Focal length in pixels
    pub focal_length: f64,
    /// Camera scale (aspect) factor
    pub alpha_cam: f64,
    /// Principal point offset in pixels
    pub principal_point: Vector2<f64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            measurement_noise: Matrix2::from_diagonal(&Vector2::new(10.0, 10.0)),
            process_noise_tau: Vector2::new(5.0, 5.0),
            initial_covariance: Matrix4::from_diagonal(&Vector4::new(100.0, 25.0, 100.0, 25.0)),
            focal_length: 570.0,
            alpha_cam: 1.0,
            principal_point: Vector2::new(320.0, 240.0),
        }
    }
}
