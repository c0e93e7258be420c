use nalgebra::Vector2;

/// A single measurement candidate: a point observation in pixel coordinates.
///
/// Produced by the external detection stage; the estimator reads only the
/// coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
}

impl Detection {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}
