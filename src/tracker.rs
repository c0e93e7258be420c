mod config;
mod detection;
mod error;
mod kalman_filter;
mod track;

pub use config::TrackerConfig;
pub use detection::Detection;
pub use error::{FilterStep, KalmanFault};
pub use kalman_filter::KalmanFilter;
pub use track::{Track, reset_track_id_counter};
