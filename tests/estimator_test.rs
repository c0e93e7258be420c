use approx::assert_abs_diff_eq;
use jpdaf_tracker::tracker::reset_track_id_counter;
use jpdaf_tracker::{Detection, Track, TrackerConfig};
use nalgebra::{Vector2, Vector3};

fn camera_config() -> TrackerConfig {
    TrackerConfig {
        focal_length: 570.0,
        alpha_cam: 1.0,
        principal_point: Vector2::new(320.0, 240.0),
        ..TrackerConfig::default()
    }
}

#[test]
fn test_multi_frame_tracking_under_rotation() {
    reset_track_id_counter();
    let config = camera_config();
    let dt = 1.0 / 30.0;
    // Camera yawing to the right; apparent motion sweeps left for every track.
    let omega = Vector3::new(0.0, 0.02, 0.0);

    let mut tracks = vec![
        Track::new(Vector2::new(100.0, 100.0), &config),
        Track::new(Vector2::new(300.0, 120.0), &config),
        Track::new(Vector2::new(500.0, 400.0), &config),
    ];
    assert!(tracks[0].track_id != tracks[1].track_id);
    assert!(tracks[1].track_id != tracks[2].track_id);

    let coasting_start_x = tracks[1].filter().position().x;
    let mut coasting_trace = tracks[1].filter().covariance().trace();

    for _ in 0..5 {
        Track::multi_predict(&mut tracks, dt, omega).unwrap();

        // Track 0 got two gated candidates this frame; the others none.
        let z = tracks[0].filter().predicted_measurement();
        let candidates = [
            Detection::new(z.x + 1.0, z.y),
            Detection::new(z.x - 1.0, z.y + 1.0),
        ];
        tracks[0].update(&candidates, &[0.6, 0.3], 0.1).unwrap();
        tracks[1].update(&[], &[], 1.0).unwrap();
        tracks[2].update(&[], &[], 1.0).unwrap();

        // A coasting track only accumulates uncertainty.
        let trace = tracks[1].filter().covariance().trace();
        assert!(trace > coasting_trace);
        coasting_trace = trace;
    }

    for track in &tracks {
        assert!(track.filter().state().iter().all(|v| v.is_finite()));
    }

    // Yaw-induced flow dominates for a zero-velocity track.
    assert!(tracks[1].filter().position().x < coasting_start_x);
}

#[test]
fn test_track_converges_onto_repeated_detection() {
    let config = camera_config();
    let dt = 1.0 / 30.0;
    let target = Vector2::new(210.0, 160.0);

    let mut track = Track::new(Vector2::new(200.0, 150.0), &config);

    for _ in 0..30 {
        track.predict(dt, Vector3::zeros()).unwrap();
        track
            .update(&[Detection::new(target.x, target.y)], &[1.0], 0.0)
            .unwrap();
    }

    assert_abs_diff_eq!(track.filter().predicted_measurement(), target, epsilon = 1.0);
}

#[test]
fn test_all_mass_on_no_association_equals_pure_prediction() {
    let config = camera_config();
    let dt = 1.0 / 30.0;
    let omega = Vector3::new(0.01, -0.03, 0.005);

    let mut updated = Track::with_velocity(
        Vector2::new(250.0, 200.0),
        Vector2::new(12.0, -4.0),
        &config,
    );
    let mut predicted_only = updated.clone();

    for _ in 0..10 {
        updated.predict(dt, omega).unwrap();
        updated.update(&[], &[], 1.0).unwrap();

        predicted_only.predict(dt, omega).unwrap();

        assert_eq!(updated.filter().state(), predicted_only.filter().state());
        assert_eq!(
            updated.filter().covariance(),
            predicted_only.filter().covariance()
        );
    }
}
