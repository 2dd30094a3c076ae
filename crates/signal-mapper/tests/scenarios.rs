use facerig_common::error::FacerigError;
use facerig_signal_mapper::{BlendshapeMapping, SignalMapper};
use facerig_signal_model::sample::{Landmarks, RawTrackingSample};
use facerig_signal_model::signal::HeadRotation;
use proptest::prelude::*;

fn landmarks_with(len: usize, placed: &[(usize, (f64, f64))]) -> Vec<Vec<f64>> {
    let mut points = vec![vec![0.0, 0.0]; len];
    for &(idx, (x, y)) in placed {
        points[idx] = vec![x, y];
    }
    points
}

fn sample(pitch: f64, yaw: f64, roll: f64, landmarks: Landmarks) -> RawTrackingSample {
    RawTrackingSample::new(
        pitch,
        yaw,
        roll,
        vec![0.0, 0.0, 0.0],
        vec![0.1, 0.2],
        1.0,
        landmarks,
    )
}

#[test]
fn eye_blink_distance_is_exact() {
    let mapping = BlendshapeMapping::new([("eye_blink", (6, 18))]).unwrap();
    let points = landmarks_with(21, &[(6, (0.0, 0.0)), (18, (3.0, 4.0))]);
    let signal = SignalMapper::new(mapping)
        .map(&sample(0.0, 0.0, 0.0, Landmarks::Single(points)))
        .unwrap();

    assert_eq!(signal.blendshapes.len(), 1);
    assert_eq!(signal.blendshapes["eye_blink"], 5.0);
}

#[test]
fn batched_landmarks_use_first_subject() {
    let mapping = BlendshapeMapping::new([("eye_blink", (6, 18))]).unwrap();
    let first = landmarks_with(21, &[(6, (0.0, 0.0)), (18, (3.0, 4.0))]);
    let second = landmarks_with(21, &[(6, (0.0, 0.0)), (18, (30.0, 40.0))]);
    let signal = SignalMapper::new(mapping)
        .map(&sample(0.0, 0.0, 0.0, Landmarks::Batched(vec![first, second])))
        .unwrap();

    assert_eq!(signal.blendshapes["eye_blink"], 5.0);
}

#[test]
fn head_rotation_has_no_unit_conversion() {
    let mapping = BlendshapeMapping::new([("eye_blink", (0, 1))]).unwrap();
    let signal = SignalMapper::new(mapping)
        .map(&sample(
            10.0,
            -5.0,
            0.0,
            Landmarks::from_points_2d(&[(0.0, 0.0), (1.0, 0.0)]),
        ))
        .unwrap();

    assert_eq!(signal.head_rotation, HeadRotation::new(10.0, -5.0, 0.0));
}

#[test]
fn out_of_range_index_never_yields_a_distance() {
    let mapping = BlendshapeMapping::new([("eye_blink", (6, 18))]).unwrap();
    let points = landmarks_with(10, &[]);
    let result =
        SignalMapper::new(mapping).map(&sample(0.0, 0.0, 0.0, Landmarks::Single(points)));

    assert!(matches!(result, Err(FacerigError::Configuration { .. })));
}

proptest! {
    #[test]
    fn mapping_is_deterministic(
        pitch in -90.0f64..90.0,
        yaw in -90.0f64..90.0,
        roll in -90.0f64..90.0,
        coords in proptest::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 20..40),
    ) {
        let mapping = BlendshapeMapping::new([
            ("brow_up", (0, 1)),
            ("eye_blink", (6, 18)),
            ("mouth_wide", (2, 19)),
        ])
        .unwrap();
        let mapper = SignalMapper::new(mapping);
        let raw = sample(pitch, yaw, roll, Landmarks::from_points_2d(&coords));

        let a = mapper.map(&raw).unwrap();
        let b = mapper.map(&raw).unwrap();

        prop_assert_eq!(a.head_rotation.x.to_bits(), b.head_rotation.x.to_bits());
        prop_assert_eq!(a.head_rotation.y.to_bits(), b.head_rotation.y.to_bits());
        prop_assert_eq!(a.head_rotation.z.to_bits(), b.head_rotation.z.to_bits());
        for (name, value) in &a.blendshapes {
            prop_assert!(*value >= 0.0);
            prop_assert_eq!(value.to_bits(), b.blendshapes[name].to_bits());
        }
        prop_assert_eq!(a, b);
    }
}
