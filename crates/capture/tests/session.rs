use std::path::PathBuf;
use std::time::Duration;

use facerig_capture::{
    CaptureSession, FrameErrorPolicy, JsonlTrackingSource, SessionConfig, SessionState,
    SourceFrame, StubSource,
};
use facerig_common::config::RigConfig;
use facerig_common::error::FacerigError;
use facerig_recorder::KeyframeRecorder;
use facerig_rig::{ChannelRef, MemoryRig, RigAnimator, RigDescription};
use facerig_signal_mapper::{BlendshapeMapping, SignalMapper};
use facerig_signal_model::sample::{Landmarks, RawTrackingSample};

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "facerig_test_capture_{label}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample(pitch: f64) -> RawTrackingSample {
    RawTrackingSample::new(
        pitch,
        0.0,
        0.0,
        vec![0.0, 0.0, 0.0],
        vec![],
        1.0,
        Landmarks::from_points_2d(&[(0.0, 0.0), (3.0, 4.0)]),
    )
}

fn mapper() -> SignalMapper {
    SignalMapper::new(BlendshapeMapping::new([("mouth_open", (0, 1))]).unwrap())
}

fn config(on_error: FrameErrorPolicy) -> SessionConfig {
    SessionConfig {
        fps: 1000,
        on_error,
        ..SessionConfig::default()
    }
}

fn mixed_frames() -> Vec<SourceFrame> {
    vec![
        SourceFrame::Sample(sample(1.0)),
        SourceFrame::Malformed {
            message: "truncated line".to_string(),
        },
        SourceFrame::Sample(sample(2.0)),
    ]
}

#[tokio::test]
async fn drop_policy_skips_malformed_frames() {
    let dir = scratch_dir("drop");
    let path = dir.join("log.json");
    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(StubSource::new(mixed_frames())),
        mapper(),
        KeyframeRecorder::new(&path),
        None,
        config(FrameErrorPolicy::DropFrame),
    );

    let summary = session.run().await.unwrap();
    assert_eq!(summary.frames_seen, 3);
    assert_eq!(summary.frames_recorded, 2);
    assert_eq!(summary.frames_dropped, 1);

    let saved = KeyframeRecorder::new(&path).load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.get(1).unwrap().head_rotation.x, 2.0);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn abort_policy_saves_partial_log_and_fails() {
    let dir = scratch_dir("abort");
    let path = dir.join("log.json");
    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(StubSource::new(mixed_frames())),
        mapper(),
        KeyframeRecorder::new(&path),
        None,
        config(FrameErrorPolicy::Abort),
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, FacerigError::MalformedInput { .. }));
    assert_eq!(session.state(), SessionState::Failed);

    let saved = KeyframeRecorder::new(&path).load().unwrap();
    assert_eq!(saved.len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn configuration_error_aborts_under_drop_policy() {
    let dir = scratch_dir("config");
    let mapper = SignalMapper::new(BlendshapeMapping::new([("eye_blink", (6, 18))]).unwrap());
    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(StubSource::from_samples([sample(0.0)])),
        mapper,
        KeyframeRecorder::new(dir.join("log.json")),
        None,
        config(FrameErrorPolicy::DropFrame),
    );

    let err = session.run().await.unwrap_err();
    assert!(err.is_fatal());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn stop_flag_ends_endless_session() {
    let dir = scratch_dir("stop");
    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(StubSource::repeating(sample(0.0))),
        mapper(),
        KeyframeRecorder::new(dir.join("log.json")),
        None,
        SessionConfig {
            fps: 200,
            ..SessionConfig::default()
        },
    );

    let flag = session.stop_flag();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        flag.store(true, std::sync::atomic::Ordering::SeqCst);
    });

    let summary = session.run().await.unwrap();
    assert!(summary.frames_seen > 0);
    assert_eq!(summary.frames_seen, summary.frames_recorded);
    assert_eq!(session.state(), SessionState::Stopped);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn preview_drives_bound_rig() {
    let dir = scratch_dir("preview");
    let animator =
        RigAnimator::bind(MemoryRig::new(RigDescription::default()), &RigConfig::default())
            .unwrap();
    let mut session = CaptureSession::new(
        Box::new(StubSource::from_samples((0..5).map(|i| sample(i as f64)))),
        mapper(),
        KeyframeRecorder::new(dir.join("log.json")),
        Some(animator),
        config(FrameErrorPolicy::DropFrame),
    );

    let summary = session.run().await.unwrap();
    assert_eq!(summary.frames_applied, 5);

    let (recorder, animator) = session.into_parts();
    let animator = animator.unwrap();
    assert_eq!(recorder.len(), 5);
    assert_eq!(animator.frame_count(), 5);
    assert_eq!(
        animator
            .host()
            .keyframes(&ChannelRef::shape_key("Face", "mouth_open"))
            .len(),
        5
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn jsonl_dump_feeds_session() {
    let dir = scratch_dir("jsonl");
    let dump = dir.join("dump.jsonl");
    let lines: Vec<String> = (0..3)
        .map(|i| serde_json::to_string(&sample(i as f64)).unwrap())
        .collect();
    std::fs::write(&dump, format!("# tracker dump\n{}\n", lines.join("\n"))).unwrap();

    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(JsonlTrackingSource::open(&dump).unwrap()),
        mapper(),
        KeyframeRecorder::new(dir.join("log.json")),
        None,
        config(FrameErrorPolicy::Abort),
    );
    let summary = session.run().await.unwrap();
    assert_eq!(summary.frames_recorded, 3);

    let (recorder, _) = session.into_parts();
    assert_eq!(recorder.log().get(0).unwrap().blendshapes["mouth_open"], 5.0);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn overflowing_landmarks_are_dropped_and_log_reloads() {
    let dir = scratch_dir("overflow");
    let path = dir.join("log.json");
    let mut extreme = sample(3.0);
    extreme.landmarks = Landmarks::from_points_2d(&[(-1e200, 0.0), (1e200, 0.0)]);
    let mut session = CaptureSession::<MemoryRig>::new(
        Box::new(StubSource::from_samples([sample(1.0), extreme, sample(2.0)])),
        mapper(),
        KeyframeRecorder::new(&path),
        None,
        config(FrameErrorPolicy::DropFrame),
    );

    let summary = session.run().await.unwrap();
    assert_eq!(summary.frames_dropped, 1);

    let saved = KeyframeRecorder::new(&path).load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.first_non_finite(), None);

    std::fs::remove_dir_all(&dir).ok();
}
