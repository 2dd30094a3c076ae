//! FaceRig Keyframe Recorder
//!
//! Keeps an in-memory, append-only log of control signals during a capture
//! session and persists it as a JSON array on demand. Recording never
//! touches the disk; only [`KeyframeRecorder::save`] and
//! [`KeyframeRecorder::load`] do, and callers are expected to invoke them at
//! session boundaries rather than per frame.

pub mod store;

use std::path::{Path, PathBuf};

use facerig_common::error::FacerigResult;
use facerig_signal_model::signal::{AnimationLog, ControlSignal};

/// Recorder bound to one destination file.
pub struct KeyframeRecorder {
    path: PathBuf,
    log: AnimationLog,
    unsaved_frames: usize,
}

impl KeyframeRecorder {
    /// Create an empty recorder bound to `path`. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            log: AnimationLog::new(),
            unsaved_frames: 0,
        }
    }

    /// Append one frame.
    pub fn record(&mut self, signal: ControlSignal) {
        self.log.push(signal);
        self.unsaved_frames += 1;
    }

    /// Persist the whole log, replacing whatever the destination held.
    pub fn save(&mut self) -> FacerigResult<()> {
        store::write_log(&self.path, &self.log)?;
        tracing::info!(
            path = %self.path.display(),
            frames = self.log.len(),
            "Animation log saved"
        );
        self.unsaved_frames = 0;
        Ok(())
    }

    /// Replace the in-memory log with the destination's content.
    ///
    /// A missing destination yields an empty log.
    pub fn load(&mut self) -> FacerigResult<AnimationLog> {
        let log = store::read_log(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            frames = log.len(),
            "Animation log loaded"
        );
        self.log = log.clone();
        self.unsaved_frames = 0;
        Ok(log)
    }

    pub fn log(&self) -> &AnimationLog {
        &self.log
    }

    /// Number of frames recorded.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Frames recorded since the last save or load.
    pub fn unsaved_frames(&self) -> usize {
        self.unsaved_frames
    }

    /// Path to the destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for KeyframeRecorder {
    fn drop(&mut self) {
        if self.unsaved_frames > 0 {
            tracing::warn!(
                path = %self.path.display(),
                unsaved = self.unsaved_frames,
                "Recorder dropped with unsaved frames"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facerig_common::error::FacerigError;
    use facerig_signal_model::signal::HeadRotation;

    fn signal(frame: u32) -> ControlSignal {
        ControlSignal {
            head_rotation: HeadRotation::new(frame as f64, 0.0, 0.0),
            blendshapes: [("mouth_open".to_string(), frame as f64 * 0.5)]
                .into_iter()
                .collect(),
            translation: vec![0.0, 0.0, 0.0],
            expression: vec![0.1; 4],
        }
    }

    #[test]
    fn test_record_does_not_touch_disk() {
        let dir = std::env::temp_dir().join("facerig_test_recorder_nodisk");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("log.json");

        let mut recorder = KeyframeRecorder::new(&path);
        recorder.record(signal(0));
        recorder.record(signal(1));
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.unsaved_frames(), 2);
        assert!(!path.exists());

        recorder.save().unwrap();
        assert!(path.exists());
        assert_eq!(recorder.unsaved_frames(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let path = std::env::temp_dir()
            .join("facerig_test_recorder_missing")
            .join("never_written.json");
        let _ = std::fs::remove_file(&path);

        let mut recorder = KeyframeRecorder::new(&path);
        let log = recorder.load().unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = std::env::temp_dir().join("facerig_test_recorder_corrupt");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.json");
        std::fs::write(&path, r#"[{"head_rotation": {"x": 1.0}}"#).unwrap();

        let mut recorder = KeyframeRecorder::new(&path);
        let err = recorder.load().unwrap_err();
        assert!(matches!(err, FacerigError::CorruptData { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_wrong_schema_is_corrupt() {
        let dir = std::env::temp_dir().join("facerig_test_recorder_schema");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.json");
        std::fs::write(&path, r#"{"frames": []}"#).unwrap();

        let mut recorder = KeyframeRecorder::new(&path);
        assert!(matches!(
            recorder.load(),
            Err(FacerigError::CorruptData { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_replaces_in_memory_log() {
        let dir = std::env::temp_dir().join("facerig_test_recorder_replace");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("log.json");

        let mut writer = KeyframeRecorder::new(&path);
        writer.record(signal(7));
        writer.save().unwrap();

        let mut reader = KeyframeRecorder::new(&path);
        reader.record(signal(1));
        reader.record(signal(2));
        let log = reader.load().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.log().get(0).unwrap().head_rotation.x, 7.0);
        assert_eq!(reader.unsaved_frames(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
