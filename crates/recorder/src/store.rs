//! Atomic log persistence.
//!
//! Saves go to a sibling temporary file that is then renamed over the
//! destination, so a crash mid-write leaves either the old log or the new
//! one, never a truncated file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use facerig_common::error::{FacerigError, FacerigResult};
use facerig_signal_model::signal::{parse_log, AnimationLog};

/// Write `log` to `path`, replacing any existing content atomically.
///
/// A log holding NaN or infinity is refused before anything is written, since
/// JSON would store those values as `null` and the file could not be loaded.
pub fn write_log(path: &Path, log: &AnimationLog) -> FacerigResult<()> {
    if let Some(frame) = log.first_non_finite() {
        return Err(FacerigError::malformed(format!(
            "frame {frame} holds a non-finite value and cannot be saved"
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let result = (|| -> FacerigResult<()> {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, log)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| FacerigError::Io(e.into_error()))?
            .sync_all()?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Read a log from `path`.
///
/// A missing file is an empty log. Content that does not parse as a log is
/// `CorruptData`.
pub fn read_log(path: &Path) -> FacerigResult<AnimationLog> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No animation log yet; starting empty");
            return Ok(AnimationLog::new());
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(FacerigError::corrupt(path, e.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    parse_log(&content).map_err(|e| FacerigError::corrupt(path, e.to_string()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "animation".into());
    name.push(".tmp");
    path.with_file_name(name)
}
