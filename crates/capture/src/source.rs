//! Tracking sample sources.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use facerig_common::error::FacerigResult;
use facerig_signal_model::sample::RawTrackingSample;

/// One frame pulled from a source.
#[derive(Debug, Clone)]
pub enum SourceFrame {
    /// A sample that parsed.
    Sample(RawTrackingSample),
    /// A frame the source could not decode.
    Malformed { message: String },
}

/// Trait for tracking sample producers.
pub trait TrackingSource: Send {
    /// Next frame, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> FacerigResult<Option<SourceFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Reads a tracking dump: one sample JSON object per line.
///
/// Blank lines and lines starting with `#` are ignored.
pub struct JsonlTrackingSource {
    name: String,
    reader: Box<dyn BufRead + Send>,
    line_number: usize,
}

impl JsonlTrackingSource {
    pub fn open(path: &Path) -> FacerigResult<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(
            path.display().to_string(),
            BufReader::new(file),
        ))
    }

    pub fn from_reader(name: impl Into<String>, reader: impl BufRead + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
            line_number: 0,
        }
    }
}

impl TrackingSource for JsonlTrackingSource {
    fn next_sample(&mut self) -> FacerigResult<Option<SourceFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Ok(Some(match RawTrackingSample::from_json(trimmed) {
                Ok(sample) => SourceFrame::Sample(sample),
                Err(e) => SourceFrame::Malformed {
                    message: format!("line {}: {e}", self.line_number),
                },
            }));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory source.
pub struct StubSource {
    frames: VecDeque<SourceFrame>,
    repeat: bool,
}

impl StubSource {
    pub fn new(frames: impl IntoIterator<Item = SourceFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            repeat: false,
        }
    }

    pub fn from_samples(samples: impl IntoIterator<Item = RawTrackingSample>) -> Self {
        Self::new(samples.into_iter().map(SourceFrame::Sample))
    }

    /// Yield the same sample forever.
    pub fn repeating(sample: RawTrackingSample) -> Self {
        Self {
            frames: VecDeque::from([SourceFrame::Sample(sample)]),
            repeat: true,
        }
    }
}

impl TrackingSource for StubSource {
    fn next_sample(&mut self) -> FacerigResult<Option<SourceFrame>> {
        if self.repeat {
            return Ok(self.frames.front().cloned());
        }
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
