//! Recorded landmark traces: one JSON object per line.
//!
//! ```text
//! {"width":640,"height":480,"t_ms":0,"hand":{"handedness":"right","landmarks":[{"x":0.5,"y":0.9,"z":0.0}, ...]}}
//! {"width":640,"height":480,"t_ms":33}
//! {"width":640,"height":480,"t_ms":66,"face":{"landmarks":[...]}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A line with neither
//! `hand` nor `face` is a frame with no detection.

use crate::error::{Result, TalkifyError};
use crate::landmark::{BodyPart, Detection, Handedness, Landmark};
use crate::session::Frame;
use crate::source::LandmarkSource;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Landmarks of one tracked part as stored in a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    pub landmarks: Vec<Landmark>,
}

/// One trace line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<TraceDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<TraceDetection>,
}

impl TraceRecord {
    /// Frame carrying the detection for `part`, if the line has one.
    pub fn into_frame(self, part: BodyPart) -> Frame {
        let detection = match part {
            BodyPart::Hand => self
                .hand
                .map(|d| Detection::hand(d.landmarks, d.handedness)),
            BodyPart::Face => self.face.map(|d| Detection::face(d.landmarks)),
        };
        Frame {
            width: self.width,
            height: self.height,
            timestamp_ms: self.t_ms,
            detection,
        }
    }
}

/// Reads frames for one body part from a JSON-lines trace.
pub struct TraceSource {
    lines: Box<dyn BufRead + Send>,
    part: BodyPart,
    line_no: usize,
}

impl TraceSource {
    pub fn new(reader: impl BufRead + Send + 'static, part: BodyPart) -> Self {
        Self {
            lines: Box::new(reader),
            part,
            line_no: 0,
        }
    }

    pub fn open(path: &Path, part: BodyPart) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), part))
    }

    /// Parse a whole trace into frames.
    pub fn read_all(mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}

impl LandmarkSource for TraceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.lines.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let record: TraceRecord =
                serde_json::from_str(trimmed).map_err(|e| TalkifyError::TraceParse {
                    line: self.line_no,
                    message: e.to_string(),
                })?;
            return Ok(Some(record.into_frame(self.part)));
        }
    }

    fn name(&self) -> &'static str {
        "trace"
    }
}
