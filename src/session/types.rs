use crate::landmark::{Detection, Landmark, Region};
use crate::session::status::Status;
use serde::{Deserialize, Serialize};

/// One camera frame as seen by a session: its size and at most one detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Capture time in milliseconds, when the source knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
}

impl Frame {
    pub fn new(width: u32, height: u32, detection: Option<Detection>) -> Self {
        Self {
            width,
            height,
            timestamp_ms: None,
            detection,
        }
    }

    /// A frame where nothing was detected.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(width, height, None)
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// Per-frame output handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Newly stabilized text, empty when nothing new was emitted.
    pub text: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: Status,
    /// Raw landmarks of the tracked part, for drawing an overlay.
    pub landmarks: Vec<Landmark>,
    pub region: Option<Region>,
}

impl PredictionResult {
    /// Result with no text, landmarks or region.
    pub fn status_only(status: Status) -> Self {
        Self {
            text: String::new(),
            status,
            landmarks: Vec::new(),
            region: None,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

fn serialize_status<S: serde::Serializer>(
    status: &Status,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::BodyPart;

    #[test]
    fn test_result_serializes_status_as_string() {
        let result = PredictionResult {
            text: "A".to_string(),
            status: Status::Stable("A".to_string()),
            landmarks: vec![Landmark::new(0.5, 0.5, 0.0)],
            region: Some(Region {
                x1: 10,
                y1: 20,
                x2: 30,
                y2: 40,
            }),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "Stable: A");
        assert_eq!(json["region"], serde_json::json!([10, 20, 30, 40]));
        assert_eq!(json["landmarks"][0]["x"], 0.5);
    }

    #[test]
    fn test_status_only_result() {
        let result = PredictionResult::status_only(Status::Searching(BodyPart::Face));
        assert!(!result.has_text());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "Finding Face");
        assert!(json["region"].is_null());
    }

    #[test]
    fn test_frame_deserializes_without_detection() {
        let frame: Frame = serde_json::from_str(r#"{"width":640,"height":480}"#).unwrap();
        assert_eq!(frame, Frame::empty(640, 480));
    }
}
