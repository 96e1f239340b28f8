//! Landmark points and detections reported by the landmark source.

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tracked keypoint in detector-normalized image space (x, y typically in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in all three axes.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Hand landmark indices (21-point hand model, wrist first).
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// (tip, pip, mcp) for the four non-thumb fingers, index to pinky.
    pub const FINGERS: [(usize, usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP, INDEX_MCP),
        (MIDDLE_TIP, MIDDLE_PIP, MIDDLE_MCP),
        (RING_TIP, RING_PIP, RING_MCP),
        (PINKY_TIP, PINKY_PIP, PINKY_MCP),
    ];
}

/// Face-mesh indices of the lip contour, in the order lip observations carry them.
pub const LIP_MESH_INDICES: [usize; defaults::LIP_LANDMARK_COUNT] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317, 14, 87, 178, 88,
    95,
];

/// Physical hand reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => write!(f, "left"),
            Handedness::Right => write!(f, "right"),
        }
    }
}

/// Which body part a session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Hand,
    Face,
}

impl BodyPart {
    /// Landmarks per observation of this body part.
    pub fn landmark_count(self) -> usize {
        match self {
            BodyPart::Hand => defaults::HAND_LANDMARK_COUNT,
            BodyPart::Face => defaults::LIP_LANDMARK_COUNT,
        }
    }

    /// Feature values per frame (x, y, z per landmark).
    pub fn feature_len(self) -> usize {
        3 * self.landmark_count()
    }

    /// Config file section holding this body part's settings.
    pub fn config_section(self) -> &'static str {
        match self {
            BodyPart::Hand => "sign",
            BodyPart::Face => "lip",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyPart::Hand => write!(f, "Hand"),
            BodyPart::Face => write!(f, "Face"),
        }
    }
}

/// One tracked instance: a single hand or a single face (lip subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub part: BodyPart,
    pub landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
}

impl Detection {
    pub fn hand(landmarks: Vec<Landmark>, handedness: Option<Handedness>) -> Self {
        Self {
            part: BodyPart::Hand,
            landmarks,
            handedness,
        }
    }

    pub fn face(landmarks: Vec<Landmark>) -> Self {
        Self {
            part: BodyPart::Face,
            landmarks,
            handedness: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3d() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(3.0, 4.0, 12.0);
        assert!((a.distance(&b) - 13.0).abs() < 1e-6);
    }

    #[test]
    fn test_feature_len_per_part() {
        assert_eq!(BodyPart::Hand.feature_len(), 63);
        assert_eq!(BodyPart::Face.feature_len(), 63);
    }

    #[test]
    fn test_landmark_z_defaults_when_missing() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.5}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.5, 0.0));
    }

    #[test]
    fn test_handedness_serde_lowercase() {
        let json = serde_json::to_string(&Handedness::Right).unwrap();
        assert_eq!(json, "\"right\"");
        let parsed: Handedness = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Handedness::Left);
    }

    #[test]
    fn test_body_part_display() {
        assert_eq!(BodyPart::Hand.to_string(), "Hand");
        assert_eq!(BodyPart::Face.to_string(), "Face");
    }

    #[test]
    fn test_lip_indices_are_unique() {
        let mut sorted = LIP_MESH_INDICES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), LIP_MESH_INDICES.len());
    }
}
