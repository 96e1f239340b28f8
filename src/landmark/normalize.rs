//! Translation- and scale-invariant feature vectors from raw landmarks.

use crate::defaults;
use crate::landmark::point::{Landmark, hand};
use serde::{Deserialize, Serialize};

/// How a body part's landmarks are turned into a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeSpec {
    /// Landmark moved to the origin.
    pub origin: usize,
    /// Landmark whose distance from `origin` becomes 1.0.
    pub reference: usize,
    /// Subtract the origin landmark from every point.
    pub translate: bool,
    /// Divide by the origin→reference distance.
    pub scale: bool,
}

impl NormalizeSpec {
    /// Wrist at origin, wrist→middle-finger MCP distance as unit.
    pub const HAND: Self = Self {
        origin: hand::WRIST,
        reference: hand::MIDDLE_MCP,
        translate: true,
        scale: true,
    };

    /// Left mouth corner at origin, mouth width as unit.
    ///
    /// Positions refer to [`crate::landmark::LIP_MESH_INDICES`]: 0 is mesh point 61,
    /// 10 is mesh point 291.
    pub const LIPS: Self = Self {
        origin: 0,
        reference: 10,
        translate: true,
        scale: true,
    };

    /// Plain flattening with no translation or scaling.
    pub const fn raw() -> Self {
        Self {
            origin: 0,
            reference: 0,
            translate: false,
            scale: false,
        }
    }
}

/// Flatten landmarks into `[x0, y0, z0, x1, ...]`, centered and scaled per `spec`.
///
/// Returns an empty vector for an empty observation; callers must treat that as
/// "nothing observed" rather than classify it. An out-of-range origin or
/// reference index disables the corresponding step.
pub fn normalize(landmarks: &[Landmark], spec: &NormalizeSpec) -> Vec<f32> {
    if landmarks.is_empty() {
        return Vec::new();
    }

    let origin = landmarks
        .get(spec.origin)
        .copied()
        .filter(|_| spec.translate)
        .unwrap_or_default();

    let scale = match (spec.scale, landmarks.get(spec.origin), landmarks.get(spec.reference)) {
        (true, Some(o), Some(r)) => o.distance(r).max(defaults::NORMALIZE_EPSILON),
        _ => 1.0,
    };

    let mut features = Vec::with_capacity(landmarks.len() * 3);
    for lm in landmarks {
        features.push((lm.x - origin.x) / scale);
        features.push((lm.y - origin.y) / scale);
        features.push((lm.z - origin.z) / scale);
    }
    features
}
