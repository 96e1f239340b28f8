//! Overlay rectangle derived from landmark extents.

use crate::landmark::point::Landmark;
use serde::{Deserialize, Serialize};

/// Pixel-space bounding box, serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    /// Extents of `landmarks` in a `width`×`height` frame, grown by `padding`
    /// pixels and clamped to the frame.
    ///
    /// Returns `None` for no landmarks, an empty frame, or a box that collapses
    /// to nothing after clamping (landmarks entirely off-frame).
    pub fn from_landmarks(
        landmarks: &[Landmark],
        width: u32,
        height: u32,
        padding: u32,
    ) -> Option<Self> {
        if landmarks.is_empty() || width == 0 || height == 0 {
            return None;
        }

        let (w, h) = (width as f32, height as f32);
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for lm in landmarks {
            let px = (lm.x * w) as i32;
            let py = (lm.y * h) as i32;
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }

        let pad = padding as i32;
        let (w, h) = (width as i32, height as i32);
        let region = Self {
            x1: min_x.saturating_sub(pad).clamp(0, w),
            y1: min_y.saturating_sub(pad).clamp(0, h),
            x2: max_x.saturating_add(pad).clamp(0, w),
            y2: max_y.saturating_add(pad).clamp(0, h),
        };

        (region.width() > 0 && region.height() > 0).then_some(region)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

impl From<[i32; 4]> for Region {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<Region> for [i32; 4] {
    fn from(r: Region) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_extents() {
        let lms = vec![Landmark::new(0.25, 0.25, 0.0), Landmark::new(0.5, 0.75, 0.0)];
        let region = Region::from_landmarks(&lms, 640, 480, 20).unwrap();
        assert_eq!(
            region,
            Region {
                x1: 140,
                y1: 100,
                x2: 340,
                y2: 380
            }
        );
    }

    #[test]
    fn test_clamped_to_frame() {
        let lms = vec![Landmark::new(0.01, 0.02, 0.0), Landmark::new(0.99, 0.98, 0.0)];
        let region = Region::from_landmarks(&lms, 100, 100, 20).unwrap();
        assert_eq!(<[i32; 4]>::from(region), [0, 0, 100, 100]);
    }

    #[test]
    fn test_empty_landmarks_has_no_region() {
        assert!(Region::from_landmarks(&[], 640, 480, 20).is_none());
    }

    #[test]
    fn test_zero_sized_frame_has_no_region() {
        let lms = vec![Landmark::new(0.5, 0.5, 0.0)];
        assert!(Region::from_landmarks(&lms, 0, 480, 20).is_none());
    }

    #[test]
    fn test_off_frame_landmarks_collapse() {
        let lms = vec![Landmark::new(2.0, 2.0, 0.0), Landmark::new(2.5, 2.5, 0.0)];
        assert!(Region::from_landmarks(&lms, 100, 100, 20).is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let region = Region {
            x1: 1,
            y1: 2,
            x2: 3,
            y2: 4,
        };
        assert_eq!(serde_json::to_string(&region).unwrap(), "[1,2,3,4]");
        let parsed: Region = serde_json::from_str("[5,6,7,8]").unwrap();
        assert_eq!(parsed.width(), 2);
        assert_eq!(parsed.height(), 2);
    }
}
