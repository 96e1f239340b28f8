//! Rule-based gesture overrides evaluated on raw landmarks.
//!
//! A matching rule forces a label, but the forced label still goes through the
//! stabilizer like any prediction, so a single stray frame cannot type anything.

use crate::defaults;
use crate::landmark::{Landmark, hand};

/// A rule that recognizes a gesture directly from landmark geometry.
pub trait OverrideRule: Send + Sync {
    /// True when the gesture is present in this observation.
    fn matches(&self, landmarks: &[Landmark]) -> bool;

    /// Label forced when the rule matches.
    fn label(&self) -> usize;

    /// Name for logging/diagnostics.
    fn name(&self) -> &'static str;
}

/// A rule that fired on the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideHit {
    pub label: usize,
    pub rule: &'static str,
}

/// Open palm with the thumb out ⇒ space.
///
/// All four must hold, in image coordinates (y grows downward):
/// - every non-thumb fingertip above its knuckle (MCP),
/// - thumb tip horizontally further than `thumb_offset` from the thumb MCP,
/// - middle fingertip above the wrist.
pub fn is_open_palm(landmarks: &[Landmark], thumb_offset: f32) -> bool {
    if landmarks.len() < defaults::HAND_LANDMARK_COUNT {
        return false;
    }

    let fingers_up = hand::FINGERS
        .iter()
        .all(|&(tip, _, mcp)| landmarks[tip].y < landmarks[mcp].y);
    let thumb_out =
        (landmarks[hand::THUMB_TIP].x - landmarks[hand::THUMB_MCP].x).abs() > thumb_offset;
    let hand_up = landmarks[hand::MIDDLE_TIP].y < landmarks[hand::WRIST].y;

    fingers_up && thumb_out && hand_up
}

pub struct OpenPalmRule {
    space_label: usize,
    thumb_offset: f32,
}

impl OpenPalmRule {
    pub fn new(space_label: usize, thumb_offset: f32) -> Self {
        Self {
            space_label,
            thumb_offset,
        }
    }
}

impl OverrideRule for OpenPalmRule {
    fn matches(&self, landmarks: &[Landmark]) -> bool {
        is_open_palm(landmarks, self.thumb_offset)
    }

    fn label(&self) -> usize {
        self.space_label
    }

    fn name(&self) -> &'static str {
        "open-palm-space"
    }
}

/// Ordered rule set; the first match wins.
#[derive(Default)]
pub struct Overrides {
    rules: Vec<Box<dyn OverrideRule>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: Box<dyn OverrideRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(&self, landmarks: &[Landmark]) -> Option<OverrideHit> {
        self.rules
            .iter()
            .find(|rule| rule.matches(landmarks))
            .map(|rule| OverrideHit {
                label: rule.label(),
                rule: rule.name(),
            })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Upright open hand: fingers spread above the knuckles, thumb out to the side.
    pub fn open_palm() -> Vec<Landmark> {
        let mut lms = vec![Landmark::default(); 21];
        lms[hand::WRIST] = Landmark::new(0.50, 0.90, 0.0);
        lms[hand::THUMB_CMC] = Landmark::new(0.44, 0.84, 0.0);
        lms[hand::THUMB_MCP] = Landmark::new(0.40, 0.78, 0.0);
        lms[hand::THUMB_IP] = Landmark::new(0.36, 0.73, 0.0);
        lms[hand::THUMB_TIP] = Landmark::new(0.32, 0.69, 0.0);
        for (finger, x) in hand::FINGERS.iter().zip([0.44_f32, 0.50, 0.56, 0.61]) {
            let (tip, pip, mcp) = *finger;
            lms[mcp] = Landmark::new(x, 0.70, 0.0);
            lms[pip] = Landmark::new(x, 0.58, 0.0);
            lms[pip + 1] = Landmark::new(x, 0.51, 0.0);
            lms[tip] = Landmark::new(x, 0.45, 0.0);
        }
        lms
    }

    /// Closed fist: fingertips curled back below their middle joints, thumb tucked.
    pub fn fist() -> Vec<Landmark> {
        let mut lms = open_palm();
        lms[hand::THUMB_IP] = Landmark::new(0.45, 0.76, 0.0);
        lms[hand::THUMB_TIP] = Landmark::new(0.50, 0.74, 0.0);
        for (tip, pip, mcp) in hand::FINGERS {
            let x = lms[mcp].x;
            lms[pip] = Landmark::new(x, 0.64, 0.0);
            lms[pip + 1] = Landmark::new(x, 0.70, 0.0);
            lms[tip] = Landmark::new(x, 0.74, 0.0);
        }
        lms
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{fist, open_palm};
    use super::*;

    #[test]
    fn test_open_palm_matches() {
        assert!(is_open_palm(&open_palm(), 0.03));
    }

    #[test]
    fn test_fist_does_not_match() {
        assert!(!is_open_palm(&fist(), 0.03));
    }

    #[test]
    fn test_tucked_thumb_blocks_rule() {
        let mut lms = open_palm();
        lms[hand::THUMB_TIP].x = lms[hand::THUMB_MCP].x + 0.01;
        assert!(!is_open_palm(&lms, 0.03));
    }

    #[test]
    fn test_single_curled_finger_blocks_rule() {
        let mut lms = open_palm();
        lms[hand::RING_TIP].y = lms[hand::RING_MCP].y + 0.02;
        assert!(!is_open_palm(&lms, 0.03));
    }

    #[test]
    fn test_inverted_hand_blocks_rule() {
        // Same shape but pointing down: middle tip below the wrist.
        let mut lms = open_palm();
        lms[hand::WRIST].y = 0.30;
        assert!(!is_open_palm(&lms, 0.03));
    }

    #[test]
    fn test_short_observation_never_matches() {
        assert!(!is_open_palm(&open_palm()[..10], 0.03));
        assert!(!is_open_palm(&[], 0.03));
    }

    #[test]
    fn test_overrides_report_first_hit() {
        let overrides = Overrides::new().with_rule(Box::new(OpenPalmRule::new(36, 0.03)));
        assert_eq!(
            overrides.evaluate(&open_palm()),
            Some(OverrideHit {
                label: 36,
                rule: "open-palm-space"
            })
        );
        assert_eq!(overrides.evaluate(&fist()), None);
        assert!(Overrides::new().evaluate(&open_palm()).is_none());
    }
}
