//! Geometry-only fallback classifier for the sign label set.
//!
//! Used when no trained model is available: counts extended fingers for
//! digits and matches a handful of static letter shapes.

use crate::classify::classifier::Classifier;
use crate::classify::labels::LabelSet;
use crate::defaults;
use crate::error::{Result, TalkifyError};
use crate::landmark::hand;

const FRAME_LEN: usize = 3 * defaults::HAND_LANDMARK_COUNT;

/// Which fingers are extended in one hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    /// Read a pose from one normalized hand frame (`x, y, z` per landmark).
    pub fn from_features(frame: &[f32]) -> Option<Self> {
        if frame.len() < FRAME_LEN {
            return None;
        }
        let point = |i: usize| [frame[3 * i], frame[3 * i + 1], frame[3 * i + 2]];
        let dist = |a: usize, b: usize| {
            let (p, q) = (point(a), point(b));
            p.iter()
                .zip(q.iter())
                .map(|(u, v)| (u - v) * (u - v))
                .sum::<f32>()
                .sqrt()
        };

        // A finger is out when its tip sits further from the wrist than its middle joint.
        let extended = |(tip, pip, _mcp): (usize, usize, usize)| {
            dist(tip, hand::WRIST) > dist(pip, hand::WRIST)
        };
        let [index, middle, ring, pinky] = hand::FINGERS.map(extended);
        let thumb = dist(hand::THUMB_TIP, hand::PINKY_MCP) > dist(hand::THUMB_IP, hand::PINKY_MCP);

        Some(Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        })
    }

    pub fn extended_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&up| up)
            .count()
    }

    fn fingers(&self) -> [bool; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }
}

/// Static letter shapes: (letter, thumb, [index, middle, ring, pinky]).
const LETTER_SHAPES: [(&str, bool, [bool; 4]); 7] = [
    ("B", false, [true, true, true, true]),
    ("D", false, [true, false, false, false]),
    ("I", false, [false, false, false, true]),
    ("L", true, [true, false, false, false]),
    ("V", false, [true, true, false, false]),
    ("W", false, [true, true, true, false]),
    ("Y", true, [false, false, false, true]),
];

/// Rule-based [`Classifier`] over normalized hand features.
///
/// Puts 0.6 on the matching letter and 0.4 on the finger-count digit so an
/// unmasked frame prefers the letter; role masking picks the right one when
/// handedness is known. With no letter match the digit gets everything.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    input_dim: usize,
    label_count: usize,
    digits: [Option<usize>; 6],
    fist: Option<usize>,
    letters: Vec<(bool, [bool; 4], usize)>,
}

impl HeuristicClassifier {
    /// Build for `labels`, accepting `sequence_length` stacked frames (the last one is used).
    pub fn new(labels: &LabelSet, sequence_length: usize) -> Self {
        let digits = std::array::from_fn(|n| labels.index_of(&n.to_string()));
        let letters = LETTER_SHAPES
            .iter()
            .filter_map(|&(symbol, thumb, fingers)| {
                labels.index_of(symbol).map(|i| (thumb, fingers, i))
            })
            .collect();
        Self {
            input_dim: sequence_length.max(1) * FRAME_LEN,
            label_count: labels.len(),
            digits,
            fist: labels.index_of("A"),
            letters,
        }
    }

    fn letter_for(&self, state: &FingerState) -> Option<usize> {
        if state.fingers() == [false; 4] {
            return self.fist;
        }
        self.letters
            .iter()
            .find(|(thumb, fingers, _)| *thumb == state.thumb && *fingers == state.fingers())
            .map(|&(_, _, i)| i)
    }
}

impl Classifier for HeuristicClassifier {
    fn predict(&self, features: &[f32]) -> Result<Vec<f32>> {
        let frame = &features[features.len().saturating_sub(FRAME_LEN)..];
        let state = FingerState::from_features(frame).ok_or(TalkifyError::FeatureShape {
            expected: self.input_dim,
            actual: features.len(),
        })?;

        let mut probabilities = vec![0.0; self.label_count];
        let digit = self.digits[state.extended_count()];
        match (digit, self.letter_for(&state)) {
            (Some(d), Some(l)) => {
                probabilities[d] += 0.4;
                probabilities[l] += 0.6;
            }
            (Some(i), None) | (None, Some(i)) => probabilities[i] = 1.0,
            (None, None) => {
                return Err(TalkifyError::Inference {
                    message: "pose matches no label".to_string(),
                });
            }
        }
        Ok(probabilities)
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn model_name(&self) -> &str {
        "heuristic"
    }

    fn is_ready(&self) -> bool {
        true
    }
}
