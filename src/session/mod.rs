//! Per-caller prediction session: one frame in, one [`PredictionResult`] out.
//!
//! A session owns the only mutable state in the system (votes, cooldown and
//! the rolling feature buffer). Nothing is shared between sessions.

mod buffer;
mod status;
mod types;

pub use buffer::FeatureBuffer;
pub use status::Status;
pub use types::{Frame, PredictionResult};

use crate::classify::{
    Classification, Classifier, ClassifierAdapter, LabelSet, Role, top_label,
};
use crate::config::{LipConfig, SignConfig};
use crate::error::{Result, TalkifyError};
use crate::heuristics::{OpenPalmRule, Overrides};
use crate::landmark::{BodyPart, Detection, NormalizeSpec, Region, normalize};
use crate::stabilizer::{Clock, Decision, Sample, Stabilizer, StabilizerState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Static description of what a session tracks and how it builds features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProfile {
    pub part: BodyPart,
    pub normalize: NormalizeSpec,
    /// Frames stacked into one classifier input.
    pub sequence_length: usize,
    /// Overlay padding in pixels.
    pub region_padding: u32,
}

impl SessionProfile {
    /// Classifier input length this profile produces.
    pub fn input_dim(&self) -> usize {
        self.sequence_length.max(1) * self.part.feature_len()
    }
}

/// Mutable per-session state. Serializable so a caller can park and resume a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub stabilizer: StabilizerState,
    pub features: FeatureBuffer,
    /// Frames processed so far.
    pub frames: u64,
}

pub struct Session {
    profile: SessionProfile,
    adapter: ClassifierAdapter,
    overrides: Overrides,
    stabilizer: Stabilizer,
    state: SessionState,
}

impl Session {
    /// Assemble a session, checking that the classifier accepts what the profile produces.
    pub fn new(
        profile: SessionProfile,
        adapter: ClassifierAdapter,
        overrides: Overrides,
        stabilizer: Stabilizer,
    ) -> Result<Self> {
        stabilizer.config().validate(profile.part.config_section())?;

        let produced = profile.input_dim();
        if adapter.input_dim() != produced {
            return Err(TalkifyError::FeatureShape {
                expected: adapter.input_dim(),
                actual: produced,
            });
        }

        let state = SessionState {
            stabilizer: stabilizer.initial_state(),
            features: FeatureBuffer::new(profile.part.feature_len(), profile.sequence_length),
            frames: 0,
        };
        Ok(Self {
            profile,
            adapter,
            overrides,
            stabilizer,
            state,
        })
    }

    /// Fingerspelling session over the `0-9, A-Z, _` label set.
    pub fn sign(config: &SignConfig, classifier: Arc<dyn Classifier>) -> Result<Self> {
        let labels = LabelSet::sign();
        let mut overrides = Overrides::new();
        if config.open_palm_override
            && let Some(space) = labels.space_index()
        {
            overrides = overrides.with_rule(Box::new(OpenPalmRule::new(space, config.thumb_offset)));
        }

        let mut adapter = ClassifierAdapter::new(classifier, labels);
        if config.role_masking {
            adapter = adapter.with_role_masking(config.role_mass_floor);
        }

        let profile = SessionProfile {
            part: BodyPart::Hand,
            normalize: NormalizeSpec::HAND,
            sequence_length: config.sequence_length,
            region_padding: config.region_padding,
        };
        Self::new(profile, adapter, overrides, Stabilizer::new(config.stabilizer))
    }

    /// Lip-word session over a rolling sequence of lip frames.
    pub fn lip(config: &LipConfig, classifier: Arc<dyn Classifier>) -> Result<Self> {
        let profile = SessionProfile {
            part: BodyPart::Face,
            normalize: if config.normalize {
                NormalizeSpec::LIPS
            } else {
                NormalizeSpec::raw()
            },
            sequence_length: config.sequence_length,
            region_padding: config.region_padding,
        };
        Self::new(
            profile,
            ClassifierAdapter::new(classifier, LabelSet::lip()),
            Overrides::new(),
            Stabilizer::new(config.stabilizer),
        )
    }

    /// Replace the stabilizer's time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stabilizer = Stabilizer::new(*self.stabilizer.config()).with_clock(clock);
        self
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn labels(&self) -> &LabelSet {
        self.adapter.labels()
    }

    pub fn model_name(&self) -> &str {
        self.adapter.model_name()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Resume from a previously saved state.
    ///
    /// The state must have been parked by a session with the same window
    /// capacity and feature layout.
    pub fn restore(&mut self, state: SessionState) -> Result<()> {
        let section = self.profile.part.config_section();
        let invalid = |key: &str, expected: usize, actual: usize| TalkifyError::ConfigInvalidValue {
            key: format!("{section}.{key}"),
            message: format!("saved state has {actual}, session expects {expected}"),
        };

        let capacity = self.stabilizer.config().window_capacity;
        if state.stabilizer.window().capacity() != capacity {
            return Err(invalid(
                "stabilizer.window_capacity",
                capacity,
                state.stabilizer.window().capacity(),
            ));
        }
        let frame_dim = self.profile.part.feature_len();
        if state.features.frame_dim() != frame_dim {
            return Err(invalid("frame_dim", frame_dim, state.features.frame_dim()));
        }
        let sequence_length = self.profile.sequence_length.max(1);
        if state.features.sequence_length() != sequence_length {
            return Err(invalid(
                "sequence_length",
                sequence_length,
                state.features.sequence_length(),
            ));
        }

        self.state = state;
        Ok(())
    }

    /// Forget all votes and buffered frames.
    pub fn reset(&mut self) {
        self.stabilizer.update(&mut self.state.stabilizer, None);
        self.state.features.clear();
    }

    /// Run one frame through normalization, classification and the stabilizer.
    ///
    /// Only contract violations (feature or output length disagreeing with the
    /// model) are errors; state is left untouched when one occurs.
    pub fn process(&mut self, frame: &Frame) -> Result<PredictionResult> {
        let Some(detection) = frame
            .detection
            .as_ref()
            .filter(|d| d.part == self.profile.part && !d.landmarks.is_empty())
        else {
            self.reset();
            self.state.frames += 1;
            return Ok(PredictionResult::status_only(Status::Searching(self.profile.part)));
        };

        let (text, status) = self.step(detection)?;
        self.state.frames += 1;
        Ok(PredictionResult {
            text,
            status,
            landmarks: detection.landmarks.clone(),
            region: Region::from_landmarks(
                &detection.landmarks,
                frame.width,
                frame.height,
                self.profile.region_padding,
            ),
        })
    }

    fn step(&mut self, detection: &Detection) -> Result<(String, Status)> {
        let features = normalize(&detection.landmarks, &self.profile.normalize);
        let frame_dim = self.profile.part.feature_len();
        if features.len() != frame_dim {
            return Err(TalkifyError::FeatureShape {
                expected: frame_dim,
                actual: features.len(),
            });
        }

        let mut next = self.state.clone();
        next.features.push(features);

        let role = detection
            .handedness
            .filter(|_| self.adapter.masks_roles())
            .map(Role::for_hand);

        let hit = self
            .overrides
            .evaluate(&detection.landmarks)
            .filter(|hit| role.is_none_or(|r| self.adapter.allows(r, hit.label)));

        let sample = match hit {
            Some(hit) => {
                tracing::debug!(rule = hit.rule, label = hit.label, "override fired");
                Sample::forced(hit.label)
            }
            None => {
                if !next.features.is_ready() {
                    let status = Status::Buffering {
                        have: next.features.len(),
                        need: next.features.sequence_length(),
                    };
                    self.state = next;
                    return Ok((String::new(), status));
                }

                match self.adapter.classify(&next.features.flatten(), role)? {
                    Classification::Distribution(probabilities) => {
                        match top_label(&probabilities) {
                            Some((label, confidence)) => Sample::new(label, confidence),
                            None => {
                                self.state = next;
                                return Ok((String::new(), Status::ModelNotLoaded));
                            }
                        }
                    }
                    Classification::Unavailable => {
                        self.state = next;
                        return Ok((String::new(), Status::ModelNotLoaded));
                    }
                    Classification::WrongRole(role) => {
                        // Counts as a rejected sample: ages out one old vote.
                        self.stabilizer
                            .update(&mut next.stabilizer, Some(Sample::new(0, 0.0)));
                        self.state = next;
                        return Ok((
                            String::new(),
                            Status::WrongRole {
                                hand: role.hand(),
                                role,
                            },
                        ));
                    }
                }
            }
        };

        let admitted = self.stabilizer.admits(&sample);
        let decision = self.stabilizer.update(&mut next.stabilizer, Some(sample));
        self.state = next;

        let result = match decision {
            Decision::Emitted { label, count } => {
                let text = self.labels().text_for(label).unwrap_or_default().to_string();
                tracing::info!(
                    symbol = %self.symbol(label),
                    votes = count,
                    forced = sample.forced,
                    "emitted"
                );
                (text, Status::Stable(self.symbol(label)))
            }
            Decision::Holding { label } => (String::new(), Status::Stable(self.symbol(label))),
            Decision::CoolingDown { candidate, .. } => {
                (String::new(), Status::CoolingDown(self.symbol(candidate)))
            }
            Decision::Accumulating { .. } | Decision::NoConsensus { .. } | Decision::Reset => {
                let status = if admitted {
                    Status::Analyzing(sample.confidence)
                } else {
                    Status::LowConfidence(sample.confidence)
                };
                (String::new(), status)
            }
        };
        Ok(result)
    }

    fn symbol(&self, label: usize) -> String {
        self.labels().symbol(label).unwrap_or("?").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{MockClassifier, peaked_distribution};
    use crate::heuristics::fixtures::{fist, open_palm};
    use crate::landmark::{Handedness, Landmark};
    use crate::stabilizer::{ManualClock, StabilizerConfig};
    use std::time::Duration;

    fn hand_frame(handedness: Option<Handedness>) -> Frame {
        Frame::new(640, 480, Some(Detection::hand(fist(), handedness)))
    }

    fn sign_session(mock: MockClassifier, config: SignConfig) -> (Session, ManualClock) {
        let clock = ManualClock::new();
        let session = Session::sign(&config, Arc::new(mock))
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        (session, clock)
    }

    fn small_config() -> SignConfig {
        SignConfig {
            stabilizer: StabilizerConfig {
                window_capacity: 3,
                consensus_count: 2,
                ..StabilizerConfig::sign()
            },
            ..SignConfig::default()
        }
    }

    #[test]
    fn test_mismatched_classifier_is_rejected_at_construction() {
        let result = Session::sign(
            &SignConfig::default(),
            Arc::new(MockClassifier::new("m", 60, 37)),
        );
        assert!(matches!(
            result,
            Err(TalkifyError::FeatureShape {
                expected: 60,
                actual: 63
            })
        ));
    }

    #[test]
    fn test_no_detection_reports_searching() {
        let (mut session, _) = sign_session(MockClassifier::new("m", 63, 37), small_config());
        let result = session.process(&Frame::empty(640, 480)).unwrap();
        assert_eq!(result.status, Status::Searching(BodyPart::Hand));
        assert!(result.text.is_empty());
        assert!(result.landmarks.is_empty());
        assert_eq!(result.region, None);
    }

    #[test]
    fn test_face_detection_is_ignored_by_sign_session() {
        let (mut session, _) = sign_session(MockClassifier::new("m", 63, 37), small_config());
        let frame = Frame::new(640, 480, Some(Detection::face(fist())));
        assert!(session.process(&frame).unwrap().status.is_searching());
    }

    #[test]
    fn test_emits_letter_once_per_gesture() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(10, 0.9);
        let (mut session, _) = sign_session(mock, small_config());
        let frame = hand_frame(Some(Handedness::Right));

        let texts: Vec<String> = (0..6)
            .map(|_| session.process(&frame).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["", "", "A", "", "", ""]);
        assert_eq!(
            session.process(&frame).unwrap().status,
            Status::Stable("A".to_string())
        );
    }

    #[test]
    fn test_low_confidence_status() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(10, 0.4);
        let (mut session, _) = sign_session(mock, small_config());
        let result = session.process(&hand_frame(None)).unwrap();
        assert!(matches!(result.status, Status::LowConfidence(c) if (c - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_unloaded_model_status() {
        let mock = MockClassifier::new("m", 63, 37).unloaded();
        let (mut session, _) = sign_session(mock, small_config());
        let result = session.process(&hand_frame(None)).unwrap();
        assert_eq!(result.status, Status::ModelNotLoaded);
        assert!(result.text.is_empty());
        assert!(!result.landmarks.is_empty());
        assert!(result.region.is_some());
    }

    #[test]
    fn test_open_palm_types_space_through_stabilizer() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(10, 0.9);
        let (mut session, _) = sign_session(mock, small_config());
        let frame = Frame::new(640, 480, Some(Detection::hand(open_palm(), Some(Handedness::Right))));

        assert_eq!(session.process(&frame).unwrap().text, "");
        assert_eq!(session.process(&frame).unwrap().text, "");
        let result = session.process(&frame).unwrap();
        assert_eq!(result.text, " ");
        assert_eq!(result.status, Status::Stable("_".to_string()));
    }

    #[test]
    fn test_open_palm_ignored_for_digit_hand() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(5, 0.9);
        let (mut session, _) = sign_session(mock, small_config());
        let frame = Frame::new(640, 480, Some(Detection::hand(open_palm(), Some(Handedness::Left))));

        let texts: Vec<String> = (0..3)
            .map(|_| session.process(&frame).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["", "", "5"]);
    }

    #[test]
    fn test_cooldown_status_between_letters() {
        let mock = MockClassifier::new("m", 63, 37).with_script(
            std::iter::repeat_n(peaked_distribution(37, 10, 0.9), 3)
                .chain(std::iter::repeat_n(peaked_distribution(37, 11, 0.9), 3))
                .collect(),
        );
        let (mut session, clock) = sign_session(mock, small_config());
        let frame = hand_frame(Some(Handedness::Right));
        for _ in 0..3 {
            session.process(&frame).unwrap();
        }
        clock.advance(Duration::from_millis(100));
        session.process(&frame).unwrap();
        session.process(&frame).unwrap();
        let result = session.process(&frame).unwrap();
        assert_eq!(result.status, Status::CoolingDown("B".to_string()));
    }

    #[test]
    fn test_output_shape_error_leaves_state_untouched() {
        let mock = MockClassifier::new("m", 63, 37)
            .with_peak(10, 0.9)
            .with_script(vec![vec![1.0; 5]]);
        let (mut session, _) = sign_session(mock, small_config());
        let before = session.state().stabilizer.clone();
        assert!(matches!(
            session.process(&hand_frame(None)),
            Err(TalkifyError::OutputShape { .. })
        ));
        assert_eq!(session.state().stabilizer, before);
        assert!(session.state().features.is_empty());
    }

    #[test]
    fn test_wrong_landmark_count_is_shape_error() {
        let (mut session, _) = sign_session(MockClassifier::new("m", 63, 37), small_config());
        let frame = Frame::new(640, 480, Some(Detection::hand(vec![Landmark::default(); 5], None)));
        assert!(matches!(
            session.process(&frame),
            Err(TalkifyError::FeatureShape {
                expected: 63,
                actual: 15
            })
        ));
    }

    #[test]
    fn test_lip_session_buffers_then_classifies() {
        let mut lips = vec![Landmark::new(0.4, 0.6, 0.0); 21];
        lips[10] = Landmark::new(0.6, 0.6, 0.0);
        let mock = MockClassifier::new("lip", 15 * 63, 10).with_peak(0, 0.95);
        let config = LipConfig::default();
        let mut session = Session::lip(&config, Arc::new(mock)).unwrap();
        let frame = Frame::new(640, 480, Some(Detection::face(lips)));

        for n in 1..15 {
            let result = session.process(&frame).unwrap();
            assert_eq!(result.status, Status::Buffering { have: n, need: 15 });
        }
        // Sequence full: votes start; 3 of 4 needed.
        let texts: Vec<String> = (0..4)
            .map(|_| session.process(&frame).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["", "", "", "hello"]);

        let lost = session.process(&Frame::empty(640, 480)).unwrap();
        assert_eq!(lost.status.to_string(), "Finding Face");
        assert!(session.state().features.is_empty());
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(10, 0.9);
        let (mut session, _) = sign_session(mock, small_config());
        session.process(&hand_frame(None)).unwrap();

        let json = serde_json::to_string(session.state()).unwrap();
        let restored: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.stabilizer.window().len(), 1);
        assert_eq!(restored.frames, 1);
        session.restore(restored).unwrap();
        assert_eq!(session.state().frames, 1);
    }

    #[test]
    fn test_restore_rejects_state_from_smaller_window() {
        let mock = || MockClassifier::new("m", 63, 37).with_peak(10, 0.9);
        let (mut small, _) = sign_session(mock(), small_config());
        small.process(&hand_frame(None)).unwrap();
        let parked = small.state().clone();

        let (mut session, _) = sign_session(mock(), SignConfig::default());
        let before = session.state().clone();
        match session.restore(parked) {
            Err(TalkifyError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "sign.stabilizer.window_capacity");
            }
            other => panic!("expected ConfigInvalidValue, got {other:?}"),
        }
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_restore_rejects_foreign_feature_layout() {
        let (mut session, _) = sign_session(MockClassifier::new("m", 63, 37), small_config());
        let mut parked = session.state().clone();
        parked.features = FeatureBuffer::new(63, 15);
        assert!(matches!(
            session.restore(parked.clone()),
            Err(TalkifyError::ConfigInvalidValue { ref key, .. }) if key == "sign.sequence_length"
        ));

        parked.features = FeatureBuffer::new(60, 1);
        assert!(matches!(
            session.restore(parked),
            Err(TalkifyError::ConfigInvalidValue { ref key, .. }) if key == "sign.frame_dim"
        ));
    }

    #[test]
    fn test_invalid_stabilizer_config_is_rejected_at_construction() {
        let config = SignConfig {
            stabilizer: StabilizerConfig {
                window_capacity: 0,
                ..StabilizerConfig::sign()
            },
            ..SignConfig::default()
        };
        let result = Session::sign(&config, Arc::new(MockClassifier::new("m", 63, 37)));
        assert!(matches!(
            result,
            Err(TalkifyError::ConfigInvalidValue { ref key, .. }) if key == "sign.stabilizer.window_capacity"
        ));
    }

    #[test]
    fn test_shape_error_does_not_count_frame() {
        let (mut session, _) = sign_session(MockClassifier::new("m", 63, 37), small_config());
        let frame = Frame::new(640, 480, Some(Detection::hand(vec![Landmark::default(); 5], None)));
        assert!(session.process(&frame).is_err());
        assert_eq!(session.state().frames, 0);

        session.process(&Frame::empty(640, 480)).unwrap();
        assert_eq!(session.state().frames, 1);
    }
}
