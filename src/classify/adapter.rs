//! Wraps a black-box classifier with shape checks and role masking.

use crate::classify::classifier::Classifier;
use crate::classify::labels::LabelSet;
use crate::classify::role::{Role, RoleMasks};
use crate::defaults;
use crate::error::{Result, TalkifyError};
use std::sync::Arc;

/// Outcome of classifying one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Probabilities over the full label set, summing to 1.
    Distribution(Vec<f32>),
    /// The model is not loaded or failed for this frame.
    Unavailable,
    /// The masked distribution collapsed: the model only believed in labels
    /// the observed hand may not sign.
    WrongRole(Role),
}

/// Highest-probability label and its probability. Ties go to the lowest index.
pub fn top_label(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probabilities.iter().enumerate() {
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((i, p)),
        }
    }
    best
}

/// Feature-to-label adapter owned by a session.
pub struct ClassifierAdapter {
    classifier: Arc<dyn Classifier>,
    labels: LabelSet,
    masks: Option<RoleMasks>,
    role_mass_floor: f32,
}

impl ClassifierAdapter {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelSet) -> Self {
        Self {
            classifier,
            labels,
            masks: None,
            role_mass_floor: defaults::ROLE_MASS_FLOOR,
        }
    }

    /// Enable left/right role masking. Allow-lists are computed here, once.
    pub fn with_role_masking(mut self, mass_floor: f32) -> Self {
        self.masks = Some(RoleMasks::for_labels(&self.labels));
        self.role_mass_floor = mass_floor;
        self
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn input_dim(&self) -> usize {
        self.classifier.input_dim()
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn masks_roles(&self) -> bool {
        self.masks.is_some()
    }

    /// Whether `role` may produce `index`. Always true without masking.
    pub fn allows(&self, role: Role, index: usize) -> bool {
        self.masks
            .as_ref()
            .is_none_or(|masks| masks.allows(role, index))
    }

    /// Classify one feature vector, optionally restricted to `role`'s labels.
    ///
    /// A feature or output length that disagrees with the model is a contract
    /// violation and returns an error; every other failure degrades to
    /// [`Classification::Unavailable`].
    pub fn classify(&self, features: &[f32], role: Option<Role>) -> Result<Classification> {
        if !self.classifier.is_ready() {
            return Ok(Classification::Unavailable);
        }

        let expected = self.classifier.input_dim();
        if features.len() != expected {
            return Err(TalkifyError::FeatureShape {
                expected,
                actual: features.len(),
            });
        }

        let raw = match self.classifier.predict(features) {
            Ok(raw) => raw,
            Err(e) if e.is_contract_violation() => return Err(e),
            Err(e) => {
                tracing::warn!(model = self.classifier.model_name(), error = %e, "classifier failed, skipping frame");
                return Ok(Classification::Unavailable);
            }
        };

        if raw.len() != self.labels.len() {
            return Err(TalkifyError::OutputShape {
                expected: self.labels.len(),
                actual: raw.len(),
            });
        }

        let Some(probabilities) = sanitize(raw) else {
            tracing::warn!(
                model = self.classifier.model_name(),
                "classifier returned no probability mass"
            );
            return Ok(Classification::Unavailable);
        };

        match (role, &self.masks) {
            (Some(role), Some(masks)) => {
                match masks.apply(role, &probabilities, self.role_mass_floor) {
                    Some(masked) => Ok(Classification::Distribution(masked)),
                    None => Ok(Classification::WrongRole(role)),
                }
            }
            _ => Ok(Classification::Distribution(probabilities)),
        }
    }
}

/// Clamp negative and non-finite entries to zero and renormalize.
fn sanitize(mut probabilities: Vec<f32>) -> Option<Vec<f32>> {
    for p in &mut probabilities {
        if !p.is_finite() || *p < 0.0 {
            *p = 0.0;
        }
    }
    let total: f32 = probabilities.iter().sum();
    if total <= 0.0 {
        return None;
    }
    for p in &mut probabilities {
        *p /= total;
    }
    Some(probabilities)
}
