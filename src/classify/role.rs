//! Hand-role masking: the left hand signs digits, the right hand signs letters.

use crate::classify::labels::LabelSet;
use crate::landmark::Handedness;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label subset a physical hand is allowed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Digits,
    Alphabet,
}

impl Role {
    pub fn for_hand(hand: Handedness) -> Self {
        match hand {
            Handedness::Left => Role::Digits,
            Handedness::Right => Role::Alphabet,
        }
    }

    pub fn hand(self) -> Handedness {
        match self {
            Role::Digits => Handedness::Left,
            Role::Alphabet => Handedness::Right,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Digits => write!(f, "digits"),
            Role::Alphabet => write!(f, "letters"),
        }
    }
}

/// Per-role allow-lists, built once from a label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMasks {
    digits: Vec<bool>,
    alphabet: Vec<bool>,
}

impl RoleMasks {
    pub fn for_labels(labels: &LabelSet) -> Self {
        let digits = (0..labels.len()).map(|i| labels.is_digit(i)).collect();
        let alphabet = (0..labels.len())
            .map(|i| labels.is_letter(i) || labels.is_space(i))
            .collect();
        Self { digits, alphabet }
    }

    fn mask(&self, role: Role) -> &[bool] {
        match role {
            Role::Digits => &self.digits,
            Role::Alphabet => &self.alphabet,
        }
    }

    pub fn allows(&self, role: Role, index: usize) -> bool {
        self.mask(role).get(index).copied().unwrap_or(false)
    }

    pub fn allowed(&self, role: Role) -> impl Iterator<Item = usize> + '_ {
        self.mask(role)
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
    }

    /// Zero disallowed labels and renormalize the rest to sum to 1.
    ///
    /// Returns `None` when the allowed labels together hold less than
    /// `mass_floor` of the distribution: the model believed in the other
    /// hand's labels.
    pub fn apply(&self, role: Role, probabilities: &[f32], mass_floor: f32) -> Option<Vec<f32>> {
        let mask = self.mask(role);
        let allowed_mass: f32 = probabilities
            .iter()
            .zip(mask)
            .filter_map(|(p, &ok)| ok.then_some(*p))
            .sum();

        if allowed_mass <= 0.0 || allowed_mass < mass_floor {
            return None;
        }

        Some(
            probabilities
                .iter()
                .zip(mask)
                .map(|(p, &ok)| if ok { p / allowed_mass } else { 0.0 })
                .collect(),
        )
    }
}
