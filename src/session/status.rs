use crate::classify::Role;
use crate::landmark::{BodyPart, Handedness};
use std::fmt;

/// What a session is doing, shown to the user after every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Nothing tracked in this frame.
    Searching(BodyPart),
    /// Collecting frames for a sequence model.
    Buffering { have: usize, need: usize },
    /// The classifier is not available.
    ModelNotLoaded,
    /// The observed hand only believed in the other hand's labels.
    WrongRole { hand: Handedness, role: Role },
    /// The prediction was too weak to vote.
    LowConfidence(f32),
    /// Voting, no stable symbol yet.
    Analyzing(f32),
    /// A new symbol is waiting out the cooldown.
    CoolingDown(String),
    /// The symbol currently held.
    Stable(String),
}

impl Status {
    /// True when no body part was found in the frame.
    pub fn is_searching(&self) -> bool {
        matches!(self, Status::Searching(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Searching(part) => write!(f, "Finding {part}"),
            Status::Buffering { have, need } => write!(f, "Buffering ({have}/{need})"),
            Status::ModelNotLoaded => write!(f, "Model not loaded"),
            Status::WrongRole { hand, role } => {
                write!(f, "Wrong Hand ({hand} hand signs {role})")
            }
            Status::LowConfidence(c) => write!(f, "Low Confidence ({c:.2})"),
            Status::Analyzing(c) => write!(f, "Analyzing ({c:.2})"),
            Status::CoolingDown(symbol) => write!(f, "Cooling Down ({symbol})"),
            Status::Stable(symbol) => write!(f, "Stable: {symbol}"),
        }
    }
}
