use crate::stabilizer::window::VoteWindow;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One per-frame prediction offered to the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub label: usize,
    pub confidence: f32,
    /// Set by override gestures: always admitted regardless of confidence.
    pub forced: bool,
}

impl Sample {
    pub fn new(label: usize, confidence: f32) -> Self {
        Self {
            label,
            confidence,
            forced: false,
        }
    }

    /// A rule-forced sample with full confidence.
    pub fn forced(label: usize) -> Self {
        Self {
            label,
            confidence: 1.0,
            forced: true,
        }
    }
}

/// Coarse lifecycle of a stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No votes and nothing emitted since the last reset.
    Empty,
    /// Collecting votes, nothing emitted yet.
    Accumulating,
    /// A label has been emitted and is being held.
    Stable,
}

/// Everything one stabilizer remembers between frames.
///
/// The emission instant is process-local and never serialized; a restored
/// state therefore treats any cooldown as elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizerState {
    pub(crate) window: VoteWindow,
    pub(crate) last_emitted: Option<usize>,
    #[serde(skip)]
    pub(crate) last_emission: Option<Instant>,
}

impl StabilizerState {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            window: VoteWindow::new(window_capacity),
            last_emitted: None,
            last_emission: None,
        }
    }

    pub fn window(&self) -> &VoteWindow {
        &self.window
    }

    pub fn last_emitted(&self) -> Option<usize> {
        self.last_emitted
    }

    pub fn phase(&self) -> Phase {
        if self.last_emitted.is_some() {
            Phase::Stable
        } else if self.window.is_empty() {
            Phase::Empty
        } else {
            Phase::Accumulating
        }
    }

    /// Time left before a different label may be emitted, if any.
    pub fn cooldown_remaining(&self, now: Instant, cooldown: Duration) -> Option<Duration> {
        let since = now.saturating_duration_since(self.last_emission?);
        cooldown.checked_sub(since).filter(|d| !d.is_zero())
    }
}

/// Outcome of one stabilizer update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Tracking was lost; votes were dropped.
    Reset,
    /// The window is not full yet.
    Accumulating { votes: usize, capacity: usize },
    /// The window is full but no label reached the consensus count.
    NoConsensus { leader: usize, count: usize },
    /// A new stable label was emitted.
    Emitted { label: usize, count: usize },
    /// Consensus on the label already emitted; nothing new to type.
    Holding { label: usize },
    /// A different label reached consensus inside the cooldown.
    CoolingDown { candidate: usize, remaining: Duration },
}

impl Decision {
    /// The freshly emitted label, if this update produced one.
    pub fn emitted(&self) -> Option<usize> {
        match self {
            Decision::Emitted { label, .. } => Some(*label),
            _ => None,
        }
    }
}
