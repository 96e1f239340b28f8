//! Temporal stabilizer: turns noisy per-frame predictions into discrete symbols.
//!
//! Each update admits (or rejects) one sample into a bounded vote window,
//! checks for consensus once the window is full, and debounces emissions with
//! a cooldown so a held gesture types its symbol once.

mod clock;
mod state;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use state::{Decision, Phase, Sample, StabilizerState};
pub use window::VoteWindow;

use crate::defaults;
use crate::error::{Result, TalkifyError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What happens to the vote window once a symbol is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionPolicy {
    /// Drop all votes after an emission; the next symbol needs a fresh window.
    #[default]
    ClearOnEmit,
    /// Keep votes; consensus on the held label keeps refreshing the emission time.
    HoldRefresh,
}

/// Tuning for one stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Votes held in the sliding window.
    pub window_capacity: usize,
    /// Votes one label needs within a full window.
    pub consensus_count: usize,
    /// Samples must be strictly more confident than this to vote.
    pub admission_threshold: f32,
    /// Minimum time between two different emitted labels.
    pub cooldown_ms: u64,
    pub policy: EmissionPolicy,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self::sign()
    }
}

impl StabilizerConfig {
    /// Fingerspelling defaults: 7 of 10 votes, 500 ms cooldown.
    pub fn sign() -> Self {
        Self {
            window_capacity: defaults::SIGN_WINDOW_CAPACITY,
            consensus_count: defaults::SIGN_CONSENSUS_COUNT,
            admission_threshold: defaults::ADMISSION_THRESHOLD,
            cooldown_ms: defaults::COOLDOWN_MS,
            policy: EmissionPolicy::default(),
        }
    }

    /// Lip-word defaults: 3 of 4 votes.
    pub fn lip() -> Self {
        Self {
            window_capacity: defaults::LIP_WINDOW_CAPACITY,
            consensus_count: defaults::LIP_CONSENSUS_COUNT,
            ..Self::sign()
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Check ranges. `section` prefixes the key in error messages.
    pub fn validate(&self, section: &str) -> Result<()> {
        let invalid = |key: &str, message: String| TalkifyError::ConfigInvalidValue {
            key: format!("{section}.stabilizer.{key}"),
            message,
        };

        if self.window_capacity == 0 {
            return Err(invalid("window_capacity", "must be at least 1".to_string()));
        }
        if self.consensus_count == 0 || self.consensus_count > self.window_capacity {
            return Err(invalid(
                "consensus_count",
                format!(
                    "must be between 1 and window_capacity ({}), got {}",
                    self.window_capacity, self.consensus_count
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.admission_threshold) {
            return Err(invalid(
                "admission_threshold",
                format!("must be between 0.0 and 1.0, got {}", self.admission_threshold),
            ));
        }
        Ok(())
    }
}

/// Stateless decision logic; the state lives in [`StabilizerState`].
pub struct Stabilizer {
    config: StabilizerConfig,
    clock: Arc<dyn Clock>,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Fresh state sized for this stabilizer.
    pub fn initial_state(&self) -> StabilizerState {
        StabilizerState::new(self.config.window_capacity)
    }

    /// Whether `sample` would enter the vote window.
    pub fn admits(&self, sample: &Sample) -> bool {
        sample.forced || sample.confidence > self.config.admission_threshold
    }

    /// Feed one frame's sample (`None` when tracking was lost).
    ///
    /// The decision is computed on a copy and committed only once complete.
    pub fn update(&self, state: &mut StabilizerState, sample: Option<Sample>) -> Decision {
        let now = self.clock.now();
        let mut next = state.clone();
        let decision = self.decide(&mut next, sample, now);
        tracing::debug!(?decision, votes = next.window.len(), "stabilizer update");
        *state = next;
        decision
    }

    fn decide(&self, state: &mut StabilizerState, sample: Option<Sample>, now: Instant) -> Decision {
        let Some(sample) = sample else {
            // Keep the emission instant so the cooldown survives a brief dropout.
            state.window.clear();
            state.last_emitted = None;
            return Decision::Reset;
        };

        if self.admits(&sample) {
            state.window.push(sample.label);
        } else {
            state.window.age_out();
        }

        if !state.window.is_full() {
            return Decision::Accumulating {
                votes: state.window.len(),
                capacity: state.window.capacity(),
            };
        }

        let Some((leader, count)) = state.window.leader() else {
            return Decision::Accumulating {
                votes: 0,
                capacity: state.window.capacity(),
            };
        };
        if count < self.config.consensus_count {
            return Decision::NoConsensus { leader, count };
        }

        if state.last_emitted == Some(leader) {
            if self.config.policy == EmissionPolicy::HoldRefresh {
                state.last_emission = Some(now);
            }
            return Decision::Holding { label: leader };
        }

        if let Some(remaining) = state.cooldown_remaining(now, self.config.cooldown()) {
            return Decision::CoolingDown {
                candidate: leader,
                remaining,
            };
        }

        state.last_emitted = Some(leader);
        state.last_emission = Some(now);
        if self.config.policy == EmissionPolicy::ClearOnEmit {
            state.window.clear();
        }
        Decision::Emitted {
            label: leader,
            count,
        }
    }
}
