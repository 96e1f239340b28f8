//! Session station: runs frames through a [`Session`] on the pipeline's worker thread.

use crate::defaults::REPLAY_FRAME_INTERVAL_MS;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::session::{Frame, PredictionResult, Session};
use crate::stabilizer::ManualClock;
use std::sync::Arc;
use std::time::Duration;

pub struct SessionStation {
    session: Session,
    /// Driven by frame timestamps during replay.
    replay_clock: Option<ManualClock>,
    first_timestamp: Option<u64>,
}

impl SessionStation {
    /// Live operation: cooldowns follow wall-clock time.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            replay_clock: None,
            first_timestamp: None,
        }
    }

    /// Replay operation: cooldowns follow the frames' recorded timestamps, so a
    /// trace produces the same text no matter how fast it is fed.
    pub fn replaying(session: Session) -> Self {
        let clock = ManualClock::new();
        Self {
            session: session.with_clock(Arc::new(clock.clone())),
            replay_clock: Some(clock),
            first_timestamp: None,
        }
    }

    /// Untimestamped frames step the clock by one nominal frame interval.
    fn advance_clock(&mut self, frame: &Frame) {
        let Some(clock) = &self.replay_clock else {
            return;
        };
        match frame.timestamp_ms {
            Some(t) => {
                let start = *self.first_timestamp.get_or_insert(t);
                clock.set_elapsed(Duration::from_millis(t.saturating_sub(start)));
            }
            None => clock.advance(Duration::from_millis(REPLAY_FRAME_INTERVAL_MS)),
        }
    }
}

impl Station for SessionStation {
    type Input = Frame;
    type Output = PredictionResult;

    fn process(&mut self, frame: Frame) -> Result<Option<PredictionResult>, StationError> {
        self.advance_clock(&frame);
        let result = self.session.process(&frame)?;
        Ok(Some(result))
    }

    fn name(&self) -> &'static str {
        "session"
    }

    fn shutdown(&mut self) {
        tracing::debug!(
            frames = self.session.state().frames,
            model = self.session.model_name(),
            "session closed"
        );
    }
}
