//! Landmark sources feeding sessions one [`Frame`] at a time.

mod trace;

pub use trace::{TraceDetection, TraceRecord, TraceSource};

use crate::error::Result;
use crate::session::Frame;
use std::collections::VecDeque;

/// Trait for landmark providers (live detectors, recorded traces).
pub trait LandmarkSource: Send {
    /// Read the next frame.
    ///
    /// # Returns
    /// `Ok(None)` once a finite source is exhausted, or an error if the
    /// source could not produce a frame
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// True for sources that end (files); false for live capture.
    fn is_finite(&self) -> bool {
        true
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "source"
    }
}

/// In-memory source for tests and library use.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    frames: VecDeque<Frame>,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl LandmarkSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &'static str {
        "vec"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_yields_in_order_then_ends() {
        let mut source = VecSource::new(vec![
            Frame::empty(1, 1).at(0),
            Frame::empty(1, 1).at(33),
        ]);
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ms, Some(0));
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ms, Some(33));
        assert!(source.next_frame().unwrap().is_none());
        assert!(source.is_finite());
    }

    #[test]
    fn test_source_is_object_safe() {
        let _source: Box<dyn LandmarkSource> = Box::new(VecSource::default());
    }
}
