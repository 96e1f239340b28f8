use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling sequence of per-frame feature vectors.
///
/// Sequence models consume the last `sequence_length` frames concatenated
/// oldest first; single-frame models use a length of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBuffer {
    frame_dim: usize,
    sequence_length: usize,
    frames: VecDeque<Vec<f32>>,
}

impl FeatureBuffer {
    pub fn new(frame_dim: usize, sequence_length: usize) -> Self {
        let sequence_length = sequence_length.max(1);
        Self {
            frame_dim,
            sequence_length,
            frames: VecDeque::with_capacity(sequence_length),
        }
    }

    /// Append one frame, dropping the oldest when full.
    pub fn push(&mut self, features: Vec<f32>) {
        while self.frames.len() >= self.sequence_length {
            self.frames.pop_front();
        }
        self.frames.push_back(features);
    }

    pub fn is_ready(&self) -> bool {
        self.frames.len() >= self.sequence_length
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn frame_dim(&self) -> usize {
        self.frame_dim
    }

    /// Concatenated frames, oldest first.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_dim * self.frames.len());
        for frame in &self.frames {
            out.extend_from_slice(frame);
        }
        out
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
