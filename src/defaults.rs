//! Default configuration constants for talkify.
//!
//! Shared by the config sections, the stabilizer and the sessions so the
//! tuning lives in one place.

/// Minimum per-frame confidence for a prediction to enter the voting window.
///
/// Samples at or below this only age out old evidence. Frame-level gating is
/// deliberately loose; consensus does the real filtering.
pub const ADMISSION_THRESHOLD: f32 = 0.5;

/// Number of votes held by the fingerspelling stabilizer.
pub const SIGN_WINDOW_CAPACITY: usize = 10;

/// Votes one label needs inside a full sign window to become stable (70%).
pub const SIGN_CONSENSUS_COUNT: usize = 7;

/// Votes held by the lip-word stabilizer.
///
/// Lip predictions come from 15-frame sequences, so fewer votes are needed.
pub const LIP_WINDOW_CAPACITY: usize = 4;

/// Votes one word needs inside a full lip window.
pub const LIP_CONSENSUS_COUNT: usize = 3;

/// Minimum time between two different emitted symbols, in milliseconds.
pub const COOLDOWN_MS: u64 = 500;

/// Clock step for replayed frames that carry no timestamp (30 fps).
pub const REPLAY_FRAME_INTERVAL_MS: u64 = 33;

/// Frames per classifier input for the sign model.
pub const SIGN_SEQUENCE_LENGTH: usize = 1;

/// Frames per classifier input for the lip model.
pub const LIP_SEQUENCE_LENGTH: usize = 15;

/// Pixels added around the landmark extents for the overlay rectangle.
pub const REGION_PADDING: u32 = 20;

/// Minimum horizontal thumb offset (normalized image units) for the open-palm rule.
pub const THUMB_OFFSET: f32 = 0.03;

/// Minimum probability mass a hand's allowed labels must keep after role
/// masking; below it the frame is reported as the wrong hand.
pub const ROLE_MASS_FLOOR: f32 = 0.05;

/// Floor for the normalization reference distance.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Number of landmarks in a hand observation.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Number of landmarks in a lip observation.
pub const LIP_LANDMARK_COUNT: usize = 21;
