//! Landmark types and the pure geometry computed from them.
//!
//! Landmarks arrive from an external detector in image-normalized coordinates.
//! Nothing in this module keeps state.

pub mod normalize;
pub mod point;
pub mod region;

pub use normalize::{NormalizeSpec, normalize};
pub use point::{BodyPart, Detection, Handedness, LIP_MESH_INDICES, Landmark, hand};
pub use region::Region;
