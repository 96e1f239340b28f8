//! Classification: label sets, the classifier seam and role masking.

mod adapter;
mod classifier;
mod heuristic;
mod labels;
mod role;

pub use adapter::{Classification, ClassifierAdapter, top_label};
pub use classifier::{Classifier, MockClassifier, UnloadedClassifier, peaked_distribution};
pub use heuristic::{FingerState, HeuristicClassifier};
pub use labels::{LIP_WORDS, LabelSet, SPACE_SYMBOL};
pub use role::{Role, RoleMasks};
