use crate::error::{Result, TalkifyError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Trait for feature-vector classification.
///
/// The model is a black box: a fixed-length feature vector in, one
/// probability per label out. Implementations can be swapped for tests.
pub trait Classifier: Send + Sync {
    /// Predict a probability vector for one feature vector.
    ///
    /// # Arguments
    /// * `features` - Flattened feature vector of length `input_dim()`
    ///
    /// # Returns
    /// One probability per label, or an error if inference failed
    fn predict(&self, features: &[f32]) -> Result<Vec<f32>>;

    /// Feature vector length the model was trained on.
    fn input_dim(&self) -> usize;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the model is loaded and able to predict
    fn is_ready(&self) -> bool;
}

/// Implement Classifier for Arc<T> to allow sharing one model across sessions.
impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    fn predict(&self, features: &[f32]) -> Result<Vec<f32>> {
        (**self).predict(features)
    }

    fn input_dim(&self) -> usize {
        (**self).input_dim()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Distribution with `confidence` on `index` and the rest spread evenly.
pub fn peaked_distribution(len: usize, index: usize, confidence: f32) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![1.0];
    }
    let confidence = confidence.clamp(0.0, 1.0);
    let rest = (1.0 - confidence) / (len - 1) as f32;
    (0..len)
        .map(|i| if i == index { confidence } else { rest })
        .collect()
}

/// Stand-in for a model that failed to load. Never predicts.
#[derive(Debug, Clone)]
pub struct UnloadedClassifier {
    model_name: String,
    input_dim: usize,
}

impl UnloadedClassifier {
    pub fn new(model_name: &str, input_dim: usize) -> Self {
        Self {
            model_name: model_name.to_string(),
            input_dim,
        }
    }
}

impl Classifier for UnloadedClassifier {
    fn predict(&self, _features: &[f32]) -> Result<Vec<f32>> {
        Err(TalkifyError::ModelNotLoaded {
            model: self.model_name.clone(),
        })
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}

/// Mock classifier for testing
///
/// Returns scripted distributions in order, then repeats a fallback.
#[derive(Debug)]
pub struct MockClassifier {
    model_name: String,
    input_dim: usize,
    fallback: Vec<f32>,
    script: Mutex<VecDeque<Vec<f32>>>,
    ready: bool,
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Create a mock returning a uniform distribution over `label_count` labels
    pub fn new(model_name: &str, input_dim: usize, label_count: usize) -> Self {
        let uniform = if label_count == 0 {
            Vec::new()
        } else {
            vec![1.0 / label_count as f32; label_count]
        };
        Self {
            model_name: model_name.to_string(),
            input_dim,
            fallback: uniform,
            script: Mutex::new(VecDeque::new()),
            ready: true,
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the distribution returned when the script is exhausted
    pub fn with_distribution(mut self, probabilities: Vec<f32>) -> Self {
        self.fallback = probabilities;
        self
    }

    /// Always predict `index` with `confidence`
    pub fn with_peak(self, index: usize, confidence: f32) -> Self {
        let len = self.fallback.len();
        self.with_distribution(peaked_distribution(len, index, confidence))
    }

    /// Queue distributions returned one per call before the fallback
    pub fn with_script(mut self, script: Vec<Vec<f32>>) -> Self {
        self.script = Mutex::new(script.into());
        self
    }

    /// Report the model as not loaded
    pub fn unloaded(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Configure the mock to fail on predict
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of predict calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn predict(&self, _features: &[f32]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(TalkifyError::Inference {
                message: "mock inference failure".to_string(),
            });
        }
        let mut script = self.script.lock().map_err(|_| TalkifyError::Inference {
            message: "mock script lock poisoned".to_string(),
        })?;
        Ok(script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
