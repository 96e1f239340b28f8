use crate::output::render_result;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::transcript::Transcript;
use crate::session::PredictionResult;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Pluggable output handler for per-frame results.
/// Pairs with LandmarkSource for input.
pub trait ResultSink: Send + 'static {
    /// Handle one frame's result.
    fn handle(&mut self, result: &PredictionResult) -> crate::error::Result<()>;

    /// Called on pipeline shutdown.
    fn finish(&mut self) {}

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Station wrapper for any ResultSink implementation.
/// Also builds the transcript and hands it back on shutdown.
pub(crate) struct SinkStation {
    sink: Box<dyn ResultSink>,
    transcript: Transcript,
    result_tx: Option<crossbeam_channel::Sender<Option<String>>>,
}

impl SinkStation {
    pub(crate) fn new(
        sink: Box<dyn ResultSink>,
        transcript: Transcript,
        result_tx: crossbeam_channel::Sender<Option<String>>,
    ) -> Self {
        Self {
            sink,
            transcript,
            result_tx: Some(result_tx),
        }
    }
}

impl Station for SinkStation {
    type Input = PredictionResult;
    type Output = ();

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn process(&mut self, result: PredictionResult) -> Result<Option<()>, StationError> {
        self.transcript.push(&result.text);
        self.sink.handle(&result)?;
        Ok(Some(()))
    }

    fn shutdown(&mut self) {
        self.sink.finish();

        let transcript = std::mem::take(&mut self.transcript);
        let result = (!transcript.is_empty()).then(|| transcript.into_text());
        if let Some(tx) = self.result_tx.take()
            && tx.send(result).is_err()
        {
            tracing::debug!("sink shutdown: result receiver already dropped");
        }
    }
}

/// Keeps every result for library use and tests.
///
/// Clone the handle from [`CollectorSink::results`] before moving the sink
/// into a pipeline.
#[derive(Default)]
pub struct CollectorSink {
    results: Arc<Mutex<Vec<PredictionResult>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Arc<Mutex<Vec<PredictionResult>>> {
        self.results.clone()
    }
}

impl ResultSink for CollectorSink {
    fn handle(&mut self, result: &PredictionResult) -> crate::error::Result<()> {
        let mut results = self
            .results
            .lock()
            .map_err(|_| crate::error::TalkifyError::Other("collector lock poisoned".to_string()))?;
        results.push(result.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Writes results to stdout: one JSON object per frame, or a status line
/// per change in human mode.
pub struct StdoutSink {
    json: bool,
    last_status: Option<String>,
}

impl StdoutSink {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_status: None,
        }
    }
}

impl ResultSink for StdoutSink {
    fn handle(&mut self, result: &PredictionResult) -> crate::error::Result<()> {
        let mut stdout = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer(&mut stdout, result)?;
            writeln!(stdout)?;
            return Ok(());
        }

        let status = result.status.to_string();
        if result.has_text() || self.last_status.as_deref() != Some(status.as_str()) {
            writeln!(stdout, "{}", render_result(result))?;
            self.last_status = Some(status);
        }
        Ok(())
    }

    fn finish(&mut self) {
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!(error = %e, "failed to flush stdout");
        }
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
