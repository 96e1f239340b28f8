//! Replay entry point.
//!
//! Wires the complete flow for a recorded trace:
//! trace → session → stdout

use crate::classify::{Classifier, HeuristicClassifier, LabelSet, UnloadedClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::landmark::BodyPart;
use crate::pipeline::{Pipeline, PipelineConfig, ResultSink, StdoutSink};
use crate::session::Session;
use crate::source::{LandmarkSource, TraceSource};
use crate::stabilizer::{EmissionPolicy, StabilizerConfig};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Model name reported while no lip-reading model is installed.
pub const LIP_MODEL_NAME: &str = "lip-words";

/// Command-line overrides for the selected session's stabilizer.
#[derive(Debug, Clone, Default)]
pub struct StabilizerOverrides {
    pub cooldown: Option<Duration>,
    pub window: Option<usize>,
    pub consensus: Option<usize>,
    pub threshold: Option<f32>,
    pub policy: Option<EmissionPolicy>,
}

impl StabilizerOverrides {
    fn apply(&self, config: &mut StabilizerConfig) {
        if let Some(cooldown) = self.cooldown {
            config.cooldown_ms = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(window) = self.window {
            config.window_capacity = window;
        }
        if let Some(consensus) = self.consensus {
            config.consensus_count = consensus;
        }
        if let Some(threshold) = self.threshold {
            config.admission_threshold = threshold;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
    }
}

/// Everything `talkify replay` needs besides the configuration.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Trace file, or `-` for stdin
    pub trace: PathBuf,
    pub part: BodyPart,
    pub overrides: StabilizerOverrides,
    pub json: bool,
    pub quiet: bool,
    /// Use the wall clock instead of trace timestamps
    pub realtime: bool,
}

/// Apply overrides to the section for `part` and validate the result.
pub fn effective_config(
    mut config: Config,
    part: BodyPart,
    overrides: &StabilizerOverrides,
) -> Result<Config> {
    match part {
        BodyPart::Hand => overrides.apply(&mut config.sign.stabilizer),
        BodyPart::Face => overrides.apply(&mut config.lip.stabilizer),
    }
    config.validate()?;
    Ok(config)
}

/// Build the session for `part` with the classifier available offline.
///
/// Fingerspelling falls back to the geometric heuristic classifier. No
/// lip-reading model ships with talkify, so lip sessions report
/// "Model not loaded" for every full sequence.
pub fn build_session(config: &Config, part: BodyPart) -> Result<Session> {
    match part {
        BodyPart::Hand => {
            let classifier: Arc<dyn Classifier> = Arc::new(HeuristicClassifier::new(
                &LabelSet::sign(),
                config.sign.sequence_length,
            ));
            Session::sign(&config.sign, classifier)
        }
        BodyPart::Face => {
            let input_dim = BodyPart::Face.feature_len() * config.lip.sequence_length;
            let classifier: Arc<dyn Classifier> =
                Arc::new(UnloadedClassifier::new(LIP_MODEL_NAME, input_dim));
            Session::lip(&config.lip, classifier)
        }
    }
}

fn open_trace(options: &ReplayOptions) -> Result<Box<dyn LandmarkSource>> {
    if options.trace.as_os_str() == "-" {
        let reader = BufReader::new(std::io::stdin());
        return Ok(Box::new(TraceSource::new(reader, options.part)));
    }
    Ok(Box::new(TraceSource::open(&options.trace, options.part)?))
}

/// Null sink for quiet replays: the transcript is still collected.
struct QuietSink;

impl ResultSink for QuietSink {
    fn handle(&mut self, _result: &crate::session::PredictionResult) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "quiet"
    }
}

/// Replay a trace through a session and return the transcript.
pub fn run_replay(config: Config, options: &ReplayOptions) -> Result<Option<String>> {
    let config = effective_config(config, options.part, &options.overrides)?;
    let session = build_session(&config, options.part)?;
    tracing::info!(
        part = %options.part,
        model = session.model_name(),
        trace = %options.trace.display(),
        "replaying trace"
    );

    let source = open_trace(options)?;
    let sink: Box<dyn ResultSink> = if options.quiet {
        Box::new(QuietSink)
    } else {
        Box::new(StdoutSink::new(options.json))
    };

    let pipeline_config = PipelineConfig {
        replay: !options.realtime,
        ..PipelineConfig::default()
    };
    Pipeline::new(pipeline_config)
        .start(source, session, sink)?
        .wait()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_touch_only_selected_section() {
        let overrides = StabilizerOverrides {
            cooldown: Some(Duration::from_millis(750)),
            window: Some(6),
            consensus: Some(4),
            ..Default::default()
        };
        let config = effective_config(Config::default(), BodyPart::Hand, &overrides).unwrap();
        assert_eq!(config.sign.stabilizer.cooldown_ms, 750);
        assert_eq!(config.sign.stabilizer.window_capacity, 6);
        assert_eq!(config.sign.stabilizer.consensus_count, 4);
        assert_eq!(config.lip, Config::default().lip);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = StabilizerOverrides {
            window: Some(3),
            consensus: Some(5),
            ..Default::default()
        };
        assert!(effective_config(Config::default(), BodyPart::Face, &overrides).is_err());
    }

    #[test]
    fn test_build_sessions() {
        let config = Config::default();
        let sign = build_session(&config, BodyPart::Hand).unwrap();
        assert_eq!(sign.model_name(), "heuristic");
        let lip = build_session(&config, BodyPart::Face).unwrap();
        assert_eq!(lip.model_name(), LIP_MODEL_NAME);
    }

    #[test]
    fn test_run_replay_quiet_open_palm_trace() {
        use crate::heuristics::fixtures::open_palm;
        use crate::source::{TraceDetection, TraceRecord};

        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..12u64 {
            let record = TraceRecord {
                width: 640,
                height: 480,
                t_ms: Some(i * 33),
                hand: Some(TraceDetection {
                    handedness: Some(crate::landmark::Handedness::Right),
                    landmarks: open_palm(),
                }),
                face: None,
            };
            writeln!(file, "{}", serde_json::to_string(&record).unwrap()).unwrap();
        }

        let options = ReplayOptions {
            trace: file.path().to_path_buf(),
            part: BodyPart::Hand,
            overrides: StabilizerOverrides::default(),
            json: false,
            quiet: true,
            realtime: false,
        };
        let transcript = run_replay(Config::default(), &options).unwrap();
        assert_eq!(transcript, Some(" ".to_string()));
    }

    #[test]
    fn test_run_replay_missing_trace() {
        let options = ReplayOptions {
            trace: PathBuf::from("/nonexistent/trace.jsonl"),
            part: BodyPart::Hand,
            overrides: StabilizerOverrides::default(),
            json: false,
            quiet: true,
            realtime: false,
        };
        assert!(run_replay(Config::default(), &options).is_err());
    }
}
