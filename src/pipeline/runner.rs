//! Frame pipeline that runs from startup until the source ends or is stopped.

use crate::error::{Result, TalkifyError};
use crate::pipeline::error::{ErrorReporter, FatalLatch, LogReporter, StationError};
use crate::pipeline::session_station::SessionStation;
use crate::pipeline::sink::{ResultSink, SinkStation};
use crate::pipeline::station::StationRunner;
use crate::pipeline::transcript::Transcript;
use crate::session::Session;
use crate::source::LandmarkSource;
use crossbeam_channel::{TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const MAX_CONSECUTIVE_SOURCE_ERRORS: u32 = 10;
const SOURCE_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Channel buffer sizes
    pub frame_buffer: usize,
    pub result_buffer: usize,
    /// Drive cooldowns from frame timestamps instead of the wall clock
    pub replay: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_buffer: 64,
            result_buffer: 64,
            replay: false,
        }
    }
}

type Latch = FatalLatch<Arc<dyn ErrorReporter>>;

/// Handle to a running pipeline.
pub struct PipelineHandle {
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    result_rx: crossbeam_channel::Receiver<Option<String>>,
    latch: Arc<Latch>,
}

impl PipelineHandle {
    /// Blocks until a finite source is exhausted and every station has
    /// drained, then returns the transcript.
    ///
    /// Returns `StationFailed` if any station stopped on a fatal error.
    /// Never returns for live sources; use [`PipelineHandle::stop`] there.
    pub fn wait(mut self) -> Result<Option<String>> {
        for handle in self.threads.drain(..) {
            join_logged(handle);
        }
        self.running.store(false, Ordering::SeqCst);

        if let Some((station, message)) = self.latch.take() {
            return Err(TalkifyError::StationFailed { station, message });
        }
        Ok(self.result_rx.try_recv().ok().flatten())
    }

    /// Stops the pipeline and returns the transcript built so far.
    ///
    /// Waits up to 2s for the transcript, then 1s for threads to finish.
    /// Threads still running after that are detached.
    pub fn stop(mut self) -> Option<String> {
        self.running.store(false, Ordering::SeqCst);

        let result = self
            .result_rx
            .recv_timeout(Duration::from_secs(2))
            .ok()
            .flatten();

        let deadline = Instant::now() + Duration::from_secs(1);
        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    join_logged(handle);
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    threads = self.threads.len(),
                    "shutdown timeout, detaching pipeline threads"
                );
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }

        result
    }

    /// Returns true until the pipeline has been stopped or waited on.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn join_logged(handle: JoinHandle<()>) {
    if let Err(panic_info) = handle.join() {
        let msg = panic_info
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("unknown panic");
        tracing::error!("pipeline thread panicked: {msg}");
    }
}

/// Frame pipeline: LandmarkSource → Session → ResultSink.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl Pipeline {
    /// Creates a new pipeline with the tracing error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts the pipeline.
    ///
    /// # Arguments
    /// * `source` - Landmark provider (trace file, live detector)
    /// * `session` - Configured sign or lip session
    /// * `sink` - Result output handler
    pub fn start(
        self,
        mut source: Box<dyn LandmarkSource>,
        session: Session,
        sink: Box<dyn ResultSink>,
    ) -> Result<PipelineHandle> {
        if self.config.frame_buffer == 0 || self.config.result_buffer == 0 {
            return Err(TalkifyError::ConfigInvalidValue {
                key: "pipeline.buffer".to_string(),
                message: "channel buffers must hold at least one item".to_string(),
            });
        }

        let running = Arc::new(AtomicBool::new(true));
        let latch: Arc<Latch> = Arc::new(FatalLatch::new(self.error_reporter.clone()));
        let reporter: Arc<dyn ErrorReporter> = latch.clone();

        let (frame_tx, frame_rx) = bounded(self.config.frame_buffer);
        let (prediction_tx, prediction_rx) = bounded(self.config.result_buffer);
        let (sink_out_tx, sink_out_rx) = bounded::<()>(self.config.result_buffer);
        let (result_tx, result_rx) = bounded(1);

        let transcript = Transcript::for_labels(session.labels());
        let session_station = if self.config.replay {
            SessionStation::replaying(session)
        } else {
            SessionStation::new(session)
        };
        let sink_station = SinkStation::new(sink, transcript, result_tx);

        let session_runner =
            StationRunner::spawn(session_station, frame_rx, prediction_tx, reporter.clone());
        let sink_runner =
            StationRunner::spawn(sink_station, prediction_rx, sink_out_tx, reporter.clone());

        // Terminal station output carries nothing; drain until the sink exits.
        let drain_handle = thread::spawn(move || for () in sink_out_rx.iter() {});

        let source_running = running.clone();
        let source_handle = thread::spawn(move || {
            let finite = source.is_finite();
            let name = source.name();
            let mut consecutive_errors: u32 = 0;
            let mut frames_sent: u64 = 0;
            let mut frames_dropped: u64 = 0;

            while source_running.load(Ordering::SeqCst) {
                let frame = match source.next_frame() {
                    Ok(Some(frame)) => {
                        consecutive_errors = 0;
                        frame
                    }
                    Ok(None) if finite => break,
                    Ok(None) => {
                        thread::sleep(SOURCE_POLL_INTERVAL);
                        continue;
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if finite || consecutive_errors >= MAX_CONSECUTIVE_SOURCE_ERRORS {
                            reporter.report(name, &StationError::Fatal(e.to_string()));
                            break;
                        }
                        reporter.report(name, &StationError::Recoverable(e.to_string()));
                        thread::sleep(SOURCE_POLL_INTERVAL);
                        continue;
                    }
                };

                if finite {
                    // Replays must see every frame.
                    if frame_tx.send(frame).is_err() {
                        break;
                    }
                    frames_sent += 1;
                    continue;
                }

                match frame_tx.try_send(frame) {
                    Ok(()) => frames_sent += 1,
                    Err(TrySendError::Full(_)) => frames_dropped += 1,
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }

            tracing::debug!(
                source = name,
                frames_sent,
                frames_dropped,
                "source finished"
            );
        });

        let threads = vec![
            source_handle,
            thread::spawn(move || match session_runner.join() {
                Ok(stats) => tracing::debug!(?stats, "session station joined"),
                Err(msg) => tracing::error!("{msg}"),
            }),
            thread::spawn(move || {
                if let Err(msg) = sink_runner.join() {
                    tracing::error!("{msg}");
                }
            }),
            drain_handle,
        ];

        Ok(PipelineHandle {
            running,
            threads,
            result_rx,
            latch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{MockClassifier, peaked_distribution};
    use crate::config::SignConfig;
    use crate::landmark::{Detection, Landmark};
    use crate::pipeline::sink::CollectorSink;
    use crate::session::Frame;
    use crate::source::VecSource;
    use crate::stabilizer::StabilizerConfig;

    fn hand() -> Vec<Landmark> {
        (0..21)
            .map(|i| Landmark::new(0.4 + 0.005 * i as f32, 0.9 - 0.03 * i as f32, 0.0))
            .collect()
    }

    fn session(mock: MockClassifier) -> Session {
        let config = SignConfig {
            stabilizer: StabilizerConfig {
                window_capacity: 3,
                consensus_count: 2,
                ..StabilizerConfig::sign()
            },
            open_palm_override: false,
            ..SignConfig::default()
        };
        Session::sign(&config, Arc::new(mock)).unwrap()
    }

    fn frames(count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::new(640, 480, Some(Detection::hand(hand(), None))).at(i as u64 * 33))
            .collect()
    }

    fn replay() -> PipelineConfig {
        PipelineConfig {
            replay: true,
            ..PipelineConfig::default()
        }
    }

    struct EndlessSource;

    impl LandmarkSource for EndlessSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            thread::sleep(Duration::from_millis(1));
            Ok(Some(Frame::empty(640, 480)))
        }

        fn is_finite(&self) -> bool {
            false
        }
    }

    struct BrokenSource;

    impl LandmarkSource for BrokenSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Err(TalkifyError::TraceParse {
                line: 3,
                message: "expected value".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_replay_produces_transcript_and_all_results() {
        let mock = MockClassifier::new("m", 63, 37).with_peak(17, 0.9);
        let sink = CollectorSink::new();
        let results = sink.results();

        let handle = Pipeline::new(replay())
            .start(
                Box::new(VecSource::new(frames(6))),
                session(mock),
                Box::new(sink),
            )
            .unwrap();
        let transcript = handle.wait().unwrap();

        assert_eq!(transcript, Some("H".to_string()));
        assert_eq!(results.lock().unwrap().len(), 6);
    }

    #[test]
    fn test_empty_source_yields_no_transcript() {
        let handle = Pipeline::new(replay())
            .start(
                Box::new(VecSource::new(Vec::new())),
                session(MockClassifier::new("m", 63, 37)),
                Box::new(CollectorSink::new()),
            )
            .unwrap();
        assert_eq!(handle.wait().unwrap(), None);
    }

    #[test]
    fn test_fatal_session_error_fails_wait() {
        let mock = MockClassifier::new("m", 63, 37).with_script(vec![vec![0.5; 2]]);
        let handle = Pipeline::new(replay())
            .start(
                Box::new(VecSource::new(frames(4))),
                session(mock),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        let error = handle.wait().unwrap_err();
        assert!(matches!(
            error,
            TalkifyError::StationFailed { ref station, .. } if station == "session"
        ));
    }

    #[test]
    fn test_source_error_fails_wait() {
        let handle = Pipeline::new(replay())
            .start(
                Box::new(BrokenSource),
                session(MockClassifier::new("m", 63, 37)),
                Box::new(CollectorSink::new()),
            )
            .unwrap();

        let error = handle.wait().unwrap_err();
        assert!(error.to_string().contains("broken"));
    }

    #[test]
    fn test_stop_live_source() {
        let sink = CollectorSink::new();
        let results = sink.results();
        let handle = Pipeline::new(PipelineConfig::default())
            .start(
                Box::new(EndlessSource),
                session(MockClassifier::new("m", 63, 37)),
                Box::new(sink),
            )
            .unwrap();
        assert!(handle.is_running());

        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.stop(), None);
        let results = results.lock().unwrap();
        assert!(results.iter().all(|r| r.status.is_searching()));
    }

    #[test]
    fn test_zero_buffer_is_rejected() {
        let config = PipelineConfig {
            frame_buffer: 0,
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(config).start(
            Box::new(VecSource::new(Vec::new())),
            session(MockClassifier::new("m", 63, 37)),
            Box::new(CollectorSink::new()),
        );
        assert!(result.is_err());
    }
}
