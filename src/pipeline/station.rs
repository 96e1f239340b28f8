//! Station abstraction: one worker thread per processing step, joined by channels.

use crate::pipeline::error::{ErrorReporter, StationError};
use crossbeam_channel::{Receiver, Sender};
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A processing station in the pipeline.
///
/// Each station receives input, processes it, and produces output.
/// Stations run in their own threads and are connected by channels.
pub trait Station: Send + 'static {
    /// The input type this station receives.
    type Input: Send + 'static;
    /// The output type this station produces.
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(Some(output))` - Successfully processed and produced output
    /// - `Ok(None)` - Successfully processed but no output (e.g., filtered)
    /// - `Err(StationError)` - Processing failed
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError>;

    /// Returns the name of this station for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called once when the input closes or a fatal error stops the station.
    fn shutdown(&mut self) {}
}

/// Counters reported when a station thread exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationStats {
    pub processed: u64,
    pub emitted: u64,
    pub errors: u64,
    /// True when a fatal error ended the loop.
    pub aborted: bool,
}

/// Runs a station in a dedicated thread.
pub struct StationRunner<S: Station> {
    handle: Option<JoinHandle<StationStats>>,
    station_name: &'static str,
    _phantom: PhantomData<S>,
}

impl<S: Station> StationRunner<S> {
    /// Spawns `station` on its own thread, reading `input_rx` until it closes.
    pub fn spawn(
        mut station: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();

        let handle = thread::spawn(move || {
            Self::run_station(&mut station, input_rx, output_tx, error_reporter)
        });

        Self {
            handle: Some(handle),
            station_name,
            _phantom: PhantomData,
        }
    }

    fn run_station(
        station: &mut S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> StationStats {
        let station_name = station.name();
        let mut stats = StationStats::default();
        tracing::debug!(station = station_name, "station started");

        while let Ok(input) = input_rx.recv() {
            stats.processed += 1;
            match station.process(input) {
                Ok(Some(output)) => {
                    if output_tx.send(output).is_err() {
                        // Downstream is gone
                        break;
                    }
                    stats.emitted += 1;
                }
                Ok(None) => {}
                Err(error) => {
                    stats.errors += 1;
                    error_reporter.report(station_name, &error);
                    if error.is_fatal() {
                        stats.aborted = true;
                        break;
                    }
                }
            }
        }

        station.shutdown();
        tracing::debug!(station = station_name, ?stats, "station stopped");
        stats
    }

    /// Waits for the station thread to complete.
    pub fn join(mut self) -> Result<StationStats, String> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| format!("Station '{}' thread panicked", self.station_name)),
            None => Ok(StationStats::default()),
        }
    }

    /// Returns the name of the station.
    pub fn name(&self) -> &'static str {
        self.station_name
    }
}
