use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use super::ticker::Ticker;
use crate::audio::source::{ReceiveError, Received, SampleSource};
use crate::audio::spectrum::{SpectralTransform, TransformError};
use crate::encode::{ExportError, SnapshotExporter};
use crate::spectrogram::buffer::RowWidthError;
use crate::spectrogram::SpectrogramWriter;

/// Result of a cycle that did not fail.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Receive timed out; the spectrogram is untouched.
    Idle,
    /// A block was transformed and pushed as row number `accepted`.
    Pushed {
        accepted: u64,
        export: Option<Result<PathBuf, ExportError>>,
    },
}

/// Per-cycle failures. None of these stop the loop.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Receive(#[from] ReceiveError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Row(#[from] RowWidthError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub accepted: u64,
    pub timeouts: u64,
    pub malformed: u64,
    pub receive_errors: u64,
    pub rejected: u64,
    pub exported: u64,
    pub export_failures: u64,
}

/// Pulls blocks from a source, transforms them and scrolls them into the
/// spectrogram. Owns the only writer handle.
pub struct Driver<S, E> {
    source: S,
    transform: SpectralTransform,
    spectrogram: SpectrogramWriter,
    exporter: E,
    snapshot_interval: u64,
    stats: CycleStats,
    starved: bool,
}

impl<S: SampleSource, E: SnapshotExporter> Driver<S, E> {
    pub fn new(
        source: S,
        transform: SpectralTransform,
        spectrogram: SpectrogramWriter,
        exporter: E,
        snapshot_interval: u64,
    ) -> Self {
        assert!(snapshot_interval >= 1);
        Self {
            source,
            transform,
            spectrogram,
            exporter,
            snapshot_interval,
            stats: CycleStats::default(),
            starved: false,
        }
    }

    /// One receive/transform/push attempt, plus an export on every
    /// `snapshot_interval`-th accepted block.
    pub fn cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        self.stats.cycles += 1;

        let block = match self.source.receive() {
            Ok(Received::Block(block)) => block,
            Ok(Received::Timeout) => {
                self.stats.timeouts += 1;
                return Ok(CycleOutcome::Idle);
            }
            Err(err) => {
                match &err {
                    ReceiveError::Malformed(_) => self.stats.malformed += 1,
                    ReceiveError::Io(_) => self.stats.receive_errors += 1,
                }
                return Err(err.into());
            }
        };

        let pushed = self
            .transform
            .transform(&block)
            .map_err(CycleError::from)
            .and_then(|spectrum| Ok(self.spectrogram.push(spectrum)?));
        if let Err(err) = pushed {
            self.stats.rejected += 1;
            return Err(err);
        }

        self.stats.accepted += 1;
        let accepted = self.stats.accepted;

        let export = if accepted % self.snapshot_interval == 0 {
            let result = self.exporter.export(&self.spectrogram.snapshot(), accepted);
            match result {
                Ok(_) => self.stats.exported += 1,
                Err(_) => self.stats.export_failures += 1,
            }
            Some(result)
        } else {
            None
        };

        Ok(CycleOutcome::Pushed { accepted, export })
    }

    /// Run cycles on `ticker` until `running` is cleared or `max_cycles`
    /// have run. Per-cycle failures are logged and never end the loop.
    pub fn run(&mut self, ticker: &mut Ticker, running: &AtomicBool, max_cycles: Option<u64>) -> CycleStats {
        log::info!(
            "Pipeline running: period {}ms, snapshot every {} blocks",
            ticker.period().as_millis(),
            self.snapshot_interval
        );

        while running.load(Ordering::SeqCst) {
            if max_cycles.is_some_and(|max| self.stats.cycles >= max) {
                log::info!("Reached cycle limit ({})", self.stats.cycles);
                break;
            }

            let lag = ticker.wait();
            if lag > ticker.period() {
                log::trace!("Tick fired {}ms late", lag.as_millis());
            }

            let result = self.cycle();
            self.report(result);
        }

        self.stats.clone()
    }

    fn report(&mut self, result: Result<CycleOutcome, CycleError>) {
        let cycle = self.stats.cycles;
        match result {
            Ok(CycleOutcome::Idle) => {
                if self.starved {
                    log::debug!("Cycle {}: no data", cycle);
                } else {
                    log::warn!("No data received within timeout");
                    self.starved = true;
                }
            }
            Ok(CycleOutcome::Pushed { accepted, export }) => {
                if self.starved {
                    log::info!("Stream resumed");
                    self.starved = false;
                }
                log::trace!("Cycle {}: pushed row {}", cycle, accepted);

                match export {
                    Some(Ok(path)) => log::info!("Spectrogram saved as {}", path.display()),
                    Some(Err(err)) => log::error!("Snapshot export failed: {}", err),
                    None => {}
                }
            }
            Err(err) => log::warn!("Cycle {} skipped: {}", cycle, err),
        }
    }
}
