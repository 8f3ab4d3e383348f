use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::spectrogram::{SpectrogramReader, SpectrogramSnapshot};

/// What the live view reports for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub rows: u64,
    pub peak_bin: usize,
    pub peak_db: f32,
    pub range: (f32, f32),
}

pub fn summarize(snapshot: &SpectrogramSnapshot, range: (f32, f32)) -> FrameSummary {
    let (peak_bin, peak_db) = snapshot
        .newest()
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

    FrameSummary {
        rows: snapshot.pushes(),
        peak_bin,
        peak_db,
        range,
    }
}

/// Display-side consumer running on its own cadence. Stands in for a
/// plotting surface: it only ever reads snapshots and the value range.
pub struct LiveView {
    reader: SpectrogramReader,
    refresh: Duration,
    last_seen: u64,
}

impl LiveView {
    pub fn new(reader: SpectrogramReader, refresh: Duration) -> Self {
        Self {
            reader,
            refresh,
            last_seen: 0,
        }
    }

    /// Returns a summary when rows arrived since the previous refresh.
    pub fn refresh(&mut self) -> Option<FrameSummary> {
        let pushes = self.reader.pushes();
        if pushes == self.last_seen {
            return None;
        }

        // Same pair of calls a plotting surface makes: color limits, then data.
        let range = self.reader.value_range();
        let snapshot = self.reader.snapshot();
        self.last_seen = snapshot.pushes();
        Some(summarize(&snapshot, range))
    }

    /// Refresh until `running` drops. The handle yields the number of
    /// frames that had new data.
    pub fn spawn(mut self, running: Arc<AtomicBool>) -> Result<JoinHandle<u64>> {
        thread::Builder::new()
            .name("live-view".into())
            .spawn(move || {
                let mut frames = 0u64;
                while running.load(Ordering::SeqCst) {
                    if let Some(summary) = self.refresh() {
                        frames += 1;
                        log::debug!(
                            "row {}: peak bin {} at {:.1} dB, range {:.1}..{:.1} dB",
                            summary.rows,
                            summary.peak_bin,
                            summary.peak_db,
                            summary.range.0,
                            summary.range.1
                        );
                    }
                    thread::sleep(self.refresh);
                }
                frames
            })
            .context("Failed to spawn live view thread")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrogram::new_spectrogram;

    #[test]
    fn refresh_only_reports_new_rows() {
        let (writer, reader) = new_spectrogram(4, 3);
        let mut view = LiveView::new(reader, Duration::from_millis(10));
        assert!(view.refresh().is_none());

        writer.push(vec![-120.0, -20.0, -80.0]).unwrap();
        let summary = view.refresh().unwrap();
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.peak_bin, 1);
        assert_eq!(summary.peak_db, -20.0);
        assert_eq!(summary.range, (-120.0, 0.0));

        assert!(view.refresh().is_none());
    }

    #[test]
    fn spawned_view_stops_on_flag() {
        let (writer, reader) = new_spectrogram(2, 2);
        writer.push(vec![1.0, 2.0]).unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let handle = LiveView::new(reader, Duration::from_millis(5))
            .spawn(running.clone())
            .unwrap();
        thread::sleep(Duration::from_millis(30));
        running.store(false, Ordering::SeqCst);

        assert_eq!(handle.join().unwrap(), 1);
    }
}
