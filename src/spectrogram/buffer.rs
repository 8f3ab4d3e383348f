use std::collections::VecDeque;

use crate::audio::spectrum::Spectrum;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("spectrum has {actual} bins, spectrogram rows have {expected}")]
pub struct RowWidthError {
    pub actual: usize,
    pub expected: usize,
}

/// Fixed-height scrolling grid of spectra, oldest row first.
///
/// Starts out as `height` all-zero rows. Every push evicts exactly the
/// oldest row, so the row count never changes.
#[derive(Clone, Debug)]
pub struct SpectrogramBuffer {
    rows: VecDeque<Spectrum>,
    width: usize,
    min: f32,
    max: f32,
    pushes: u64,
}

impl SpectrogramBuffer {
    pub fn new(height: usize, width: usize) -> Self {
        assert!(height >= 1);
        assert!(width >= 1);

        Self {
            rows: (0..height).map(|_| vec![0.0; width]).collect(),
            width,
            min: 0.0,
            max: 0.0,
            pushes: 0,
        }
    }

    /// Total rows accepted since creation.
    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    /// Scroll by one row: drop the oldest, append `spectrum` as the newest.
    pub fn push(&mut self, spectrum: Spectrum) -> Result<(), RowWidthError> {
        if spectrum.len() != self.width {
            return Err(RowWidthError {
                actual: spectrum.len(),
                expected: self.width,
            });
        }

        self.rows.pop_front();
        self.rows.push_back(spectrum);
        self.pushes += 1;
        self.recompute_range();
        Ok(())
    }

    /// `(min, max)` over every cell, for scaling color intensity.
    pub fn value_range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn snapshot(&self) -> SpectrogramSnapshot {
        SpectrogramSnapshot {
            rows: self.rows.iter().cloned().collect(),
            width: self.width,
            min: self.min,
            max: self.max,
            pushes: self.pushes,
        }
    }

    fn recompute_range(&mut self) {
        let (min, max) = self
            .rows
            .iter()
            .flatten()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        self.min = min;
        self.max = max;
    }
}

/// Point-in-time copy of the spectrogram. Row 0 is the oldest.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramSnapshot {
    rows: Vec<Spectrum>,
    width: usize,
    min: f32,
    max: f32,
    pushes: u64,
}

impl SpectrogramSnapshot {
    pub fn rows(&self) -> &[Spectrum] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn value_range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Accepted rows at the time the snapshot was taken.
    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    pub fn newest(&self) -> &Spectrum {
        &self.rows[self.rows.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: f32) -> Spectrum {
        vec![v; 2]
    }

    #[test]
    fn starts_zeroed_with_full_height() {
        let buf = SpectrogramBuffer::new(4, 3);
        let snap = buf.snapshot();
        assert_eq!(snap.height(), 4);
        assert!(snap.rows().iter().all(|r| r == &vec![0.0; 3]));
        assert_eq!(snap.value_range(), (0.0, 0.0));
        assert_eq!(snap.pushes(), 0);
    }

    #[test]
    fn scrolls_fifo() {
        let mut buf = SpectrogramBuffer::new(3, 2);
        for v in [1.0, 2.0, 3.0] {
            buf.push(row(v)).unwrap();
        }
        assert_eq!(buf.snapshot().rows(), &[row(1.0), row(2.0), row(3.0)]);

        buf.push(row(4.0)).unwrap();
        assert_eq!(buf.snapshot().rows(), &[row(2.0), row(3.0), row(4.0)]);
        assert_eq!(buf.pushes(), 4);
    }

    #[test]
    fn first_push_keeps_zero_rows_behind_it() {
        let mut buf = SpectrogramBuffer::new(3, 2);
        buf.push(row(-50.0)).unwrap();
        let snap = buf.snapshot();
        assert_eq!(snap.height(), 3);
        assert_eq!(snap.rows(), &[row(0.0), row(0.0), row(-50.0)]);
        assert_eq!(snap.newest(), &row(-50.0));
    }

    #[test]
    fn value_range_tracks_evictions() {
        let mut buf = SpectrogramBuffer::new(2, 2);
        buf.push(vec![-120.0, 40.0]).unwrap();
        assert_eq!(buf.value_range(), (-120.0, 40.0));
        buf.push(vec![-10.0, 10.0]).unwrap();
        assert_eq!(buf.value_range(), (-120.0, 40.0));
        buf.push(vec![-20.0, 5.0]).unwrap();
        assert_eq!(buf.value_range(), (-20.0, 10.0));
    }

    #[test]
    fn rejects_wrong_width_without_mutation() {
        let mut buf = SpectrogramBuffer::new(2, 3);
        buf.push(vec![1.0, 2.0, 3.0]).unwrap();
        let before = buf.snapshot();

        let err = buf.push(vec![1.0; 4]).unwrap_err();
        assert_eq!(err, RowWidthError { actual: 4, expected: 3 });
        assert_eq!(buf.snapshot(), before);
    }
}
