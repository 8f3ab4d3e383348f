use parking_lot::RwLock;
use std::sync::Arc;

use super::buffer::{RowWidthError, SpectrogramBuffer, SpectrogramSnapshot};
use crate::audio::spectrum::Spectrum;

/// Create a spectrogram with one writing handle and a cloneable reading handle.
pub fn new_spectrogram(height: usize, width: usize) -> (SpectrogramWriter, SpectrogramReader) {
    let inner = Arc::new(RwLock::new(SpectrogramBuffer::new(height, width)));
    (
        SpectrogramWriter {
            inner: inner.clone(),
        },
        SpectrogramReader { inner },
    )
}

/// The only handle that can mutate the spectrogram. Not `Clone`.
pub struct SpectrogramWriter {
    inner: Arc<RwLock<SpectrogramBuffer>>,
}

impl SpectrogramWriter {
    /// Shift and insert under the write lock; readers see the grid either
    /// before or after, never in between.
    pub fn push(&self, spectrum: Spectrum) -> Result<(), RowWidthError> {
        self.inner.write().push(spectrum)
    }

    pub fn snapshot(&self) -> SpectrogramSnapshot {
        self.inner.read().snapshot()
    }
}

/// Read-only view for renderers and exporters.
#[derive(Clone)]
pub struct SpectrogramReader {
    inner: Arc<RwLock<SpectrogramBuffer>>,
}

impl SpectrogramReader {
    pub fn snapshot(&self) -> SpectrogramSnapshot {
        self.inner.read().snapshot()
    }

    pub fn value_range(&self) -> (f32, f32) {
        self.inner.read().value_range()
    }

    pub fn pushes(&self) -> u64 {
        self.inner.read().pushes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn reader_sees_writer_pushes() {
        let (writer, reader) = new_spectrogram(2, 3);
        writer.push(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(reader.pushes(), 1);
        assert_eq!(reader.snapshot().newest(), &vec![1.0, 2.0, 3.0]);
        assert_eq!(reader.value_range(), (0.0, 3.0));
        assert_eq!(writer.snapshot(), reader.snapshot());
    }

    #[test]
    fn concurrent_snapshots_never_see_partial_scroll() {
        const HEIGHT: usize = 16;
        const WIDTH: usize = 33;
        const PUSHES: u64 = 5_000;

        let (writer, reader) = new_spectrogram(HEIGHT, WIDTH);
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = reader.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut checked = 0u64;
                    loop {
                        let finished = done.load(Ordering::Acquire);
                        let snap = reader.snapshot();
                        assert_eq!(snap.height(), HEIGHT);
                        let p = snap.pushes() as i64;
                        // Row i holds push number p - HEIGHT + 1 + i, or zero
                        // if that push has not happened yet.
                        for (i, row) in snap.rows().iter().enumerate() {
                            let n = p - HEIGHT as i64 + 1 + i as i64;
                            let expected = if n > 0 { n as f32 } else { 0.0 };
                            assert_eq!(row.len(), WIDTH);
                            assert!(row.iter().all(|&v| v == expected), "row {} of push {}", i, p);
                        }
                        checked += 1;
                        if finished {
                            break checked;
                        }
                    }
                })
            })
            .collect();

        for n in 1..=PUSHES {
            writer.push(vec![n as f32; WIDTH]).unwrap();
        }
        done.store(true, Ordering::Release);

        for handle in readers {
            assert!(handle.join().unwrap() > 0);
        }
        assert_eq!(reader.pushes(), PUSHES);
    }
}
