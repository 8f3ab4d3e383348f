use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::block::SampleBlock;

/// Floor added to every magnitude before the log so silence stays finite.
pub const MAGNITUDE_FLOOR: f32 = 1e-6;

/// Decibel magnitudes for the non-negative frequency bins of one block.
pub type Spectrum = Vec<f32>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("block has {actual} samples, transform expects {expected}")]
    BlockSize { actual: usize, expected: usize },
    #[error("non-finite level {value} in bin {bin}")]
    NonFinite { bin: usize, value: f32 },
}

/// Real-input DFT of a block followed by `20 * log10(|X| + floor)`.
///
/// Samples are transformed as raw integers, without windowing or
/// normalization. The cached plan makes repeated calls cheap; the result
/// only depends on the block passed in.
pub struct SpectralTransform {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
}

impl SpectralTransform {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        Self { size, fft }
    }

    /// Number of bins in every spectrum produced: `size / 2 + 1`.
    pub fn bins(&self) -> usize {
        self.size / 2 + 1
    }

    pub fn transform(&self, block: &SampleBlock) -> Result<Spectrum, TransformError> {
        if block.len() != self.size {
            return Err(TransformError::BlockSize {
                actual: block.len(),
                expected: self.size,
            });
        }

        let mut buffer: Vec<Complex<f32>> = block
            .samples()
            .iter()
            .map(|&s| Complex::new(s as f32, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let spectrum: Spectrum = buffer[..self.bins()]
            .iter()
            .map(|c| 20.0 * (c.norm() + MAGNITUDE_FLOOR).log10())
            .collect();

        if let Some((bin, &value)) = spectrum.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(TransformError::NonFinite { bin, value });
        }

        Ok(spectrum)
    }
}
