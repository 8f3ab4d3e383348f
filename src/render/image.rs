use super::colormap::{magma, normalize};
use crate::spectrogram::SpectrogramSnapshot;

/// An 8-bit RGB raster, rows top to bottom.
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Rasterize a snapshot: frequency bins left to right, time bottom to top
/// (oldest row at the bottom edge), each cell `scale` pixels square.
/// Colors span the snapshot's own value range.
pub fn render_snapshot(snapshot: &SpectrogramSnapshot, scale: u32) -> RgbImage {
    let scale = scale.max(1) as usize;
    let width = snapshot.width() * scale;
    let height = snapshot.height() * scale;
    let range = snapshot.value_range();

    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &snapshot.rows()[snapshot.height() - 1 - y / scale];
        for x in 0..width {
            pixels.extend_from_slice(&magma(normalize(row[x / scale], range)));
        }
    }

    RgbImage {
        width: width as u32,
        height: height as u32,
        pixels,
    }
}
