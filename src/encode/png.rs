use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{ExportError, SnapshotExporter};
use crate::render::image::render_snapshot;
use crate::spectrogram::SpectrogramSnapshot;

/// Writes `spectrogram_{cycle}.png` files into a directory.
pub struct PngExporter {
    dir: PathBuf,
    scale: u32,
}

impl PngExporter {
    pub fn new(dir: &Path, scale: u32) -> Self {
        Self {
            dir: dir.to_path_buf(),
            scale,
        }
    }

    pub fn path_for(&self, cycle: u64) -> PathBuf {
        self.dir.join(format!("spectrogram_{:06}.png", cycle))
    }
}

impl SnapshotExporter for PngExporter {
    fn export(&mut self, snapshot: &SpectrogramSnapshot, cycle: u64) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(cycle);
        let image = render_snapshot(snapshot, self.scale);

        let file = File::create(&path).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        let encode_err = |source| ExportError::Encode {
            path: path.clone(),
            source,
        };

        let mut encoder = ::png::Encoder::new(BufWriter::new(file), image.width, image.height);
        encoder.set_color(::png::ColorType::Rgb);
        encoder.set_depth(::png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&image.pixels).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;

        Ok(path)
    }
}
