pub mod png;

use std::io;
use std::path::PathBuf;

use crate::spectrogram::SpectrogramSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: ::png::EncodingError,
    },
}

/// Receives a read-only snapshot every K accepted blocks.
pub trait SnapshotExporter {
    /// `cycle` increases with every accepted block, so exports never collide.
    fn export(&mut self, snapshot: &SpectrogramSnapshot, cycle: u64) -> Result<PathBuf, ExportError>;
}
