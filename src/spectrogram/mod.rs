pub mod buffer;
pub mod shared;

pub use buffer::{SpectrogramBuffer, SpectrogramSnapshot};
pub use shared::{new_spectrogram, SpectrogramReader, SpectrogramWriter};
