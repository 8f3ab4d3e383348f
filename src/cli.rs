use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "specstream", about = "Live spectrogram of 16-bit audio blocks streamed over UDP")]
pub struct Cli {
    /// Config file (TOML). Defaults to ./specstream.toml or the user config dir
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Local address to receive sample blocks on
    #[arg(short, long, default_value = "0.0.0.0:5005")]
    pub listen: SocketAddr,

    /// Samples per datagram. Must match the sender.
    #[arg(short = 'n', long, default_value_t = 64)]
    pub block_size: usize,

    /// Number of spectrum rows kept in the scrolling buffer
    #[arg(long, default_value_t = 128)]
    pub rows: usize,

    /// Receive timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    pub timeout_ms: u64,

    /// Ingestion loop period in milliseconds
    #[arg(long, default_value_t = 100)]
    pub period_ms: u64,

    /// Export a snapshot every N accepted blocks
    #[arg(short = 'k', long, default_value_t = 100)]
    pub snapshot_interval: u64,

    /// Directory snapshot images are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Requested OS receive buffer size in bytes
    #[arg(long, default_value_t = 8192)]
    pub recv_buffer: usize,

    /// Pixels per spectrogram cell in exported images
    #[arg(long, default_value_t = 4)]
    pub scale: u32,

    /// Live view refresh period in milliseconds
    #[arg(long, default_value_t = 250)]
    pub refresh_ms: u64,

    /// Stop after this many loop cycles (runs until Ctrl-C if unset)
    #[arg(long)]
    pub cycles: Option<u64>,
}
