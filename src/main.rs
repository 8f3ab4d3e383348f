mod audio;
mod cli;
mod config;
mod encode;
mod pipeline;
mod render;
mod spectrogram;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use audio::source::UdpSampleSource;
use audio::spectrum::SpectralTransform;
use cli::Cli;
use config::Settings;
use encode::png::PngExporter;
use pipeline::{Driver, Ticker};
use render::live::LiveView;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Explicit --config path, or auto-detect specstream.toml / user config
    if let Some(path) = cli.config.clone().or_else(config::find_config) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            config::merge(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let settings = Settings::from_cli(&cli).context("Invalid configuration")?;

    log::info!("specstream - live UDP spectrogram");
    log::info!(
        "Block: {} samples -> {} bins, history: {} rows",
        settings.block_size,
        settings.bins(),
        settings.rows
    );
    log::info!(
        "Snapshots: every {} blocks into {}",
        settings.snapshot_interval,
        settings.output_dir.display()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    // 1. Bind the sample source. Nothing else can run without it.
    let source = UdpSampleSource::bind(
        settings.listen,
        settings.block_size,
        settings.recv_timeout,
        settings.recv_buffer,
    )?;
    log::info!(
        "Listening on {} (timeout {}ms)",
        source.local_addr().unwrap_or(settings.listen),
        settings.recv_timeout.as_millis()
    );

    // 2. Spectrogram shared between the ingestion loop and the live view
    let (writer, reader) = spectrogram::new_spectrogram(settings.rows, settings.bins());

    // 3. Live view on its own cadence
    let live = LiveView::new(reader, settings.refresh).spawn(running.clone())?;

    // 4. Ingestion loop
    let exporter = PngExporter::new(&settings.output_dir, settings.scale);
    let mut driver = Driver::new(
        source,
        SpectralTransform::new(settings.block_size),
        writer,
        exporter,
        settings.snapshot_interval,
    );
    let mut ticker = Ticker::new(settings.period);
    let stats = driver.run(&mut ticker, &running, settings.max_cycles);

    // Closes the socket.
    drop(driver);
    running.store(false, Ordering::SeqCst);
    let frames = live
        .join()
        .map_err(|_| anyhow::anyhow!("Live view thread panicked"))?;

    log::info!(
        "Done: {} cycles, {} blocks accepted, {} timeouts, {} malformed, {} receive errors, {} rejected",
        stats.cycles,
        stats.accepted,
        stats.timeouts,
        stats.malformed,
        stats.receive_errors,
        stats.rejected
    );
    log::info!(
        "Snapshots: {} saved, {} failed; live view refreshed {} frames",
        stats.exported,
        stats.export_failures,
        frames
    );
    Ok(())
}
