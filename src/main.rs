//! BZZZBZ - audio-reactive visuals for a sound-and-knobs box
//!
//! Samples ambient audio, reads three potentiometers, and hands the spectrum
//! and knob values to the shader once per frame.

use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use crossbeam_channel::{bounded, select, tick};
use tracing::{error, info};

use bzzzbz::cli::Args;
use bzzzbz::controls::SimulatedAdc;
use bzzzbz::rendering::{self, RenderBackend, TraceBackend};
use bzzzbz::sync::StalenessTracker;
use bzzzbz::{logging, Pipeline};

/// How often cadence statistics are logged
const STATS_INTERVAL: Duration = Duration::from_secs(5);

fn main() {
    let args = Args::parse();
    if let Err(e) = logging::init(&args.log_level) {
        // No subscriber to report through
        eprintln!("bzzzbz: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.pipeline_config().context("invalid configuration")?;
    info!("BZZZBZ - initializing pipeline");

    let mut backend = TraceBackend::new(u64::from(config.render.frame_rate_hz));
    rendering::check_bindings(&backend).context("shader program incomplete")?;

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .context("failed to install signal handler")?;

    let mut pipeline = Pipeline::new(&config).context("failed to build pipeline")?;
    let result = start_producers(&mut pipeline, config.controls.full_scale)
        .and_then(|()| render_loop(&mut pipeline, &mut backend, &shutdown_rx, args.run_for()));

    // Producers stop in order (audio, then controls) before state is released
    let report = pipeline.shutdown();
    info!(
        blocks = report.blocks_published,
        control_updates = report.control_updates,
        frames = backend.frames(),
        "shut down"
    );
    result
}

fn start_producers(pipeline: &mut Pipeline, full_scale: u32) -> anyhow::Result<()> {
    pipeline
        .start_audio()
        .context("failed to start audio producer")?;
    pipeline
        .start_controls(Box::new(SimulatedAdc::new(full_scale)))
        .context("failed to start control producer")?;
    Ok(())
}

/// Tick at the configured frame rate until a signal, the run duration, or a
/// producer fault.
fn render_loop(
    pipeline: &mut Pipeline,
    backend: &mut dyn RenderBackend,
    shutdown: &crossbeam_channel::Receiver<()>,
    run_for: Option<Duration>,
) -> anyhow::Result<()> {
    let render = pipeline.config().render.clone();
    let ticker = tick(render.frame_period());
    let started = Instant::now();

    let mut staleness = StalenessTracker::new();
    let mut stats_at = Instant::now() + STATS_INTERVAL;

    info!(fps = render.frame_rate_hz, "running, press Ctrl+C to quit");

    loop {
        select! {
            recv(shutdown) -> _ => {
                info!("termination signal received");
                return Ok(());
            }
            recv(ticker) -> _ => {}
        }

        if let Some(fault) = pipeline.fault() {
            bail!("producer failed: {}", fault);
        }
        if run_for.is_some_and(|limit| started.elapsed() >= limit) {
            info!("run duration reached");
            return Ok(());
        }

        let snapshot = pipeline.tick().context("render tick failed")?;
        staleness.observe(snapshot.block_seq());
        rendering::present(backend, &snapshot, &render).context("draw failed")?;

        if Instant::now() >= stats_at {
            info!(
                ticks = staleness.ticks,
                repeated = staleness.repeats,
                skipped = staleness.skipped,
                max_skip = staleness.max_skip,
                "render/audio cadence"
            );
            staleness.reset_window();
            stats_at += STATS_INTERVAL;
        }
    }
}
