//! Owned pipeline context: shared state plus both producer contexts.

use std::sync::Arc;

use tracing::info;

use crate::audio::{
    signal_buffer, spawn_tone, spawn_wav, AudioCapture, BlockWriter, SpectralAnalyzer,
    ToneGenerator, WavClip,
};
use crate::controls::{spawn_poller, AdcSource, ControlChannel};
use crate::error::{FaultLatch, PipelineError, Result};
use crate::params::{AudioSource, PipelineConfig};
use crate::producer::ProducerThread;
use crate::sync::{FrameSynchronizer, Snapshot};

/// Running audio producer
enum AudioProducer {
    /// Live input; the audio engine owns the callback thread
    Device(AudioCapture),
    /// Tone or WAV replay on our own thread
    Thread(ProducerThread),
}

/// Final counters returned by `Pipeline::shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub blocks_published: u64,
    pub control_updates: u64,
}

/// The signal buffer, analyzer and control channel, together with the
/// producers feeding them.
///
/// Each producer gets exactly the half it writes: the audio producer owns the
/// `BlockWriter`, the control poller shares the `ControlChannel` through its
/// atomics. The render context drives `tick`.
pub struct Pipeline {
    sync: FrameSynchronizer,
    controls: Arc<ControlChannel>,
    writer: Option<BlockWriter>,
    audio: Option<AudioProducer>,
    poller: Option<ProducerThread>,
    fault: FaultLatch,
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and allocate all shared state. No producer runs yet.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let (writer, reader) = signal_buffer(config.analysis.block_size);
        let analyzer = SpectralAnalyzer::new(&config.analysis)?;
        let controls = Arc::new(ControlChannel::new(&config.controls)?);
        let sync = FrameSynchronizer::new(reader, analyzer, Arc::clone(&controls))?;

        Ok(Self {
            sync,
            controls,
            writer: Some(writer),
            audio: None,
            poller: None,
            fault: FaultLatch::new(),
            config: config.clone(),
        })
    }

    /// Start the configured audio producer. Returns its sample rate.
    pub fn start_audio(&mut self) -> Result<u32> {
        let writer = self
            .writer
            .take()
            .ok_or(PipelineError::AlreadyStarted("audio"))?;
        let block_len = self.config.analysis.block_size;

        let (producer, sample_rate_hz) = match &self.config.source.source {
            AudioSource::Device => {
                let capture = AudioCapture::start(block_len, writer, self.fault.clone())?;
                let rate = capture.sample_rate_hz();
                (AudioProducer::Device(capture), rate)
            }
            AudioSource::Tone {
                frequency_hz,
                amplitude,
            } => {
                let rate = self.config.source.sample_rate_hz;
                let generator = ToneGenerator::new(*frequency_hz, *amplitude, rate);
                info!(frequency_hz, amplitude, sample_rate_hz = rate, "tone source");
                let thread = spawn_tone(generator, block_len, rate, writer)?;
                (AudioProducer::Thread(thread), rate)
            }
            AudioSource::Wav { path, looping } => {
                let clip = WavClip::open(path)?;
                let rate = clip.sample_rate_hz;
                let thread = spawn_wav(clip, block_len, *looping, writer)?;
                (AudioProducer::Thread(thread), rate)
            }
        };

        info!(
            block_size = block_len,
            sample_rate_hz,
            period_ms = block_len as f64 * 1000.0 / f64::from(sample_rate_hz),
            "audio producer started"
        );
        self.audio = Some(producer);
        Ok(sample_rate_hz)
    }

    /// Start polling `source` for control readings
    pub fn start_controls(&mut self, source: Box<dyn AdcSource>) -> Result<()> {
        if self.poller.is_some() {
            return Err(PipelineError::AlreadyStarted("control"));
        }

        let controls = &self.config.controls;
        let poller = spawn_poller(
            source,
            Arc::clone(&self.controls),
            controls.scan_channels.clone(),
            controls.poll_interval,
            self.fault.clone(),
        )?;

        info!(
            channels = ?controls.scan_channels,
            full_scale = controls.full_scale,
            "control poller started"
        );
        self.poller = Some(poller);
        Ok(())
    }

    /// One render tick
    pub fn tick(&mut self) -> Result<Snapshot> {
        self.sync.tick()
    }

    /// First fatal fault raised by a producer, if any
    pub fn fault(&self) -> Option<&str> {
        self.fault.get()
    }

    pub fn controls(&self) -> &Arc<ControlChannel> {
        &self.controls
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stop the audio producer, then the control producer, then release the
    /// shared buffers. Returns once nothing can publish any more.
    pub fn shutdown(self) -> ShutdownReport {
        let Pipeline {
            sync,
            controls,
            writer,
            audio,
            poller,
            config,
            ..
        } = self;
        let grace = config.shutdown_grace;

        match audio {
            Some(AudioProducer::Device(capture)) => capture.stop(),
            Some(AudioProducer::Thread(thread)) => thread.stop(grace),
            None => {}
        }
        info!("audio producer stopped");

        if let Some(poller) = poller {
            poller.stop(grace);
        }
        info!("control producer stopped");

        let report = ShutdownReport {
            blocks_published: sync.published_blocks(),
            control_updates: controls.update_count(),
        };

        drop(writer);
        drop(sync);
        drop(controls);
        report
    }
}
