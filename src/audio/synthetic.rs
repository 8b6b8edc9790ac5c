//! Thread-driven audio producers: sine tone and WAV replay.
//!
//! Both pace themselves to real time, one block per block period, so the
//! render side sees the same cadence as from a live device.

use std::f32::consts::TAU;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::assembler::BlockAssembler;
use super::SampleBlockSink;
use crate::error::Result;
use crate::producer::{sleep_until, ProducerThread};

/// Duration of one block at a sample rate
pub fn block_period(block_len: usize, sample_rate_hz: u32) -> Duration {
    Duration::from_secs_f64(block_len as f64 / f64::from(sample_rate_hz.max(1)))
}

/// Phase-continuous sine generator
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    phase: f32,
    step: f32,
    amplitude: f32,
}

impl ToneGenerator {
    pub fn new(frequency_hz: f32, amplitude: f32, sample_rate_hz: u32) -> Self {
        Self {
            phase: 0.0,
            step: TAU * frequency_hz / sample_rate_hz as f32,
            amplitude,
        }
    }

    pub fn fill(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.amplitude * self.phase.sin();
            self.phase = (self.phase + self.step) % TAU;
        }
    }
}

/// Spawn a thread publishing a sine tone
pub fn spawn_tone<S>(
    mut generator: ToneGenerator,
    block_len: usize,
    sample_rate_hz: u32,
    mut sink: S,
) -> Result<ProducerThread>
where
    S: SampleBlockSink + 'static,
{
    let period = block_period(block_len, sample_rate_hz);
    ProducerThread::spawn("audio-tone", move |stop| {
        let mut block = vec![0.0; block_len];
        let mut deadline = Instant::now();
        loop {
            generator.fill(&mut block);
            sink.on_sample_block(&block);

            deadline += period;
            if !sleep_until(deadline, &stop) {
                break;
            }
        }
    })
}

/// Decoded WAV file, interleaved f32 in [-1, 1]
#[derive(Debug, Clone)]
pub struct WavClip {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate_hz: u32,
}

impl WavClip {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let format = reader.spec();

        let samples = match format.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (format.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        info!(
            path = %path.display(),
            sample_rate_hz = format.sample_rate,
            channels = format.channels,
            frames = samples.len() / format.channels.max(1) as usize,
            "WAV source loaded"
        );

        Ok(Self {
            samples,
            channels: format.channels.max(1) as usize,
            sample_rate_hz: format.sample_rate,
        })
    }
}

/// Spawn a thread replaying `clip` block by block
pub fn spawn_wav<S>(
    clip: WavClip,
    block_len: usize,
    looping: bool,
    sink: S,
) -> Result<ProducerThread>
where
    S: SampleBlockSink + 'static,
{
    let period = block_period(block_len, clip.sample_rate_hz);
    let chunk = block_len * clip.channels;
    ProducerThread::spawn("audio-wav", move |stop| {
        let mut assembler = BlockAssembler::new(block_len, clip.channels, sink);
        let mut deadline = Instant::now();
        let mut cursor = 0;

        while clip.samples.len() >= chunk {
            if cursor + chunk > clip.samples.len() {
                if !looping {
                    debug!("WAV source reached end of clip");
                    break;
                }
                cursor = 0;
            }
            assembler.push_interleaved(&clip.samples[cursor..cursor + chunk]);
            cursor += chunk;

            deadline += period;
            if !sleep_until(deadline, &stop) {
                break;
            }
        }
    })
}
