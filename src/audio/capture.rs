//! Audio capture from the default input device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use tracing::{error, info};

use super::assembler::BlockAssembler;
use super::SampleBlockSink;
use crate::error::{FaultLatch, PipelineError, Result};

/// Live input stream feeding a sample block sink
pub struct AudioCapture {
    /// Audio input stream (kept alive)
    stream: cpal::Stream,
    sample_rate_hz: u32,
}

impl AudioCapture {
    /// Open the default input device and start delivering blocks of
    /// `block_len` samples to `sink` from the audio callback.
    ///
    /// Stream errors after startup are latched into `fault`.
    pub fn start<S>(block_len: usize, sink: S, fault: FaultLatch) -> Result<Self>
    where
        S: SampleBlockSink + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(PipelineError::NoInputDevice)?;

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz = config.sample_rate.0,
            channels = config.channels,
            ?sample_format,
            "audio input opened"
        );

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32, S>(&device, &config, block_len, sink, fault)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16, S>(&device, &config, block_len, sink, fault)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16, S>(&device, &config, block_len, sink, fault)?
            }
            other => return Err(PipelineError::SampleFormat(format!("{:?}", other))),
        };

        stream.play()?;

        Ok(Self {
            stream,
            sample_rate_hz: config.sample_rate.0,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Stop the stream. Once this returns the callback will not run again.
    pub fn stop(self) {
        if let Err(e) = self.stream.pause() {
            error!("failed to pause audio stream: {}", e);
        }
        drop(self.stream);
    }
}

fn build_stream<T, S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    block_len: usize,
    sink: S,
    fault: FaultLatch,
) -> Result<cpal::Stream>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
    S: SampleBlockSink + 'static,
{
    let mut assembler = BlockAssembler::new(block_len, config.channels as usize, sink);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            assembler.push_interleaved(data);
        },
        move |err| {
            error!("audio stream error: {}", err);
            fault.raise(format!("audio stream error: {}", err));
        },
        None,
    )?;
    Ok(stream)
}
