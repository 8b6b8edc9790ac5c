//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{PipelineError, Result};
use crate::params::{AudioSource, PipelineConfig, WindowFunction, CONTROL_COUNT};

/// Audio producer selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Default audio input device
    Device,
    /// Synthetic sine tone
    Tone,
    /// WAV file replay (requires --wav)
    Wav,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "bzzzbz")]
#[command(
    about = "Audio-reactive shader visuals driven by sound and three knobs",
    long_about = None
)]
pub struct Args {
    /// Audio source: device (default), tone, wav
    #[arg(long, value_enum, default_value = "device")]
    pub source: SourceKind,

    /// Tone frequency for --source tone
    #[arg(long, value_name = "HZ", default_value = "440")]
    pub tone_hz: f32,

    /// WAV file for --source wav
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Play the WAV file once instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Sample rate for synthetic sources
    #[arg(long, value_name = "HZ", default_value = "48000")]
    pub sample_rate: u32,

    /// Samples per block (FFT size)
    #[arg(long, value_name = "SAMPLES", default_value = "1024")]
    pub block_size: usize,

    /// Skip the Hann window
    #[arg(long)]
    pub rectangular: bool,

    /// Full-scale ADC reading (maps to 1.0)
    #[arg(long, value_name = "COUNTS", default_value = "1024")]
    pub full_scale: u32,

    /// Physical ADC channels for knobs A,B,C
    #[arg(long, value_name = "A,B,C", value_delimiter = ',', default_values_t = [4u8, 5, 6])]
    pub channels: Vec<u8>,

    /// Render ticks per second
    #[arg(long, value_name = "HZ", default_value = "60")]
    pub fps: u32,

    /// Viewport width passed to the shader
    #[arg(long, value_name = "PIXELS", default_value = "1080")]
    pub width: u32,

    /// Viewport height passed to the shader
    #[arg(long, value_name = "PIXELS", default_value = "1080")]
    pub height: u32,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Build and validate the pipeline configuration
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::default();

        config.analysis.block_size = self.block_size;
        if self.rectangular {
            config.analysis.window = WindowFunction::Rectangular;
        }

        config.controls.full_scale = self.full_scale;
        config.controls.channel_map = self.channel_map()?;

        config.render.frame_rate_hz = self.fps;
        config.render.viewport_width = self.width;
        config.render.viewport_height = self.height;

        config.source.sample_rate_hz = self.sample_rate;
        config.source.source = match self.source {
            SourceKind::Device => AudioSource::Device,
            SourceKind::Tone => AudioSource::Tone {
                frequency_hz: self.tone_hz,
                amplitude: 0.5,
            },
            SourceKind::Wav => AudioSource::Wav {
                path: self.wav.clone().ok_or_else(|| {
                    PipelineError::InvalidConfig("--source wav needs --wav <PATH>".to_string())
                })?,
                looping: !self.no_loop,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Auto-stop duration, if requested
    pub fn run_for(&self) -> Option<Duration> {
        self.duration
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f32)
    }

    fn channel_map(&self) -> Result<[u8; CONTROL_COUNT]> {
        self.channels.as_slice().try_into().map_err(|_| {
            PipelineError::InvalidConfig(format!(
                "expected {} channels for --channels, got {}",
                CONTROL_COUNT,
                self.channels.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["bzzzbz"]);
        let config = args.pipeline_config().unwrap();

        assert_eq!(config.analysis.block_size, 1024);
        assert_eq!(config.controls.channel_map, [4, 5, 6]);
        assert_eq!(config.controls.full_scale, 1024);
        assert_eq!(config.source.source, AudioSource::Device);
        assert!(args.run_for().is_none());
    }

    #[test]
    fn test_tone_source() {
        let argv = "bzzzbz --source tone --tone-hz 1500 --channels 0,1,2 --duration 2.5";
        let args = Args::parse_from(argv.split_whitespace());
        let config = args.pipeline_config().unwrap();

        assert_eq!(
            config.source.source,
            AudioSource::Tone {
                frequency_hz: 1500.0,
                amplitude: 0.5
            }
        );
        assert_eq!(config.controls.channel_map, [0, 1, 2]);
        assert_eq!(args.run_for(), Some(Duration::from_secs_f32(2.5)));
    }

    #[test]
    fn test_wav_without_path_rejected() {
        let args = Args::parse_from(["bzzzbz", "--source", "wav"]);
        assert!(args.pipeline_config().is_err());
    }

    #[test]
    fn test_wrong_channel_count_rejected() {
        let args = Args::parse_from(["bzzzbz", "--channels", "4,5"]);
        assert!(args.pipeline_config().is_err());
    }
}
