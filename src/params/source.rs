//! Audio producer selection.

use std::path::PathBuf;

use crate::error::{PipelineError, Result};

/// Where sample blocks come from
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Default audio input device
    Device,

    /// Synthetic sine tone, useful without a microphone
    Tone { frequency_hz: f32, amplitude: f32 },

    /// Replay of a WAV file at real-time pace
    Wav { path: PathBuf, looping: bool },
}

/// Audio producer configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source: AudioSource,

    /// Sample rate for synthetic sources (Hz).
    /// Device and WAV sources use their own rate
    pub sample_rate_hz: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source: AudioSource::Device,
            sample_rate_hz: 48_000,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample rate must be > 0".to_string(),
            ));
        }
        if let AudioSource::Tone {
            frequency_hz,
            amplitude,
        } = self.source
        {
            let nyquist = self.sample_rate_hz as f32 / 2.0;
            if !(0.0..nyquist).contains(&frequency_hz) {
                return Err(PipelineError::InvalidConfig(format!(
                    "tone frequency {} Hz outside [0, {}) Hz",
                    frequency_hz, nyquist
                )));
            }
            if !(0.0..=1.0).contains(&amplitude) {
                return Err(PipelineError::InvalidConfig(format!(
                    "tone amplitude {} outside [0, 1]",
                    amplitude
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_above_nyquist_rejected() {
        let config = SourceConfig {
            source: AudioSource::Tone {
                frequency_hz: 30_000.0,
                amplitude: 0.5,
            },
            sample_rate_hz: 48_000,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(SourceConfig::default().validate().is_ok());
    }
}
