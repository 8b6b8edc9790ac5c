//! Spectral analysis configuration.

use crate::error::{PipelineError, Result};

/// Window applied to a sample block before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// No window (plain DFT of the block)
    Rectangular,

    /// Hann window, trades bin leakage for a slightly wider main lobe
    #[default]
    Hann,
}

/// Spectral analysis configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Samples per block (N). Fixed for the process lifetime.
    /// Matches the audio engine period, 1024 frames @ 48kHz by default
    pub block_size: usize,

    /// Window applied before the transform
    pub window: WindowFunction,

    /// Scale magnitudes so a full-scale sine peaks near 1.0.
    /// When false, raw |X[k]| values are produced.
    pub normalize: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            window: WindowFunction::Hann,
            normalize: true,
        }
    }
}

impl AnalysisConfig {
    /// Number of magnitude bins produced per block (N/2 + 1)
    pub fn bins(&self) -> usize {
        self.block_size / 2 + 1
    }

    /// Convert frequency (Hz) to bin index for a given sample rate
    pub fn hz_to_bin(&self, hz: f32, sample_rate_hz: u32) -> usize {
        ((hz * self.block_size as f32) / sample_rate_hz as f32).round() as usize
    }

    /// Centre frequency (Hz) of a bin for a given sample rate
    pub fn bin_to_hz(&self, bin: usize, sample_rate_hz: u32) -> f32 {
        bin as f32 * sample_rate_hz as f32 / self.block_size as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "block size must be at least 2 samples, got {}",
                self.block_size
            )));
        }
        Ok(())
    }
}
