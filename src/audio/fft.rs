//! Real-input FFT magnitude analysis.

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::{PipelineError, Result};
use crate::params::{AnalysisConfig, WindowFunction};

/// Turns one sample block of length N into N/2+1 magnitudes.
///
/// The plan, window and all work buffers are allocated here once, so
/// `analyze` never allocates.
pub struct SpectralAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Per-bin magnitude scale
    scale: Vec<f32>,
}

impl SpectralAnalyzer {
    /// Plan the transform for `config.block_size` samples
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let size = config.block_size;
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);

        let window: Vec<f32> = match config.window {
            WindowFunction::Rectangular => vec![1.0; size],
            WindowFunction::Hann => (0..size).map(|i| hann_window(i, size)).collect(),
        };

        let bins = config.bins();
        let scale = if config.normalize {
            // Coherent gain of the window; DC and Nyquist have no mirror image
            let gain: f32 = window.iter().sum();
            (0..bins)
                .map(|k| {
                    let nyquist = size % 2 == 0 && k == size / 2;
                    if k == 0 || nyquist {
                        1.0 / gain
                    } else {
                        2.0 / gain
                    }
                })
                .collect()
        } else {
            vec![1.0; bins]
        };

        Ok(Self {
            input: fft.make_input_vec(),
            spectrum: fft.make_output_vec(),
            scratch: fft.make_scratch_vec(),
            fft,
            window,
            scale,
        })
    }

    /// Samples per input block (N)
    pub fn block_len(&self) -> usize {
        self.window.len()
    }

    /// Magnitudes per output frame (N/2 + 1)
    pub fn bins(&self) -> usize {
        self.scale.len()
    }

    /// Compute the magnitude spectrum of `block` into `out`.
    ///
    /// Pure function of `block`: identical input gives identical output.
    pub fn analyze(&mut self, block: &[f32], out: &mut [f32]) -> Result<()> {
        if block.len() != self.block_len() {
            return Err(PipelineError::BlockLengthMismatch {
                expected: self.block_len(),
                actual: block.len(),
            });
        }
        if out.len() != self.bins() {
            return Err(PipelineError::BlockLengthMismatch {
                expected: self.bins(),
                actual: out.len(),
            });
        }

        for ((dst, &sample), &w) in self.input.iter_mut().zip(block).zip(&self.window) {
            *dst = sample * w;
        }

        // realfft uses `input` as scratch, it is refilled every call
        self.fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .map_err(|e| PipelineError::Fft(e.to_string()))?;

        for ((dst, bin), &scale) in out.iter_mut().zip(&self.spectrum).zip(&self.scale) {
            *dst = bin.norm() * scale;
        }
        Ok(())
    }
}

/// Periodic Hann window
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / size as f32).cos())
}
