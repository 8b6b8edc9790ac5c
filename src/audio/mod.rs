//! Audio side of the pipeline.
//!
//! Producers (live input, tone, WAV replay) push fixed-size sample blocks into
//! the signal buffer; the render tick takes the latest block and runs the
//! spectral analyzer on it.

mod assembler;
mod buffer;
mod capture;
mod fft;
mod synthetic;

// Re-export public types
pub use assembler::BlockAssembler;
pub use buffer::{signal_buffer, BlockReader, BlockWriter, LatestBlock};
pub use capture::AudioCapture;
pub use fft::{hann_window, SpectralAnalyzer};
pub use synthetic::{block_period, spawn_tone, spawn_wav, ToneGenerator, WavClip};

/// Receives one complete sample block per audio period.
///
/// Called from the audio producer context: implementations must not block
/// or allocate.
pub trait SampleBlockSink: Send {
    fn on_sample_block(&mut self, block: &[f32]);
}
