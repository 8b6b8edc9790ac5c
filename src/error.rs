//! Error types for the sync and analysis pipeline.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Signal buffer and analyzer disagree on the block length
    #[error("block length mismatch: expected {expected} samples, got {actual}")]
    BlockLengthMismatch { expected: usize, actual: usize },

    /// The rendering backend cannot bind a required shader uniform
    #[error("could not bind uniform '{0}'")]
    MissingUniform(String),

    /// A producer was started twice
    #[error("{0} producer already started")]
    AlreadyStarted(&'static str),

    /// No default audio input device
    #[error("no audio input device found")]
    NoInputDevice,

    /// Audio device has no usable input configuration
    #[error("failed to get audio input config: {0}")]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// Audio input stream could not be built
    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Audio input stream could not be started
    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Unsupported device sample format
    #[error("unsupported sample format: {0}")]
    SampleFormat(String),

    /// WAV source could not be opened or decoded
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// FFT processing failed
    #[error("FFT error: {0}")]
    Fft(String),

    /// ADC bus transaction failed
    #[error("ADC read failed on channel {channel}: {reason}")]
    Adc { channel: u8, reason: String },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// First fatal fault raised by a producer context.
///
/// Producers run on threads (or inside the audio engine) that cannot return
/// errors to the render loop, so they latch a diagnostic here instead. Only
/// the first fault is kept.
#[derive(Debug, Clone, Default)]
pub struct FaultLatch(Arc<OnceLock<String>>);

impl FaultLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault. Returns false if an earlier fault was already latched.
    pub fn raise(&self, message: impl Into<String>) -> bool {
        self.0.set(message.into()).is_ok()
    }

    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_latch_keeps_first() {
        let latch = FaultLatch::new();
        let shared = latch.clone();

        assert!(latch.get().is_none());
        assert!(shared.raise("audio device unplugged"));
        assert!(!latch.raise("second fault"));

        assert_eq!(latch.get(), Some("audio device unplugged"));
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineError::BlockLengthMismatch {
            expected: 1024,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "block length mismatch: expected 1024 samples, got 512"
        );
        assert_eq!(
            PipelineError::MissingUniform("fft".into()).to_string(),
            "could not bind uniform 'fft'"
        );
    }
}
