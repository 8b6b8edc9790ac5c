//! Per-tick composition of the latest block, its spectrum and the controls.

use std::sync::Arc;

use crate::audio::{BlockReader, SpectralAnalyzer};
use crate::controls::{ControlChannel, ControlState};
use crate::error::{PipelineError, Result};

/// Everything the rendering backend needs for one frame.
///
/// Immutable once built; the next tick builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    block_seq: u64,
    spectrum: Box<[f32]>,
    controls: ControlState,
}

impl Snapshot {
    /// Sequence number of the sample block the spectrum was computed from
    pub fn block_seq(&self) -> u64 {
        self.block_seq
    }

    /// Magnitudes, N/2 + 1 bins
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    pub fn controls(&self) -> ControlState {
        self.controls
    }

    /// Index and magnitude of the strongest bin
    pub fn peak(&self) -> (usize, f32) {
        self.spectrum
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, v)| if v > best.1 { (i, v) } else { best })
    }
}

/// Runs once per render tick. Holds no locks of its own: exclusion is the
/// signal buffer's and the control channel's business.
pub struct FrameSynchronizer {
    reader: BlockReader,
    analyzer: SpectralAnalyzer,
    controls: Arc<ControlChannel>,
}

impl FrameSynchronizer {
    /// Fails if the buffer and the analyzer were configured for different
    /// block lengths.
    pub fn new(
        reader: BlockReader,
        analyzer: SpectralAnalyzer,
        controls: Arc<ControlChannel>,
    ) -> Result<Self> {
        if reader.block_len() != analyzer.block_len() {
            return Err(PipelineError::BlockLengthMismatch {
                expected: analyzer.block_len(),
                actual: reader.block_len(),
            });
        }
        Ok(Self {
            reader,
            analyzer,
            controls,
        })
    }

    pub fn bins(&self) -> usize {
        self.analyzer.bins()
    }

    /// Blocks published by the audio producer so far
    pub fn published_blocks(&self) -> u64 {
        self.reader.published()
    }

    /// Take the latest block, analyze it, read the controls.
    pub fn tick(&mut self) -> Result<Snapshot> {
        let block = self.reader.take_snapshot();
        let block_seq = block.seq;

        let mut spectrum = vec![0.0; self.analyzer.bins()].into_boxed_slice();
        self.analyzer.analyze(block.samples, &mut spectrum)?;

        Ok(Snapshot {
            block_seq,
            spectrum,
            controls: self.controls.current_values(),
        })
    }
}

/// Counts how far the render cadence drifts from the audio cadence.
///
/// A repeat is a tick that saw the same block as the tick before (render
/// faster than audio); a skip is a published block no tick ever saw (audio
/// faster than render). The largest skip bounds how stale a frame can be, in
/// audio periods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StalenessTracker {
    last_seq: Option<u64>,
    pub ticks: u64,
    pub repeats: u64,
    pub skipped: u64,
    pub max_skip: u64,
}

impl StalenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, block_seq: u64) {
        self.ticks += 1;
        if let Some(last) = self.last_seq {
            if block_seq == last {
                self.repeats += 1;
            } else if block_seq > last + 1 {
                let gap = block_seq - last - 1;
                self.skipped += gap;
                self.max_skip = self.max_skip.max(gap);
            }
        }
        self.last_seq = Some(block_seq);
    }

    /// Start a new measurement window, keeping the last sequence seen
    pub fn reset_window(&mut self) {
        *self = Self {
            last_seq: self.last_seq,
            ..Self::default()
        };
    }
}
