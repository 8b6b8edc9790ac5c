//! Fixed-size block assembly from variable-size interleaved buffers.

use cpal::{FromSample, Sample};

use super::SampleBlockSink;

/// Downmixes interleaved frames to mono and hands exactly-N sample blocks
/// to a sink. Allocation happens once, in `new`.
pub struct BlockAssembler<S> {
    pending: Vec<f32>,
    block_len: usize,
    channels: usize,
    sink: S,
}

impl<S: SampleBlockSink> BlockAssembler<S> {
    pub fn new(block_len: usize, channels: usize, sink: S) -> Self {
        Self {
            pending: Vec::with_capacity(block_len),
            block_len,
            channels: channels.max(1),
            sink,
        }
    }

    /// Feed an interleaved buffer; emits zero or more complete blocks.
    /// A trailing partial frame is dropped.
    pub fn push_interleaved<T>(&mut self, data: &[T])
    where
        T: Sample,
        f32: FromSample<T>,
    {
        let gain = 1.0 / self.channels as f32;
        for frame in data.chunks_exact(self.channels) {
            let mono: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() * gain;
            self.pending.push(mono);

            if self.pending.len() == self.block_len {
                self.sink.on_sample_block(&self.pending);
                self.pending.clear();
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<Vec<f32>>);

    impl SampleBlockSink for Collect {
        fn on_sample_block(&mut self, block: &[f32]) {
            self.0.push(block.to_vec());
        }
    }

    #[test]
    fn test_blocks_span_callbacks() {
        let mut assembler = BlockAssembler::new(4, 1, Collect::default());

        assembler.push_interleaved(&[1.0f32, 2.0, 3.0]);
        assert!(assembler.sink().0.is_empty());

        assembler.push_interleaved(&[4.0f32, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(
            assembler.sink().0,
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]
        );
    }

    #[test]
    fn test_stereo_downmix() {
        let mut assembler = BlockAssembler::new(2, 2, Collect::default());
        assembler.push_interleaved(&[1.0f32, 0.0, 0.5, 0.5]);
        assert_eq!(assembler.sink().0, vec![vec![0.5, 0.5]]);
    }

    #[test]
    fn test_integer_samples_converted() {
        let mut assembler = BlockAssembler::new(2, 1, Collect::default());
        assembler.push_interleaved(&[0i16, i16::MIN]);
        assert_eq!(assembler.sink().0, vec![vec![0.0, -1.0]]);
    }
}
