//! Latest-block exchange between the audio producer and the render tick.
//!
//! A triple buffer: the writer owns one slot, the reader owns another, and the
//! third sits in between. Publishing fills the writer's slot and swaps it into
//! the middle with a single atomic exchange; taking a snapshot swaps the
//! middle slot out only if it holds something the reader has not seen. Neither
//! side ever waits on the other, and a slot is only ever touched by the side
//! that currently owns it, so the reader always sees a whole block.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use super::SampleBlockSink;

/// Set on the middle index when it holds a block the reader has not taken
const FRESH: u8 = 0b100;
const INDEX_MASK: u8 = 0b011;

struct Slot {
    seq: u64,
    samples: Box<[f32]>,
}

struct Shared {
    slots: [UnsafeCell<Slot>; 3],
    middle: AtomicU8,
    published: AtomicU64,
    block_len: usize,
}

// SAFETY: each slot is accessed by exactly one side at a time. Ownership of a
// slot changes hands only through the AcqRel swap on `middle`, which orders
// the previous owner's accesses before the next owner's.
unsafe impl Sync for Shared {}

/// Create a signal buffer for blocks of `block_len` samples.
///
/// All slots start as silence with sequence number 0.
pub fn signal_buffer(block_len: usize) -> (BlockWriter, BlockReader) {
    let slot = || {
        UnsafeCell::new(Slot {
            seq: 0,
            samples: vec![0.0; block_len].into_boxed_slice(),
        })
    };
    let shared = Arc::new(Shared {
        slots: [slot(), slot(), slot()],
        middle: AtomicU8::new(1),
        published: AtomicU64::new(0),
        block_len,
    });

    let writer = BlockWriter {
        shared: Arc::clone(&shared),
        back: 2,
        seq: 0,
    };
    let reader = BlockReader { shared, front: 0 };
    (writer, reader)
}

/// Producer half. Owned by the audio context.
pub struct BlockWriter {
    shared: Arc<Shared>,
    back: u8,
    seq: u64,
}

impl BlockWriter {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    /// Number of blocks published so far
    pub fn published(&self) -> u64 {
        self.seq
    }

    /// Copy `block` into the shared slot. Wait-free.
    ///
    /// # Panics
    /// If `block.len()` differs from the configured block length.
    pub fn publish(&mut self, block: &[f32]) {
        self.seq += 1;

        // SAFETY: `back` is owned by this writer until the swap below.
        let slot = unsafe { &mut *self.shared.slots[self.back as usize].get() };
        slot.samples.copy_from_slice(block);
        slot.seq = self.seq;

        let previous = self.shared.middle.swap(self.back | FRESH, Ordering::AcqRel);
        self.back = previous & INDEX_MASK;
        self.shared.published.store(self.seq, Ordering::Relaxed);
    }
}

impl SampleBlockSink for BlockWriter {
    fn on_sample_block(&mut self, block: &[f32]) {
        self.publish(block);
    }
}

/// Most recent complete block, borrowed from the reader's slot
#[derive(Debug, Clone, Copy)]
pub struct LatestBlock<'a> {
    /// Publish sequence number, 0 if nothing has been published yet
    pub seq: u64,
    pub samples: &'a [f32],
}

/// Consumer half. Owned by the render context.
pub struct BlockReader {
    shared: Arc<Shared>,
    front: u8,
}

impl BlockReader {
    pub fn block_len(&self) -> usize {
        self.shared.block_len
    }

    /// Number of blocks the writer has published so far
    pub fn published(&self) -> u64 {
        self.shared.published.load(Ordering::Relaxed)
    }

    /// Most recently completed block. Never waits.
    ///
    /// Returns the same block again if nothing new was published since the
    /// previous call.
    pub fn take_snapshot(&mut self) -> LatestBlock<'_> {
        if self.shared.middle.load(Ordering::Relaxed) & FRESH != 0 {
            let previous = self.shared.middle.swap(self.front, Ordering::AcqRel);
            self.front = previous & INDEX_MASK;
        }

        // SAFETY: `front` is owned by this reader; the writer never touches it.
        let slot = unsafe { &*self.shared.slots[self.front as usize].get() };
        LatestBlock {
            seq: slot.seq,
            samples: &slot.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initial_snapshot_is_silence() {
        let (_writer, mut reader) = signal_buffer(8);
        let block = reader.take_snapshot();

        assert_eq!(block.seq, 0);
        assert_eq!(block.samples, &[0.0; 8]);
    }

    #[test]
    fn test_latest_publish_wins() {
        let (mut writer, mut reader) = signal_buffer(4);

        writer.publish(&[1.0; 4]);
        writer.publish(&[2.0; 4]);
        writer.publish(&[3.0; 4]);

        let block = reader.take_snapshot();
        assert_eq!(block.seq, 3);
        assert_eq!(block.samples, &[3.0; 4]);
        assert_eq!(writer.published(), 3);
        assert_eq!(reader.published(), 3);
    }

    #[test]
    fn test_snapshot_repeats_without_publish() {
        let (mut writer, mut reader) = signal_buffer(4);

        writer.publish(&[0.5; 4]);
        let first = reader.take_snapshot().seq;
        let second = reader.take_snapshot();

        assert_eq!(first, 1);
        assert_eq!(second.seq, 1);
        assert_eq!(second.samples, &[0.5; 4]);
    }

    #[test]
    fn test_interleaved_publish_and_take() {
        let (mut writer, mut reader) = signal_buffer(2);

        for i in 1..=10u64 {
            writer.publish(&[i as f32, -(i as f32)]);
            let block = reader.take_snapshot();
            assert_eq!(block.seq, i);
            assert_eq!(block.samples, &[i as f32, -(i as f32)]);
        }
    }

    #[test]
    #[should_panic]
    fn test_wrong_length_panics() {
        let (mut writer, _reader) = signal_buffer(4);
        writer.publish(&[1.0; 3]);
    }

    #[test]
    fn test_concurrent_blocks_never_torn() {
        const LEN: usize = 1024;
        const BLOCKS: u64 = 20_000;

        let (mut writer, mut reader) = signal_buffer(LEN);

        let producer = thread::spawn(move || {
            let mut block = vec![0.0f32; LEN];
            for marker in 1..=BLOCKS {
                block.fill(marker as f32);
                writer.publish(&block);
            }
        });

        let mut last_seq = 0;
        loop {
            let block = reader.take_snapshot();
            let marker = block.samples[0];

            assert!(
                block.samples.iter().all(|&s| s == marker),
                "torn block at seq {}",
                block.seq
            );
            assert_eq!(marker, block.seq as f32);
            assert!(block.seq >= last_seq, "sequence went backwards");
            last_seq = block.seq;

            if last_seq == BLOCKS {
                break;
            }
        }

        producer.join().unwrap();
        assert_eq!(reader.take_snapshot().seq, BLOCKS);
    }
}
