//! Hardware-control producer loop.

use std::ops::Range;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::error;

use super::{AdcSource, ChannelReadingSink};
use crate::error::{FaultLatch, Result};
use crate::producer::ProducerThread;

/// Spawn the poll loop: sweep `channels` on `source`, forward every reading to
/// `sink`, pause `interval`, repeat until stopped.
///
/// A failed read is fatal: the fault is latched and the loop exits.
pub fn spawn_poller<S>(
    mut source: Box<dyn AdcSource>,
    sink: Arc<S>,
    channels: Range<u8>,
    interval: Duration,
    fault: FaultLatch,
) -> Result<ProducerThread>
where
    S: ChannelReadingSink + ?Sized + 'static,
{
    ProducerThread::spawn("control-poll", move |stop| {
        while !stop.is_stopped() {
            for channel in channels.clone() {
                match source.read_channel(channel) {
                    Ok(raw) => sink.on_channel_reading(channel, raw),
                    Err(e) => {
                        error!(channel, "control bus read failed: {}", e);
                        fault.raise(e.to_string());
                        return;
                    }
                }
            }
            thread::sleep(interval);
        }
    })
}
