//! Stoppable producer threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::Result;

/// Stop flag shared between a producer loop and its owner
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle to a named producer thread running until its stop signal is set
pub struct ProducerThread {
    name: &'static str,
    stop: StopSignal,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProducerThread {
    /// Spawn `body` on a named thread. The body must return soon after
    /// the signal it is given reports stopped.
    pub fn spawn<F>(name: &'static str, body: F) -> Result<Self>
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let stop = StopSignal::new();
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(thread_stop))?;

        debug!(producer = name, "producer thread started");
        Ok(Self {
            name,
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Signal the thread to exit and join it.
    ///
    /// Waits up to `grace` for the loop to notice the signal; a thread still
    /// running after that is reported and then joined regardless, since shared
    /// state must not be released while it may still be publishing.
    pub fn stop(mut self, grace: Duration) {
        self.stop.stop();

        let Some(handle) = self.handle.take() else {
            return;
        };

        let deadline = Instant::now() + grace;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        if !handle.is_finished() {
            warn!(
                producer = self.name,
                grace_ms = grace.as_millis() as u64,
                "producer did not stop within grace period"
            );
        }

        if handle.join().is_err() {
            warn!(producer = self.name, "producer thread panicked");
        }
        debug!(producer = self.name, "producer thread stopped");
    }
}

impl Drop for ProducerThread {
    fn drop(&mut self) {
        // Dropped without `stop`: still make the loop exit
        self.stop.stop();
    }
}

/// Sleep until `deadline` unless stopped first. Returns false if stopped.
pub(crate) fn sleep_until(deadline: Instant, stop: &StopSignal) -> bool {
    const SLICE: Duration = Duration::from_millis(5);
    loop {
        if stop.is_stopped() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_stop_joins_loop() {
        let counter = Arc::new(AtomicU64::new(0));
        let thread_counter = Arc::clone(&counter);

        let producer = ProducerThread::spawn("test-producer", move |stop| {
            while !stop.is_stopped() {
                thread_counter.fetch_add(1, Ordering::Relaxed);
                thread::sleep(Duration::from_micros(100));
            }
        })
        .unwrap();

        thread::sleep(Duration::from_millis(10));
        producer.stop(Duration::from_millis(200));

        let after_stop = counter.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(counter.load(Ordering::Relaxed), after_stop);
        assert!(after_stop > 0);
    }

    #[test]
    fn test_sleep_until_interrupted() {
        let stop = StopSignal::new();
        stop.stop();
        let start = Instant::now();
        assert!(!sleep_until(start + Duration::from_secs(5), &stop));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
