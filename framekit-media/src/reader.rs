//! Background frame reader with latest-wins delivery
//!
//! A single worker thread pulls frames from a shared decoder and publishes
//! only the most recent one. Consumers polling slower than the decoder skip
//! frames; consumers polling faster see the same frame again. There is no
//! queue and no backpressure.

use framekit_core::{VideoDecoder, VideoFrame};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Decoder handle shared between a caller and a background reader
pub type SharedDecoder = Arc<Mutex<Box<dyn VideoDecoder>>>;

/// Wrap a decoder so it can be handed to an [`AsyncFrameReader`]
pub fn shared_decoder(decoder: impl VideoDecoder + 'static) -> SharedDecoder {
    Arc::new(Mutex::new(Box::new(decoder)))
}

/// Default bound on how long `stop` waits for the worker
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(1);

type FrameSlot = Arc<watch::Sender<Option<VideoFrame>>>;

struct Worker {
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
    done_rx: mpsc::Receiver<()>,
}

/// Signals worker exit, including exit by unwinding
struct DoneSignal(mpsc::Sender<()>);

impl Drop for DoneSignal {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

/// Background reader publishing the latest decoded frame
///
/// The reader does not own the decoder's lifecycle: callers must stop the
/// reader before closing the decoder it wraps.
pub struct AsyncFrameReader {
    decoder: SharedDecoder,
    poll_delay: Duration,
    stop_timeout: Duration,
    slot: FrameSlot,
    worker: Option<Worker>,
}

impl AsyncFrameReader {
    /// Create a stopped reader with no inter-read delay
    pub fn new(decoder: SharedDecoder) -> Self {
        Self::with_poll_delay(decoder, Duration::ZERO)
    }

    /// Create a stopped reader that sleeps `poll_delay` after each frame
    pub fn with_poll_delay(decoder: SharedDecoder, poll_delay: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            decoder,
            poll_delay,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            slot: Arc::new(slot),
            worker: None,
        }
    }

    /// Override the bound on `stop`'s join
    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Whether the worker loop is active
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.running.load(Ordering::Acquire))
    }

    /// Launch the worker; no-op while running
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        // Worker ended on its own (end of stream); reap it.
        if let Some(worker) = self.worker.take() {
            let _ = worker.handle.join();
        }

        let running = Arc::new(AtomicBool::new(true));
        let (done_tx, done_rx) = mpsc::channel();
        let decoder = Arc::clone(&self.decoder);
        let slot = Arc::clone(&self.slot);
        let poll_delay = self.poll_delay;
        let worker_running = Arc::clone(&running);

        let spawned = thread::Builder::new()
            .name("framekit-reader".to_string())
            .spawn(move || {
                let _done = DoneSignal(done_tx);
                run_reader(decoder, slot, worker_running, poll_delay);
            });

        match spawned {
            Ok(handle) => {
                info!("Async frame reader started");
                self.worker = Some(Worker {
                    running,
                    handle,
                    done_rx,
                });
            }
            Err(e) => warn!("Async frame reader failed to spawn: {}", e),
        }
    }

    /// Stop the worker and wait for it, at most the stop timeout
    ///
    /// Once this returns no further frame is published, even if the worker
    /// is still stuck inside a decoder call.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // Flip the flag under the slot lock so an in-flight publish either
        // lands before this point or sees the flag and drops its frame.
        self.slot.send_if_modified(|_| {
            worker.running.store(false, Ordering::Release);
            false
        });

        match worker.done_rx.recv_timeout(self.stop_timeout) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = worker.handle.join();
                info!("Async frame reader stopped");
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    "Async frame reader did not exit within {:?}; detaching worker",
                    self.stop_timeout
                );
            }
        }
    }

    /// Most recently published frame, without blocking on the worker
    pub fn get_last(&self) -> Option<VideoFrame> {
        self.slot.borrow().clone()
    }

    /// Receiver notified on every published frame
    pub fn subscribe(&self) -> watch::Receiver<Option<VideoFrame>> {
        self.slot.subscribe()
    }
}

impl std::fmt::Debug for AsyncFrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFrameReader")
            .field("poll_delay", &self.poll_delay)
            .field("stop_timeout", &self.stop_timeout)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for AsyncFrameReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_reader(
    decoder: SharedDecoder,
    slot: FrameSlot,
    running: Arc<AtomicBool>,
    poll_delay: Duration,
) {
    while running.load(Ordering::Acquire) {
        let frame = {
            let mut decoder = decoder.lock();
            panic::catch_unwind(AssertUnwindSafe(|| decoder.read())).unwrap_or_else(|_| {
                warn!("Async frame reader: decoder panicked during read");
                None
            })
        };

        let Some(frame) = frame else {
            debug!("Async frame reader: no more frames");
            break;
        };

        slot.send_if_modified(|last| {
            if !running.load(Ordering::Acquire) {
                return false;
            }
            *last = Some(frame);
            true
        });

        if !poll_delay.is_zero() {
            thread::sleep(poll_delay);
        }
    }

    running.store(false, Ordering::Release);
}
