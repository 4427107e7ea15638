//! Time-bounded transport.
//!
//! Sends run on a dedicated worker thread that owns the inner transport. The
//! caller waits at most the configured timeout for the worker's answer. A
//! timed-out write is not retried.
//!
//! A send that times out before the worker picks it up is cancelled and never
//! reaches the hub. A send that times out while the write is under way leaves
//! the transport stalled: later sends fail at once until that write returns,
//! so no frame is ever queued behind a stuck one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::HidTransport;
use crate::error::{MhpError, Result};
use crate::protocol::Frame;

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(500);

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;
const DONE: u8 = 3;

/// Lifecycle of one send, shared by the caller and the worker.
#[derive(Debug, Default)]
struct JobState(AtomicU8);

impl JobState {
    /// Worker side: claim the job unless the caller gave up on it.
    fn start(&self) -> bool {
        self.0
            .compare_exchange(PENDING, STARTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Caller side: withdraw a job the worker has not started.
    fn cancel(&self) -> bool {
        self.0
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self) {
        self.0.store(DONE, Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.0.load(Ordering::Acquire) == DONE
    }
}

struct Job {
    frame: Frame,
    state: Arc<JobState>,
    reply: mpsc::SyncSender<Result<()>>,
}

/// Transport whose sends fail with `Timeout` instead of blocking forever.
pub struct TimedTransport {
    jobs: mpsc::Sender<Job>,
    timeout: Duration,
    /// A timed-out write that is still running on the worker.
    stalled: Mutex<Option<Arc<JobState>>>,
}

impl TimedTransport {
    /// Start a worker that builds its transport with `factory`.
    ///
    /// The factory runs on the worker thread, so the inner transport does not
    /// need to be `Send`. A failed build is reported on the send that needed
    /// it and retried on the next one.
    pub fn spawn<T, F>(mut factory: F, timeout: Duration) -> Self
    where
        T: HidTransport + 'static,
        F: FnMut() -> Result<T> + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Job>();
        let spawned = thread::Builder::new()
            .name("mhp-hid".to_string())
            .spawn(move || {
                let mut transport: Option<T> = None;
                for job in queue {
                    if !job.state.start() {
                        debug!(frame = %job.frame, "Dropping cancelled send");
                        continue;
                    }
                    let result = match transport.as_ref() {
                        Some(inner) => inner.send(job.frame),
                        None => match factory() {
                            Ok(inner) => {
                                let result = inner.send(job.frame);
                                transport = Some(inner);
                                result
                            }
                            Err(err) => Err(err),
                        },
                    };
                    if job.reply.send(result).is_err() {
                        debug!(frame = %job.frame, "Caller stopped waiting for send result");
                    }
                    job.state.finish();
                }
                debug!("HID worker stopped");
            });
        if let Err(err) = spawned {
            // The queue's receiver is dropped, so every send reports it.
            error!(error = %err, "Failed to start HID worker");
        }
        Self {
            jobs,
            timeout,
            stalled: Mutex::new(None),
        }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True while a timed-out write has not returned yet.
    pub fn is_stalled(&self) -> bool {
        let mut stalled = self.stalled.lock();
        if stalled.as_ref().is_some_and(|job| job.is_done()) {
            debug!("Stalled HID write finished");
            *stalled = None;
        }
        stalled.is_some()
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl HidTransport for TimedTransport {
    fn send(&self, frame: Frame) -> Result<()> {
        if self.is_stalled() {
            warn!(%frame, "Hub busy with a timed-out write, frame not sent");
            return Err(MhpError::Transport(
                "hub is still busy with a previous write that timed out".to_string(),
            ));
        }

        let state = Arc::new(JobState::default());
        let (reply, answer) = mpsc::sync_channel(1);
        self.jobs
            .send(Job {
                frame,
                state: Arc::clone(&state),
                reply,
            })
            .map_err(|_| MhpError::Transport("HID worker is not running".to_string()))?;

        match answer.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let timeout_ms = self.timeout_ms();
                if state.cancel() {
                    warn!(%frame, timeout_ms, "Send timed out before it started, cancelled");
                    return Err(MhpError::Timeout { timeout_ms });
                }
                // The reply lands before the job is marked done.
                if let Ok(result) = answer.try_recv() {
                    return result;
                }
                warn!(%frame, timeout_ms, "Send timed out while writing");
                *self.stalled.lock() = Some(state);
                Err(MhpError::Timeout { timeout_ms })
            }
            Err(RecvTimeoutError::Disconnected) => Err(MhpError::Transport(
                "HID worker stopped before answering".to_string(),
            )),
        }
    }
}
