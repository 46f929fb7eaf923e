use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::Error;

/// Hint that the queue table may have new work.
///
/// Signals carry no payload. A signal does not guarantee that a message can
/// be claimed, and a missing signal does not mean that no message was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Signal;

#[derive(Debug)]
struct State {
    buffer: VecDeque<Signal>,
    failure: Option<Arc<sqlx::Error>>,
}

/// Bounded multi-reader signal buffer which drops the oldest signal on overflow.
///
/// Only the listener pushes, so pushing never waits for readers. Each signal
/// is handed to exactly one reader.
#[derive(Debug)]
pub(crate) struct SignalQueue {
    capacity: usize,
    state: Mutex<State>,
    available: Notify,
}

impl SignalQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SignalQueue {
            capacity,
            state: Mutex::new(State {
                buffer: VecDeque::with_capacity(capacity),
                failure: None,
            }),
            available: Notify::new(),
        }
    }

    /// Buffers a signal, returning `true` if the oldest buffered signal had to be dropped.
    ///
    /// Signals pushed after the queue failed are discarded.
    pub(crate) fn push(&self, signal: Signal) -> bool {
        let dropped = {
            let mut state = self.state.lock();
            if state.failure.is_some() {
                return false;
            }
            let dropped = if state.buffer.len() >= self.capacity {
                state.buffer.pop_front().is_some()
            } else {
                false
            };
            state.buffer.push_back(signal);
            dropped
        };
        self.available.notify_one();
        dropped
    }

    /// Marks the queue terminally failed and wakes every waiting reader.
    ///
    /// The first recorded cause wins.
    pub(crate) fn fail(&self, cause: Arc<sqlx::Error>) {
        {
            let mut state = self.state.lock();
            state.buffer.clear();
            state.failure.get_or_insert(cause);
        }
        self.available.notify_waiters();
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.state.lock().failure.is_some()
    }

    fn try_take(&self) -> Result<Option<Signal>, Error> {
        let mut state = self.state.lock();
        if let Some(cause) = &state.failure {
            return Err(Error::ListenerFailed(Arc::clone(cause)));
        }
        let signal = state.buffer.pop_front();
        if signal.is_some() && !state.buffer.is_empty() {
            self.available.notify_one();
        }
        Ok(signal)
    }

    /// Waits for the next signal.
    ///
    /// Resolves to `Ok(None)` once `shutdown` is cancelled, and to
    /// [`Error::ListenerFailed`] once the queue has failed.
    pub(crate) async fn recv(&self, shutdown: &CancellationToken) -> Result<Option<Signal>, Error> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(None);
            }

            // Register interest before checking the buffer so a push in between is not missed.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(signal) = self.try_take()? {
                return Ok(Some(signal));
            }

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    return Ok(None);
                }

                _ = &mut notified => {}
            }
        }
    }
}
