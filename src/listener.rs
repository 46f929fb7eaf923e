use std::sync::Arc;

use sqlx::postgres::{PgListener, PgPool};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::client::ListenerOptions;
use crate::signal::{Signal, SignalQueue};
use crate::Error;

/// Why a listener session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    /// Nothing was received for longer than the configured maximum silence.
    Silent,
    /// The server closed the connection.
    Disconnected,
}

/// Turns the notifications of a PostgreSQL channel into [`Signal`]s.
///
/// A listener keeps one subscribed connection at a time. The connection is
/// replaced whenever it stays silent for longer than the maximum silence
/// duration or fails, with a fixed polling interval between two sessions.
/// Notifications sent while no session is active are lost, consumers are
/// expected to poll the queue table now and then regardless.
///
/// Clones share the same signal buffer, so the listener is started once and
/// cloned into every consumer.
#[derive(Debug, Clone)]
pub struct Listener {
    pool: PgPool,
    opts: Arc<ListenerOptions>,
    signals: Arc<SignalQueue>,
}

impl Listener {
    pub(crate) fn new(pool: PgPool, opts: ListenerOptions) -> Self {
        let signals = Arc::new(SignalQueue::new(opts.signal_capacity));
        Listener {
            pool,
            opts: Arc::new(opts),
            signals,
        }
    }

    /// Name of the channel this listener subscribes to.
    pub fn channel(&self) -> &str {
        &self.opts.channel
    }

    /// Number of signals buffered and not yet taken by a reader.
    pub fn pending_signals(&self) -> usize {
        self.signals.len()
    }

    /// Whether the listener gave up and failed its signal buffer.
    pub fn is_failed(&self) -> bool {
        self.signals.is_failed()
    }

    /// Spawns [`Listener::run`] onto the current Tokio runtime.
    pub fn start(&self, shutdown: CancellationToken) -> JoinHandle<Result<(), Error>> {
        let listener = self.clone();
        tokio::spawn(async move { listener.run(&shutdown).await })
    }

    /// Waits for the next signal.
    ///
    /// Concurrent callers receive distinct signals. Returns `Ok(None)` once
    /// `shutdown` is cancelled and [`Error::ListenerFailed`] if the listener
    /// has given up reconnecting.
    pub async fn wait_for_signal(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<Signal>, Error> {
        self.signals.recv(shutdown).await
    }

    /// Maintains the channel subscription until `shutdown` is cancelled.
    ///
    /// Connection problems are retried after the polling interval. When a
    /// maximum number of consecutive connect failures is configured and
    /// reached, the signal buffer is failed and the last error is returned.
    #[instrument(skip_all, fields(channel = %self.opts.channel), err)]
    pub async fn run(&self, shutdown: &CancellationToken) -> Result<(), Error> {
        let mut failures = 0usize;

        loop {
            match self.subscribe(shutdown).await {
                Ok(None) => return Ok(()),

                Ok(Some(mut listener)) => {
                    failures = 0;
                    info!("Listening for notifications");

                    match self.watch(&mut listener, shutdown).await {
                        Ok(SessionEnd::Cancelled) => {
                            // Dropping the listener unsubscribes and releases its connection.
                            info!("Listener shutting down");
                            return Ok(());
                        }
                        Ok(SessionEnd::Silent) => {
                            info!(
                                max_silence = ?self.opts.max_silence,
                                "No notifications received, reconnecting"
                            );
                            self.teardown(listener, shutdown).await;
                        }
                        Ok(SessionEnd::Disconnected) => {
                            warn!("Listener connection lost, reconnecting");
                        }
                        Err(err) => {
                            warn!(error = %err, "Listener connection failed, reconnecting");
                        }
                    }
                }

                Err(err) => {
                    failures += 1;
                    if self
                        .opts
                        .max_connect_failures
                        .is_some_and(|max| failures >= max)
                    {
                        error!(error = %err, failures, "Giving up on notification listener");
                        let cause = Arc::new(err);
                        self.signals.fail(Arc::clone(&cause));
                        return Err(Error::ListenerFailed(cause));
                    }
                    warn!(error = %err, failures, "Failed to subscribe to channel, retrying");
                }
            }

            // Avoid thrashing connections against a struggling server.
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Listener shutting down");
                    return Ok(());
                }

                _ = time::sleep(self.opts.polling_interval) => {}
            }
        }
    }

    async fn subscribe(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<PgListener>, sqlx::Error> {
        let connect = async {
            let mut listener = PgListener::connect_with(&self.pool).await?;
            // A lost session ends here, `run` opens the next one after the polling interval.
            listener.listen(&self.opts.channel).await?;
            Ok::<_, sqlx::Error>(listener)
        };

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => Ok(None),

            listener = connect => listener.map(Some),
        }
    }

    async fn watch(
        &self,
        listener: &mut PgListener,
        shutdown: &CancellationToken,
    ) -> Result<SessionEnd, sqlx::Error> {
        let period = self.opts.silence_check_interval;
        let mut silence_check = time::interval_at(Instant::now() + period, period);
        silence_check.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_signal = Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    return Ok(SessionEnd::Cancelled);
                }

                received = listener.try_recv() => {
                    let Some(notification) = received? else {
                        return Ok(SessionEnd::Disconnected);
                    };
                    debug!(process_id = notification.process_id(), "Received notification");
                    if self.signals.push(Signal) {
                        debug!("Signal buffer full, dropped the oldest signal");
                    }
                    last_signal = Instant::now();
                }

                _ = silence_check.tick() => {
                    if last_signal.elapsed() >= self.opts.max_silence {
                        return Ok(SessionEnd::Silent);
                    }
                }
            }
        }
    }

    /// Unsubscribes a healthy session before its connection goes back to the pool.
    async fn teardown(&self, mut listener: PgListener, shutdown: &CancellationToken) {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {}

            unlistened = listener.unlisten_all() => {
                if let Err(err) = unlistened {
                    debug!(error = %err, "Failed to unsubscribe from channel");
                }
            }
        }
    }
}
