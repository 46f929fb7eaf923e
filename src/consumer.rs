use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{Claimer, Error, Listener, Message};

/// Error type returned by message handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Processes claimed messages.
///
/// Implemented for any `Fn(Message) -> impl Future<Output = Result<(), BoxError>>`.
///
/// The message is already removed from the queue when the handler runs: an
/// error is logged and the message is not retried.
pub trait Handler: Send + Sync {
    /// Process one claimed message.
    fn handle(&self, message: Message) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<F, Fut> Handler for F
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn handle(&self, message: Message) -> impl Future<Output = Result<(), BoxError>> + Send {
        self(message)
    }
}

/// Consumption loop combining a [`Listener`] and a [`Claimer`].
///
/// The loop claims messages until the queue looks empty, then waits for a
/// signal for at most the configured wait timeout before trying again. The
/// timeout makes up for notifications lost while the listener reconnects or
/// dropped from a full signal buffer.
///
/// Any number of consumers may share one listener. Claims made by a single
/// consumer never overlap.
#[derive(Debug, Clone)]
pub struct Consumer {
    listener: Listener,
    claimer: Claimer,
    wait_timeout: Duration,
}

impl Consumer {
    pub(crate) fn new(listener: Listener, claimer: Claimer, wait_timeout: Duration) -> Self {
        Consumer {
            listener,
            claimer,
            wait_timeout,
        }
    }

    /// Spawns [`Consumer::run`] onto the current Tokio runtime.
    pub fn start<H>(&self, shutdown: CancellationToken, handler: H) -> JoinHandle<Result<(), Error>>
    where
        H: Handler + 'static,
    {
        let consumer = self.clone();
        tokio::spawn(async move { consumer.run(&shutdown, &handler).await })
    }

    /// Consume messages until `shutdown` is cancelled.
    ///
    /// Returns [`Error::ListenerFailed`] once the listener gives up. Store
    /// errors raised while claiming are logged and the claim is retried after
    /// the next wait, so a lost connection or a restarting server only pauses
    /// consumption.
    ///
    /// A message claimed while `shutdown` is being cancelled is still handed to
    /// `handler`, cancellation is honoured at the next wait.
    #[instrument(skip_all, fields(channel = %self.listener.channel()), err)]
    pub async fn run<H>(&self, shutdown: &CancellationToken, handler: &H) -> Result<(), Error>
    where
        H: Handler,
    {
        loop {
            match self.drain(shutdown, handler).await {
                Ok(()) => {}
                Err(Error::Sqlx(err)) => {
                    warn!(error = %err, "Failed to claim message, retrying after wait timeout");
                }
                Err(err) => return Err(err),
            }

            match time::timeout(self.wait_timeout, self.listener.wait_for_signal(shutdown)).await {
                Ok(Ok(Some(_))) => {
                    debug!("Woken by signal");
                }
                Ok(Ok(None)) => {
                    info!("Consumer shutting down");
                    return Ok(());
                }
                Ok(Err(err)) => {
                    return Err(err);
                }
                Err(_) => {
                    debug!("No signal within wait timeout, polling");
                }
            }
        }
    }

    async fn drain<H>(&self, shutdown: &CancellationToken, handler: &H) -> Result<(), Error>
    where
        H: Handler,
    {
        while let Some(message) = self.claimer.try_claim_one(shutdown).await? {
            let id = message.id;
            match handler.handle(message).await {
                Ok(()) => {
                    info!(message.id = %id, "Consumed message");
                }
                Err(err) => {
                    error!(message.id = %id, error = %err, "Failed to process claimed message");
                }
            }
        }
        Ok(())
    }
}
