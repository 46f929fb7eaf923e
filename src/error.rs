use std::sync::Arc;

use thiserror::Error;

/// Enumerates all errors that this crate may return.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Sqlx PostgreSQL driver error.
    #[error("db driver error")]
    Sqlx(#[from] sqlx::Error),

    /// Application error.
    #[error("cannot process: {msg}")]
    Unprocessable {
        /// Details on what exactly went wrong.
        msg: &'static str,
    },

    /// Constraint violation in the system.
    #[error("conflict in the system: {msg}")]
    Conflict {
        /// Details on what exactly went wrong.
        msg: &'static str,
    },

    /// The notification listener gave up reconnecting.
    ///
    /// Every pending and future wait on the listener's signals
    /// resolves to this error, hence the shared cause.
    #[error("notification listener failed")]
    ListenerFailed(#[source] Arc<sqlx::Error>),

    /// A background task panicked or was aborted.
    #[error("background task failed")]
    Join(#[from] tokio::task::JoinError),
}
