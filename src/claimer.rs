use std::sync::Arc;

use sqlx::postgres::{PgConnection, PgPool};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::sql::Statements;
use crate::{Error, Message};

/// Hands out pending messages, each to exactly one caller.
#[derive(Debug, Clone)]
pub struct Claimer {
    pool: PgPool,
    stmt: Arc<Statements>,
}

impl Claimer {
    pub(crate) fn new(pool: PgPool, stmt: Arc<Statements>) -> Self {
        Claimer { pool, stmt }
    }

    /// Claim the oldest unlocked message, removing it from the queue.
    ///
    /// The message is selected with `FOR UPDATE SKIP LOCKED` and deleted in the
    /// same transaction, so concurrent claimers never receive the same message.
    /// Returns `Ok(None)` if the queue is empty, if every pending message is
    /// locked by another claimer, or if `shutdown` was cancelled before the
    /// claim committed.
    ///
    /// Once the commit has been issued it is awaited regardless of cancellation,
    /// so a message removed from the queue is always returned.
    #[instrument(skip_all, fields(message.id = tracing::field::Empty), err)]
    pub async fn try_claim_one(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<Message>, Error> {
        if shutdown.is_cancelled() {
            return Ok(None);
        }

        let mut tx = tokio::select! {
            biased;

            _ = shutdown.cancelled() => return Ok(None),

            tx = self.pool.begin() => tx?,
        };

        // Dropping `tx` before commit rolls the claim back.
        let claimed = tokio::select! {
            biased;

            _ = shutdown.cancelled() => return Ok(None),

            claimed = self.select_and_delete(&mut *tx) => claimed?,
        };

        tx.commit().await?;

        if let Some(message) = &claimed {
            tracing::Span::current().record("message.id", message.id.as_hyphenated().to_string());
            debug!("Claimed message");
        }

        Ok(claimed)
    }

    async fn select_and_delete(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Option<Message>, sqlx::Error> {
        let maybe_message: Option<Message> = sqlx::query_as(&self.stmt.claim_one)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(message) = &maybe_message {
            sqlx::query(&self.stmt.delete_message)
                .bind(message.id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(maybe_message)
    }
}
