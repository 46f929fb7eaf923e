use std::borrow::Borrow;
use std::sync::Arc;

use sqlx::postgres::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::sql::Statements;
use crate::{Error, Message};

/// Producer side of the queue: stores messages and notifies listeners.
#[derive(Debug, Clone)]
pub struct Appender {
    pool: PgPool,
    stmt: Arc<Statements>,
    channel: Arc<str>,
}

impl Appender {
    pub(crate) fn new(pool: PgPool, stmt: Arc<Statements>, channel: &str) -> Self {
        Appender {
            pool,
            stmt,
            channel: Arc::from(channel),
        }
    }

    /// Store a message and notify the channel within one transaction.
    ///
    /// Listeners are only notified once the message is committed and can be claimed.
    #[instrument(skip_all, fields(message.id = %message.borrow().id), err)]
    pub async fn append<M>(&self, message: M) -> Result<Uuid, Error>
    where
        M: Borrow<Message>,
    {
        let message = message.borrow();
        let mut tx = self.pool.begin().await?;
        self.append_in(&mut *tx, message).await?;
        tx.commit().await?;
        debug!("Appended message");
        Ok(message.id)
    }

    /// Store a message and notify the channel using the caller's connection.
    ///
    /// Pass an open transaction to enqueue atomically with other writes:
    /// PostgreSQL delivers the notification when that transaction commits
    /// and drops it if it rolls back.
    pub async fn append_in(&self, conn: &mut PgConnection, message: &Message) -> Result<(), Error> {
        sqlx::query(&self.stmt.insert_message)
            .bind(message.id)
            .bind(&message.payload)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                if let Some(db_error) = e.as_database_error() {
                    if db_error.is_unique_violation() {
                        return Error::Conflict {
                            msg: "message with this id already exists",
                        };
                    }
                    if db_error.code().as_deref() == Some("42P01") {
                        return Error::Unprocessable {
                            msg: "queue table does not exist",
                        };
                    }
                }
                Error::Sqlx(e)
            })?;

        sqlx::query(&self.stmt.notify)
            .bind(self.channel.as_ref())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
