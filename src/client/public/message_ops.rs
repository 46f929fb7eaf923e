use crate::client::Client;
use crate::Error;
use crate::Message;
use std::borrow::Borrow;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

impl Client {
    /// Append a message and notify listeners.
    ///
    /// Shortcut for [`Appender::append`](crate::Appender::append).
    pub async fn append<M>(&self, message: M) -> Result<Uuid, Error>
    where
        M: Borrow<Message>,
    {
        self.appender().append(message).await
    }

    /// Claim one pending message, if any.
    ///
    /// Shortcut for [`Claimer::try_claim_one`](crate::Claimer::try_claim_one).
    pub async fn try_claim_one(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<Message>, Error> {
        self.claimer().try_claim_one(shutdown).await
    }

    /// Number of messages waiting to be claimed.
    ///
    /// Rows locked by in-flight claims are counted too.
    pub async fn pending_count(&self) -> Result<usize, Error> {
        let count: (i64,) = sqlx::query_as(&self.stmt.count_messages)
            .fetch_one(&self.pool)
            .await?;
        to_count(count.0)
    }
}

fn to_count(count: i64) -> Result<usize, Error> {
    usize::try_from(count).map_err(|e| Error::Sqlx(sqlx::Error::Decode(Box::new(e))))
}
