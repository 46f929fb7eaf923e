use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A unit of work stored in the queue table.
///
/// Rows are never updated: a message is inserted by an [`Appender`](crate::Appender)
/// and deleted by exactly one successful [`Claimer::try_claim_one`](crate::Claimer::try_claim_one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Time-ordered identifier, also used as the claim order.
    pub id: Uuid,

    /// Opaque payload.
    pub payload: String,
}

impl Message {
    /// Create a message with a fresh UUIDv7 identifier.
    pub fn new<P>(payload: P) -> Self
    where
        P: Into<String>,
    {
        Message {
            id: Uuid::now_v7(),
            payload: payload.into(),
        }
    }

    /// Create a message with a caller-chosen identifier.
    pub fn with_id<P>(id: Uuid, payload: P) -> Self
    where
        P: Into<String>,
    {
        Message {
            id,
            payload: payload.into(),
        }
    }
}
