use std::sync::Arc;

use sqlx::postgres::PgPool;
use tracing::debug;

use crate::sql::Statements;

mod builder;
mod opts;
mod public;

pub use builder::ClientBuilder;
pub(crate) use opts::{ClientOptions, ListenerOptions};

/// Queue client.
///
/// Cheap to clone. Hands out the [`Appender`](crate::Appender),
/// [`Claimer`](crate::Claimer), [`Listener`](crate::Listener) and
/// [`Consumer`](crate::Consumer) for its queue table and channel.
#[derive(Debug, Clone)]
pub struct Client {
    pool: PgPool,
    opts: Arc<ClientOptions>,
    stmt: Arc<Statements>,
}

impl Client {
    async fn new(pool: PgPool, opts: ClientOptions) -> Result<Self, sqlx::Error> {
        let stmt = Statements::compile(&opts.schema, &opts.table);
        let c = Client {
            pool,
            opts: Arc::new(opts),
            stmt: Arc::new(stmt),
        };
        c.install().await?;
        Ok(c)
    }

    async fn install(&self) -> Result<(), sqlx::Error> {
        debug!(
            schema = %self.opts.schema,
            table = %self.opts.table,
            "Installing queue table"
        );
        sqlx::raw_sql(&self.stmt.install).execute(&self.pool).await?;
        Ok(())
    }
}
