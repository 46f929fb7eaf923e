use std::time::Duration;

use sqlx::postgres::PgPool;

use super::{opts, Client};
use crate::utils;
use crate::Error;

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    schema: String,
    table: String,
    channel: String,
    polling_interval: Duration,
    max_silence: Duration,
    silence_check_interval: Option<Duration>,
    signal_capacity: usize,
    wait_timeout: Duration,
    max_connect_failures: Option<usize>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        ClientBuilder {
            schema: opts::DEFAULT_SCHEMA.to_string(),
            table: opts::DEFAULT_TABLE.to_string(),
            channel: opts::DEFAULT_CHANNEL.to_string(),
            polling_interval: opts::DEFAULT_POLLING_INTERVAL,
            max_silence: opts::DEFAULT_MAX_SILENCE,
            silence_check_interval: None,
            signal_capacity: opts::DEFAULT_SIGNAL_CAPACITY,
            wait_timeout: opts::DEFAULT_WAIT_TIMEOUT,
            max_connect_failures: None,
        }
    }
}

impl ClientBuilder {
    /// Schema name.
    pub fn schema<S>(mut self, schema: S) -> Self
    where
        S: Into<String>,
    {
        self.schema = schema.into();
        self
    }

    /// Name of the queue table within the schema.
    pub fn table<S>(mut self, table: S) -> Self
    where
        S: Into<String>,
    {
        self.table = table.into();
        self
    }

    /// Notification channel used to wake up consumers.
    pub fn channel<S>(mut self, channel: S) -> Self
    where
        S: Into<String>,
    {
        self.channel = channel.into();
        self
    }

    /// Pause between two listener sessions, e.g. after a lost connection.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// For how long the listener may receive nothing before it reconnects.
    pub fn max_silence(mut self, max_silence: Duration) -> Self {
        self.max_silence = max_silence;
        self
    }

    /// How often the listener compares its silence against [`ClientBuilder::max_silence`].
    ///
    /// Defaults to the maximum silence itself and may not exceed it.
    pub fn silence_check_interval(mut self, interval: Duration) -> Self {
        self.silence_check_interval = Some(interval);
        self
    }

    /// Number of signals the listener buffers for consumers.
    ///
    /// When full, the oldest signal is dropped.
    pub fn signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity;
        self
    }

    /// Longest time a consumer waits for a signal before polling the table anyway.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Consecutive failed connection attempts after which the listener gives up.
    ///
    /// `None` (default) retries forever.
    pub fn max_connect_failures(mut self, max: Option<usize>) -> Self {
        self.max_connect_failures = max;
        self
    }

    /// Connect to the PostgreSQL server.
    ///
    /// See [`Client::connect`] for how the server address is resolved.
    pub async fn connect(self) -> Result<Client, Error> {
        let opts = self.options()?;
        let pool = utils::create_pool(None).await?;
        Ok(Client::new(pool, opts).await?)
    }

    /// Connect to the PostgreSQL server using specific url.
    ///
    /// To configure `ssl` (e.g. `sslmode=require`), you will need to build
    /// your own `Pool` and use [`ClientBuilder::with_pool`] method instead.
    pub async fn connect_to<U>(self, url: U) -> Result<Client, Error>
    where
        U: AsRef<str>,
    {
        let opts = self.options()?;
        let pool = utils::create_pool(Some(url.as_ref())).await?;
        Ok(Client::new(pool, opts).await?)
    }

    /// Bring your own pool.
    pub async fn with_pool(self, pool: PgPool) -> Result<Client, Error> {
        let opts = self.options()?;
        Ok(Client::new(pool, opts).await?)
    }

    pub(crate) fn options(self) -> Result<opts::ClientOptions, Error> {
        for ident in [&self.schema, &self.table, &self.channel] {
            if !utils::is_identifier(ident) {
                return Err(Error::Unprocessable {
                    msg: "schema, table and channel names must be plain identifiers",
                });
            }
        }
        if self.polling_interval.is_zero()
            || self.max_silence.is_zero()
            || self.wait_timeout.is_zero()
        {
            return Err(Error::Unprocessable {
                msg: "durations must be greater than zero",
            });
        }
        let silence_check_interval = self.silence_check_interval.unwrap_or(self.max_silence);
        if silence_check_interval.is_zero() || silence_check_interval > self.max_silence {
            return Err(Error::Unprocessable {
                msg: "silence check interval must be within (0, max_silence]",
            });
        }
        if self.signal_capacity == 0 {
            return Err(Error::Unprocessable {
                msg: "signal capacity must be at least 1",
            });
        }
        if self.max_connect_failures == Some(0) {
            return Err(Error::Unprocessable {
                msg: "max connect failures must be at least 1",
            });
        }

        Ok(opts::ClientOptions {
            schema: self.schema,
            table: self.table,
            listener: opts::ListenerOptions {
                channel: self.channel,
                polling_interval: self.polling_interval,
                max_silence: self.max_silence,
                silence_check_interval,
                signal_capacity: self.signal_capacity,
                max_connect_failures: self.max_connect_failures,
            },
            wait_timeout: self.wait_timeout,
        })
    }
}
