use std::time::Duration;

pub(crate) const DEFAULT_SCHEMA: &str = "pgsqlmq";
pub(crate) const DEFAULT_TABLE: &str = "messages";
pub(crate) const DEFAULT_CHANNEL: &str = "pgsqlmq_notifications";
pub(crate) const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_MAX_SILENCE: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_SIGNAL_CAPACITY: usize = 64;
pub(crate) const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub(crate) struct ClientOptions {
    pub(crate) schema: String,
    pub(crate) table: String,
    pub(crate) listener: ListenerOptions,
    pub(crate) wait_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
            listener: ListenerOptions::default(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ListenerOptions {
    pub(crate) channel: String,
    /// Pause between two listener sessions.
    pub(crate) polling_interval: Duration,
    pub(crate) max_silence: Duration,
    pub(crate) silence_check_interval: Duration,
    pub(crate) signal_capacity: usize,
    /// Consecutive connect failures after which the listener gives up.
    pub(crate) max_connect_failures: Option<usize>,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        ListenerOptions {
            channel: DEFAULT_CHANNEL.to_string(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            max_silence: DEFAULT_MAX_SILENCE,
            silence_check_interval: DEFAULT_MAX_SILENCE,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
            max_connect_failures: None,
        }
    }
}
