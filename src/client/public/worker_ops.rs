use crate::client::Client;
use crate::{Appender, Claimer, Consumer, Listener};
use std::sync::Arc;

impl Client {
    /// Producer handle for this queue.
    pub fn appender(&self) -> Appender {
        Appender::new(
            self.pool.clone(),
            Arc::clone(&self.stmt),
            &self.opts.listener.channel,
        )
    }

    /// Claim handle for this queue.
    pub fn claimer(&self) -> Claimer {
        Claimer::new(self.pool.clone(), Arc::clone(&self.stmt))
    }

    /// A new listener with its own signal buffer.
    ///
    /// Typically one listener is started per process and shared
    /// by all of its consumers, see [`Client::consumer`].
    pub fn listener(&self) -> Listener {
        Listener::new(self.pool.clone(), self.opts.listener.clone())
    }

    /// A consumption loop fed by `listener`.
    pub fn consumer(&self, listener: &Listener) -> Consumer {
        Consumer::new(listener.clone(), self.claimer(), self.opts.wait_timeout)
    }
}
