//! Durable message queue on top of PostgreSQL.
//!
//! Messages live in a single table. Producers insert a message and `NOTIFY` a
//! channel in one transaction. Consumers wait for a notification, or for a
//! timeout, and then claim one message at a time with `FOR UPDATE SKIP LOCKED`,
//! deleting it in the same transaction. Concurrent consumers never claim the
//! same message.
//!
//! Notifications are only used as a wake-up hint: they may be lost while the
//! [`Listener`] reconnects, dropped when its signal buffer is full, or coalesced
//! by the server. A [`Consumer`] therefore polls the table whenever it has not
//! been woken for a while.
//!
//! ```no_run
//! use pgsqlmq::{BoxError, Client, Message};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), pgsqlmq::Error> {
//! let client = Client::builder().schema("app").connect().await?;
//! let shutdown = CancellationToken::new();
//!
//! let listener = client.listener();
//! let listening = listener.start(shutdown.clone());
//! let consuming = client.consumer(&listener).start(shutdown.clone(), |message: Message| async move {
//!     println!("got {}", message.payload);
//!     Ok::<(), BoxError>(())
//! });
//!
//! client.append(Message::new("hello")).await?;
//!
//! shutdown.cancel();
//! listening.await??;
//! consuming.await??;
//! # Ok(())
//! # }
//! ```
//!
//! Claiming deletes the message: if a consumer crashes after the claim
//! committed, the message is gone.

mod appender;
mod claimer;
mod client;
mod consumer;
mod error;
mod listener;
mod message;
mod signal;
mod sql;
mod utils;

pub use appender::Appender;
pub use claimer::Claimer;
pub use client::{Client, ClientBuilder};
pub use consumer::{BoxError, Consumer, Handler};
pub use error::Error;
pub use listener::Listener;
pub use message::Message;
pub use signal::Signal;
