use clap::Parser;
use pgsqlmq::{Client, Error, Message};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(version, about = "Appends a message to the queue at a fixed interval until interrupted.", long_about = None)]
struct Cli {
    /// Schema holding the queue table.
    #[arg(short, long, default_value = "pgsqlmq")]
    schema: String,

    /// Notification channel.
    #[arg(short, long, default_value = "pgsqlmq_notifications")]
    channel: String,

    /// Pause between two messages.
    #[arg(short, long, default_value_t = 1_000)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let c = Client::builder()
        .schema(cli.schema)
        .channel(cli.channel)
        .connect()
        .await?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    let appender = c.appender();
    let mut interval = tokio::time::interval(Duration::from_millis(cli.interval_ms));
    let mut seq: u64 = 0;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }
        seq += 1;
        let payload = json!({ "seq": seq }).to_string();
        let id = appender.append(Message::new(payload)).await?;
        log::info!("Appended message {} (#{})", id, seq);
    }

    log::info!("Appended {} messages, bye", seq);
    Ok(())
}
