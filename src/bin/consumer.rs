use clap::Parser;
use pgsqlmq::{BoxError, Client, Error, Message};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(version, about = "Consumes messages from the queue until interrupted.", long_about = None)]
struct Cli {
    /// Schema holding the queue table.
    #[arg(short, long, default_value = "pgsqlmq")]
    schema: String,

    /// Notification channel.
    #[arg(short, long, default_value = "pgsqlmq_notifications")]
    channel: String,

    /// Number of concurrent consumption loops.
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Pause between two listener sessions.
    #[arg(long, default_value_t = 60)]
    polling_interval_secs: u64,

    /// Silence after which the listener reconnects.
    #[arg(long, default_value_t = 30)]
    max_silence_secs: u64,

    /// Number of buffered notifications.
    #[arg(long, default_value_t = 64)]
    signal_capacity: usize,
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
        .polling_interval(Duration::from_secs(cli.polling_interval_secs))
        .max_silence(Duration::from_secs(cli.max_silence_secs))
        .wait_timeout(Duration::from_secs(cli.max_silence_secs))
        .signal_capacity(cli.signal_capacity)
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

    let listener = c.listener();
    let mut set = tokio::task::JoinSet::new();
    {
        let listener = listener.clone();
        let shutdown = shutdown.clone();
        set.spawn(async move { listener.run(&shutdown).await });
    }
    for worker in 0..cli.workers {
        let consumer = c.consumer(&listener);
        let shutdown = shutdown.clone();
        set.spawn(async move {
            consumer
                .run(&shutdown, &move |message: Message| async move {
                    log::info!("Worker {} consumed message {}", worker, message.id);
                    Ok::<(), BoxError>(())
                })
                .await
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(err) = res? {
            // The listener gave up or the store went away: stop everyone.
            shutdown.cancel();
            return Err(err);
        }
    }

    Ok(())
}
