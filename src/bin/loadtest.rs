use clap::Parser;
use pgsqlmq::{BoxError, Client, Error, Message};
use std::sync::{atomic, Arc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

lazy_static::lazy_static! {
    static ref SCHEMA_NAME: String = format!("schema_{}", uuid::Uuid::new_v4().as_simple());
}

#[derive(Parser)]
#[command(version, about = "Loadtest for the PostgreSQL message queue.", long_about = None)]
struct Cli {
    #[arg(short, long, default_value_t = 30_000)]
    messages_count: usize,

    #[arg(short, long, default_value_t = 10)]
    producers_count: usize,

    #[arg(short, long, default_value_t = 10)]
    consumers_count: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    log::info!(
        "Running a loadtest with the following settings: messages_count={}, producers_count={}, consumers_count={}. Schema name will be {}",
        cli.messages_count,
        cli.producers_count,
        cli.consumers_count,
        SCHEMA_NAME.as_str()
    );

    let messages_sent = Arc::new(atomic::AtomicUsize::new(0));
    let messages_consumed = Arc::new(atomic::AtomicUsize::new(0));

    let c = Client::builder()
        .schema(SCHEMA_NAME.as_str())
        .wait_timeout(Duration::from_millis(500))
        .connect()
        .await?;

    let shutdown = CancellationToken::new();
    let listener = c.listener();
    let listening = listener.start(shutdown.clone());

    let start = std::time::Instant::now();

    let mut consumers = tokio::task::JoinSet::new();
    for _ in 0..cli.consumers_count {
        let consumed = messages_consumed.clone();
        let consumer = c.consumer(&listener);
        let shutdown = shutdown.clone();
        consumers.spawn(async move {
            consumer
                .run(&shutdown, &move |_message: Message| {
                    consumed.fetch_add(1, atomic::Ordering::SeqCst);
                    async { Ok::<(), BoxError>(()) }
                })
                .await
        });
    }

    let mut producers = tokio::task::JoinSet::new();
    for _ in 0..cli.producers_count {
        let messages_sent = messages_sent.clone();
        let appender = c.appender();
        producers.spawn(async move {
            while messages_sent.fetch_add(1, atomic::Ordering::SeqCst) < cli.messages_count {
                appender.append(Message::new("{\"key\":\"value\"}")).await?;
            }
            Ok::<(), Error>(())
        });
    }
    while let Some(res) = producers.join_next().await {
        res??;
    }

    while messages_consumed.load(atomic::Ordering::SeqCst) < cli.messages_count {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let time_elapsed = start.elapsed();
    let seconds_elapsed = time_elapsed.as_secs_f64();

    shutdown.cancel();
    while let Some(res) = consumers.join_next().await {
        res??;
    }
    listening.await??;

    log::info!(
        "Sent and consumed {} messages in {:.2} seconds, rate: {} messages per second.",
        messages_consumed.load(atomic::Ordering::SeqCst),
        seconds_elapsed,
        cli.messages_count as f64 / seconds_elapsed,
    );

    Ok(())
}
