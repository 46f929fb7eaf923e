use crate::utils::{self, POSRGRES_URL};
use pgsqlmq::{Client, Error};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

#[tokio::test]
async fn simple_connect() {
    utils::drop_schema("pgsqlmq").await.unwrap();
    // This will crate `pgsqlmq` schema, which is does not
    // allow us to isolate tests properly, so we only use it
    // once in this test - sanity check.
    //
    // We are also leaving it behind to able to inspect the db with psql.
    let c = Client::connect().await.unwrap();
    assert_eq!(c.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn connect_to() {
    let local = "connect_to";
    let c = Client::builder()
        .schema(local)
        .connect_to(POSRGRES_URL.as_str())
        .await
        .unwrap();
    assert_eq!(c.pending_count().await.unwrap(), 0);
    utils::drop_schema(local).await.unwrap();
}

// On CI - when running on Ubuntu with our postgres service with TLS enabled - use '--include-ignored'
// to run this test, just like we do with `make test` and `make test/cov`
#[ignore = "this test requires a dedicated test run aganst PostgreSQL server with TLS enabled"]
#[tokio::test]
async fn bring_your_own_pool() {
    let local = "bring_your_own_pool";
    let url = format!("{}?sslmode=require", POSRGRES_URL.as_str());
    let p = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();
    let _c = Client::builder().schema(local).with_pool(p).await.unwrap();
    utils::drop_schema(local).await.unwrap();
}

#[tokio::test]
async fn instantiated_idempotently() {
    let local = "instantiated_idempotently";

    // as if N containers from a ReplicaSet are performing bootstrapping
    let mut js = tokio::task::JoinSet::new();
    for _ in 0..20 {
        js.spawn(async move {
            Client::builder().schema(local).connect().await.unwrap();
        });
    }

    // wait for all the tasks to complete
    while let Some(res) = js.join_next().await {
        res.unwrap()
    }

    utils::drop_schema(local).await.unwrap();
}

#[tokio::test]
async fn installed_next_to_existing_table() {
    let local = "installed_next_to_existing_table";
    utils::drop_schema(local).await.unwrap();

    let first = Client::builder()
        .schema(local)
        .table("first")
        .connect()
        .await
        .unwrap();
    first.append(pgsqlmq::Message::new("kept")).await.unwrap();

    // a second table in the same schema leaves the first one alone
    let second = Client::builder()
        .schema(local)
        .table("second")
        .connect()
        .await
        .unwrap();
    assert_eq!(second.pending_count().await.unwrap(), 0);
    assert_eq!(first.pending_count().await.unwrap(), 1);

    // and so does installing the first one again
    let again = Client::builder()
        .schema(local)
        .table("first")
        .connect()
        .await
        .unwrap();
    assert_eq!(again.pending_count().await.unwrap(), 1);

    utils::drop_schema(local).await.unwrap();
}

#[tokio::test]
async fn invalid_configuration_is_rejected_before_connecting() {
    let err = Client::builder()
        .schema("bad schema")
        .connect_to("postgres://127.0.0.1:1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unprocessable { .. }));

    let err = Client::builder()
        .max_silence(Duration::from_secs(1))
        .silence_check_interval(Duration::from_secs(2))
        .connect_to("postgres://127.0.0.1:1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unprocessable { .. }));
}

#[tokio::test]
async fn instantiated_idempotently_regardless_of_case() {
    let local = "mixed_case_install";

    // the server folds unquoted names, so these all target one table
    let mut js = tokio::task::JoinSet::new();
    for i in 0..20 {
        let schema = if i % 2 == 0 { "Mixed_Case_Install" } else { local };
        js.spawn(async move {
            Client::builder()
                .schema(schema)
                .table("Messages")
                .connect()
                .await
                .unwrap();
        });
    }
    while let Some(res) = js.join_next().await {
        res.unwrap()
    }

    utils::drop_schema(local).await.unwrap();
}
