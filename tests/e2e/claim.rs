use crate::utils;
use pgsqlmq::{Client, Message};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn claim_from_empty_queue() {
    let local = "claim_from_empty_queue";
    utils::drop_schema(local).await.unwrap();

    let c = Client::builder().schema(local).connect().await.unwrap();
    let claimed = c.try_claim_one(&CancellationToken::new()).await.unwrap();
    assert!(claimed.is_none());
}

#[tokio::test]
async fn claim_oldest_first() {
    let local = "claim_oldest_first";
    utils::drop_schema(local).await.unwrap();

    let c = Client::builder().schema(local).connect().await.unwrap();
    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(c.append(Message::new(format!("{i}"))).await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let shutdown = CancellationToken::new();
    for id in ids {
        let claimed = c.try_claim_one(&shutdown).await.unwrap().unwrap();
        assert_eq!(claimed.id, id);
    }
    assert!(c.try_claim_one(&shutdown).await.unwrap().is_none());
    assert_eq!(c.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn claim_with_cancelled_token() {
    let local = "claim_with_cancelled_token";
    utils::drop_schema(local).await.unwrap();

    let c = Client::builder().schema(local).connect().await.unwrap();
    c.append(Message::new("stays")).await.unwrap();

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    assert!(c.try_claim_one(&shutdown).await.unwrap().is_none());
    // nothing was removed
    assert_eq!(c.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn claim_skips_locked_messages() {
    let local = "claim_skips_locked_messages";
    utils::drop_schema(local).await.unwrap();

    let c = Client::builder().schema(local).connect().await.unwrap();
    let first = c.append(Message::new("first")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = c.append(Message::new("second")).await.unwrap();

    // hold a row lock on the first message, as an in-flight claim would
    let mut tx = c.pool().begin().await.unwrap();
    sqlx::query(&format!(
        "SELECT id FROM {local}.messages WHERE id = $1 FOR UPDATE;"
    ))
    .bind(first)
    .execute(&mut *tx)
    .await
    .unwrap();

    let shutdown = CancellationToken::new();
    let claimed = c.try_claim_one(&shutdown).await.unwrap().unwrap();
    assert_eq!(claimed.id, second);
    assert!(c.try_claim_one(&shutdown).await.unwrap().is_none());

    tx.rollback().await.unwrap();
    let claimed = c.try_claim_one(&shutdown).await.unwrap().unwrap();
    assert_eq!(claimed.id, first);
}

#[tokio::test]
async fn concurrent_claims_never_overlap() {
    let local = "concurrent_claims_never_overlap";
    utils::drop_schema(local).await.unwrap();

    let c = Client::builder().schema(local).connect().await.unwrap();
    let mut appended = HashSet::new();
    for i in 0..5 {
        appended.insert(c.append(Message::new(format!("{i}"))).await.unwrap());
    }

    // more claimers than messages
    let mut js = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let claimer = c.claimer();
        js.spawn(async move {
            claimer
                .try_claim_one(&CancellationToken::new())
                .await
                .unwrap()
        });
    }

    let mut claimed = Vec::new();
    while let Some(res) = js.join_next().await {
        if let Some(message) = res.unwrap() {
            claimed.push(message.id);
        }
    }

    // no message was handed out twice
    let unique: HashSet<_> = claimed.iter().copied().collect();
    assert_eq!(unique.len(), claimed.len());
    assert!(unique.is_subset(&appended));

    // claimers may have skipped rows locked by others, whatever is left is still claimable
    let shutdown = CancellationToken::new();
    let mut total = claimed.len();
    while let Some(message) = c.try_claim_one(&shutdown).await.unwrap() {
        assert!(!unique.contains(&message.id));
        total += 1;
    }
    assert_eq!(total, 5);
}
