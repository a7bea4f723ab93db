use super::Session;
use crate::broker::Broker;
use crate::utils::error::ProtocolError;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream, Lines};
use tokio::time::{sleep, timeout};

fn session_pair(broker: &Broker) -> (Session<DuplexStream>, Lines<BufReader<DuplexStream>>) {
    let (client, server) = tokio::io::duplex(4096);
    let session = Session::new(broker.clone(), server, "test-peer");
    (session, BufReader::new(client).lines())
}

async fn next_line(lines: &mut Lines<BufReader<DuplexStream>>) -> Option<String> {
    timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a line")
        .expect("read failed")
}

#[tokio::test]
async fn test_session_new() {
    let broker = Broker::default();
    let (session, _lines) = session_pair(&broker);
    assert!(!session.id.is_nil());
    assert_eq!(session.peer, "test-peer");
    assert!(session.topics().is_empty());
}

#[tokio::test]
async fn test_subscribe_forwards_published_messages() {
    let broker = Broker::default();
    let (mut session, mut lines) = session_pair(&broker);

    session.subscribe("news");
    assert_eq!(session.topics(), vec!["news"]);
    assert_eq!(broker.subscriber_count("news"), 1);

    broker.publish("news", "hello world");
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("hello world"));

    session.close().await;
}

#[tokio::test]
async fn test_unsubscribe_without_subscription() {
    let broker = Broker::default();
    let (mut session, _lines) = session_pair(&broker);

    assert_eq!(
        session.unsubscribe("news"),
        Err(ProtocolError::NotSubscribed("news".to_string()))
    );
}

#[tokio::test]
async fn test_unsubscribe_removes_first_match_only() {
    let broker = Broker::default();
    let (mut session, _lines) = session_pair(&broker);

    session.subscribe("news");
    session.subscribe("sports");
    session.subscribe("news");
    assert_eq!(broker.subscriber_count("news"), 2);

    session.unsubscribe("news").expect("subscribed");
    assert_eq!(session.topics(), vec!["sports", "news"]);
    assert_eq!(broker.subscriber_count("news"), 1);

    session.unsubscribe("news").expect("subscribed");
    assert!(!broker.has_topic("news"));
    assert!(session.unsubscribe("news").is_err());

    session.close().await;
}

#[tokio::test]
async fn test_send_line_appends_newline() {
    let broker = Broker::default();
    let (session, mut lines) = session_pair(&broker);

    session.send_line("OK").await.expect("write");
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("OK"));

    session.close().await;
}

#[tokio::test]
async fn test_close_releases_everything_and_drains_queued_messages() {
    let broker = Broker::default();
    let (mut session, mut lines) = session_pair(&broker);

    session.subscribe("a");
    session.subscribe("b");
    for i in 0..3 {
        broker.publish("a", &format!("a-{i}"));
    }

    session.close().await;
    assert_eq!(broker.topic_count(), 0);

    let mut received = Vec::new();
    while let Some(line) = next_line(&mut lines).await {
        received.push(line);
    }
    assert_eq!(received, vec!["a-0", "a-1", "a-2"]);
}

#[tokio::test]
async fn test_close_completes_when_peer_is_gone() {
    let broker = Broker::default();
    let (mut session, lines) = session_pair(&broker);

    session.subscribe("news");
    drop(lines);
    broker.publish("news", "into the void");

    timeout(Duration::from_secs(2), session.close())
        .await
        .expect("close hung on a dead peer");
    assert!(!broker.has_topic("news"));
}

#[tokio::test]
async fn test_finished_forwarders_are_not_kept_around() {
    let broker = Broker::default();
    let (mut session, _lines) = session_pair(&broker);

    for _ in 0..200 {
        session.subscribe("t");
        session.unsubscribe("t").expect("subscribed");
        // let the released forwarder run to completion
        sleep(Duration::from_millis(1)).await;
    }

    assert!(session.topics().is_empty());
    assert!(session.forwarder_count() <= 2, "held {}", session.forwarder_count());
    session.close().await;
}
