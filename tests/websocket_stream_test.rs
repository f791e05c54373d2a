// Integration tests for the /api/ws stream over a real socket

use fieldsense::api::create_router;
use fieldsense::clock::SystemClock;
use fieldsense::sensor::{SensorStore, SensorType};
use futures::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> (SocketAddr, Arc<SensorStore>) {
    let store = Arc::new(SensorStore::with_demo_sensors(
        StdRng::seed_from_u64(31),
        Arc::new(SystemClock),
    ));
    let app = create_router(Arc::clone(&store));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, store)
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{}/api/ws", addr)).await.unwrap();
    ws
}

/// Next text frame as JSON, skipping control frames
async fn next_json(ws: &mut Client) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Skip snapshot frames until the next reading arrives
async fn next_reading(ws: &mut Client) -> serde_json::Value {
    loop {
        let msg = next_json(ws).await;
        if msg["type"] == "reading" {
            return msg;
        }
        assert_eq!(msg["type"], "sensors");
    }
}

/// Ping and wait for the pong, so every earlier client frame has been handled
async fn round_trip(ws: &mut Client) {
    ws.send(Message::Ping(b"sync".to_vec())).await.unwrap();
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for pong")
            .expect("stream ended")
            .unwrap();
        if let Message::Pong(_) = msg {
            return;
        }
    }
}

async fn wait_for_subscribers(store: &SensorStore, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while store.snapshot_subscribers() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never settled");
}

fn feature_count(msg: &serde_json::Value) -> usize {
    msg["features"]["features"].as_array().unwrap().len()
}

/// First frame is the current marker set, then one per change.
#[tokio::test]
async fn test_ws_sends_snapshot_then_changes() {
    let (addr, store) = start_server().await;
    let mut ws = connect(addr).await;

    let first = next_json(&mut ws).await;
    assert_eq!(first["type"], "sensors");
    assert_eq!(feature_count(&first), 4);

    store.add_sensor("Field A", SensorType::Ph, 53.27, 6.56);

    let second = next_json(&mut ws).await;
    assert_eq!(second["type"], "sensors");
    assert_eq!(feature_count(&second), 5);
}

/// A transmission reaches the client as a reading frame.
#[tokio::test]
async fn test_ws_forwards_readings() {
    let (addr, store) = start_server().await;
    let mut ws = connect(addr).await;
    next_json(&mut ws).await;

    store.begin_transmission("1", 61.5).unwrap();

    let reading = next_reading(&mut ws).await;
    assert_eq!(reading["sensorId"], "1");
    assert_eq!(reading["value"], 61.5);
}

/// After subscribing to one sensor, readings for others are filtered out.
#[tokio::test]
async fn test_ws_subscription_filters_readings() {
    let (addr, store) = start_server().await;
    let mut ws = connect(addr).await;
    next_json(&mut ws).await;

    let subscribe = serde_json::json!({"type": "subscribe", "sensor_id": "3"});
    ws.send(Message::Text(subscribe.to_string())).await.unwrap();
    round_trip(&mut ws).await;

    store.begin_transmission("1", 10.0).unwrap();
    store.begin_transmission("3", 7.0).unwrap();

    let reading = next_reading(&mut ws).await;
    assert_eq!(reading["sensorId"], "3");
    assert_eq!(reading["value"], 7.0);
}

/// Dropping the client without a close frame ends the server-side loop.
#[tokio::test]
async fn test_ws_abrupt_disconnect_releases_subscription() {
    let (addr, store) = start_server().await;
    let mut ws = connect(addr).await;
    next_json(&mut ws).await;
    assert_eq!(store.snapshot_subscribers(), 1);

    drop(ws);

    wait_for_subscribers(&store, 0).await;
}

/// A clean close handshake also ends the server-side loop.
#[tokio::test]
async fn test_ws_close_frame_releases_subscription() {
    let (addr, store) = start_server().await;
    let mut ws = connect(addr).await;
    next_json(&mut ws).await;
    assert_eq!(store.snapshot_subscribers(), 1);

    ws.close(None).await.unwrap();

    wait_for_subscribers(&store, 0).await;
}
