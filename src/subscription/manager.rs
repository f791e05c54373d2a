use crate::clock::SharedClock;
use crate::sensor::{Sensor, SensorReading};
use crate::subscription::protocol::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use std::collections::HashSet;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info, warn};

/// Manages a single WebSocket connection
pub struct ConnectionManager {
    /// Sensor IDs whose readings this connection wants
    subscriptions: HashSet<String>,
    clock: SharedClock,
}

impl ConnectionManager {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            subscriptions: HashSet::new(),
            clock,
        }
    }

    /// Handle WebSocket connection lifecycle
    ///
    /// The current snapshot goes out first, then one per change.
    pub async fn handle(
        mut self,
        mut socket: WebSocket,
        snapshot_rx: watch::Receiver<Vec<Sensor>>,
        mut reading_rx: broadcast::Receiver<SensorReading>,
    ) {
        info!("WebSocket connection established");

        let mut snapshots = WatchStream::new(snapshot_rx);

        loop {
            tokio::select! {
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_client_message(&text) {
                                warn!(error = %e, "Ignoring malformed client message");
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                Some(sensors) = snapshots.next() => {
                    let msg = ServerMessage::snapshot(&sensors, self.clock.now());
                    if let Err(e) = send(&mut socket, &msg).await {
                        error!(error = %e, "Failed to send sensor snapshot");
                        break;
                    }
                }

                result = reading_rx.recv() => {
                    match result {
                        Ok(reading) => {
                            if self.should_forward_reading(&reading) {
                                if let Err(e) = send(&mut socket, &ServerMessage::Reading(reading)).await {
                                    error!(error = %e, "Failed to send reading");
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped = skipped, "WebSocket lagged, skipped readings");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("Reading broadcast channel closed");
                            break;
                        }
                    }
                }

                else => {
                    break;
                }
            }
        }

        info!("WebSocket connection closed");
    }

    /// Handle client message (subscribe/unsubscribe)
    fn handle_client_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg {
            ClientMessage::Subscribe { sensor_id } => {
                info!(sensor_id = %sensor_id, "Client subscribed to sensor readings");
                self.subscriptions.insert(sensor_id);
            }
            ClientMessage::Unsubscribe { sensor_id } => {
                info!(sensor_id = %sensor_id, "Client unsubscribed from sensor readings");
                self.subscriptions.remove(&sensor_id);
            }
        }

        Ok(())
    }

    /// Forward everything until the client narrows its subscriptions
    fn should_forward_reading(&self, reading: &SensorReading) -> bool {
        self.subscriptions.is_empty() || self.subscriptions.contains(&reading.sensor_id)
    }
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
