// WebSocket subscriptions: snapshot push and reading fan-out

mod manager;
mod protocol;

pub use manager::ConnectionManager;
pub use protocol::{ClientMessage, ServerMessage};
