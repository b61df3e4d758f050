use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::protocol::messages::ServerMessage;

/// Latest control sample from a client. Overwritten in place; there is no
/// input queue; stale samples are simply dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub angle: f64,
    pub boost: bool,
}

/// One client session. The simulation thread reads the input sample and
/// pushes outbound payloads into the outbox; the socket itself lives in the
/// connection's own tasks, so a slow client never blocks a tick.
pub struct Conn {
    pub id: u64,
    pub color: String,
    input: Mutex<PlayerInput>,
    outbox: UnboundedSender<String>,
}

impl Conn {
    pub fn new(id: u64, color: String) -> (Arc<Self>, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Conn {
            id,
            color,
            input: Mutex::new(PlayerInput::default()),
            outbox: tx,
        });
        (conn, rx)
    }

    pub fn input(&self) -> PlayerInput {
        *self.input.lock()
    }

    pub fn set_input(&self, angle: f64, boost: bool) {
        *self.input.lock() = PlayerInput { angle, boost };
    }

    /// Serialize and queue a message. Bounded effort: an encode failure is
    /// logged, a closed outbox is left for the transport to tear down.
    pub fn send(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                let _ = self.outbox.send(json);
            }
            Err(err) => warn!(conn = self.id, %err, "failed to encode outbound message"),
        }
    }
}

/// Registry of active connections, guarded independently of the world so
/// connection churn never contends with the simulation lock.
pub struct ConnManager {
    conns: RwLock<HashMap<u64, Arc<Conn>>>,
}

impl ConnManager {
    pub fn new() -> Self {
        ConnManager {
            conns: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, conn: Arc<Conn>) {
        self.conns.write().insert(conn.id, conn);
    }

    pub fn remove(&self, id: u64) {
        self.conns.write().remove(&id);
    }

    pub fn get(&self, id: u64) -> Option<Arc<Conn>> {
        self.conns.read().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.conns.read().len()
    }

    pub fn snapshot(&self) -> Vec<Arc<Conn>> {
        self.conns.read().values().cloned().collect()
    }
}

impl Default for ConnManager {
    fn default() -> Self {
        Self::new()
    }
}
