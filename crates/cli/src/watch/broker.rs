//! Publish/subscribe broker for live graph snapshots.
//!
//! Distribution rides on `tokio::sync::watch`: every subscriber holds a
//! single slot that publishes overwrite without blocking, so a slow
//! client only ever observes the latest payload (strictly last-wins).
//! History and dedupe state are serialized by one mutex.

use serde::Serialize;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

const MAX_SNAPSHOTS: usize = 250;

#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub id: u64,
    pub timestamp_ms: u64,
    pub dot: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct GraphStreamPayload {
    pub snapshots: Vec<GraphSnapshot>,
    pub latest_id: u64,
}

#[derive(Default)]
struct BrokerState {
    history: Vec<GraphSnapshot>,
    next_snapshot_id: u64,
}

pub struct Broker {
    state: Mutex<BrokerState>,
    sender: watch::Sender<GraphStreamPayload>,
}

impl Broker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(GraphStreamPayload::default());
        Broker {
            state: Mutex::new(BrokerState::default()),
            sender,
        }
    }

    /// Register a client. The receiver's slot starts out holding the
    /// current payload.
    pub fn subscribe(&self) -> watch::Receiver<GraphStreamPayload> {
        self.sender.subscribe()
    }

    /// Publish a new rendering. Identical consecutive payloads are
    /// dropped; history is capped to the most recent snapshots.
    pub fn publish(&self, dot: String) {
        let mut state = self.state.lock().expect("broker mutex poisoned");

        if state.history.last().is_some_and(|last| last.dot == dot) {
            return;
        }

        state.next_snapshot_id += 1;
        let snapshot = GraphSnapshot {
            id: state.next_snapshot_id,
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            dot,
        };
        state.history.push(snapshot);
        if state.history.len() > MAX_SNAPSHOTS {
            let excess = state.history.len() - MAX_SNAPSHOTS;
            state.history.drain(..excess);
        }

        // send_replace delivers even with no subscribers yet; late
        // subscribers pick the value up from the slot.
        self.sender.send_replace(current_payload(&state));
    }

    pub fn snapshot(&self) -> GraphStreamPayload {
        let state = self.state.lock().expect("broker mutex poisoned");
        current_payload(&state)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

fn current_payload(state: &BrokerState) -> GraphStreamPayload {
    GraphStreamPayload {
        snapshots: state.history.clone(),
        latest_id: state.history.last().map(|s| s.id).unwrap_or(0),
    }
}
