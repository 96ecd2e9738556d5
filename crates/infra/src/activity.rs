//! Activity feed: a bounded log of committed domain events.
//!
//! [`ActivityRecorder`] is registered as an after-commit handler for every
//! event type, so the feed never shows a fact that was rolled back. Live
//! subscribers (the SSE endpoint) receive entries through a broadcast channel.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use tradeerp_events::{AfterCommitHandler, DomainEvent};

/// One committed event as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub sequence: u64,
    pub event_type: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub payload: JsonValue,
}

#[derive(Debug)]
struct FeedState {
    next_sequence: u64,
    entries: VecDeque<ActivityEntry>,
}

#[derive(Debug)]
pub struct ActivityFeed {
    capacity: usize,
    state: RwLock<FeedState>,
    sender: broadcast::Sender<ActivityEntry>,
}

impl ActivityFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            capacity,
            state: RwLock::new(FeedState {
                next_sequence: 1,
                entries: VecDeque::with_capacity(capacity),
            }),
            sender,
        }
    }

    pub fn record(&self, event_type: &'static str, occurred_at: DateTime<Utc>, payload: JsonValue) {
        let entry = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let entry = ActivityEntry {
                sequence: state.next_sequence,
                event_type,
                occurred_at,
                payload,
            };
            state.next_sequence += 1;
            if state.entries.len() == self.capacity {
                state.entries.pop_front();
            }
            state.entries.push_back(entry.clone());
            entry
        };
        // No receivers is fine: nobody is streaming right now.
        let _ = self.sender.send(entry);
    }

    /// Most recent entries first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEntry> {
        self.sender.subscribe()
    }
}

/// After-commit handler that copies any serializable event into the feed.
#[derive(Debug, Clone)]
pub struct ActivityRecorder {
    feed: Arc<ActivityFeed>,
}

impl ActivityRecorder {
    pub fn new(feed: Arc<ActivityFeed>) -> Self {
        Self { feed }
    }
}

impl<E> AfterCommitHandler<E> for ActivityRecorder
where
    E: DomainEvent + Serialize,
{
    fn name(&self) -> &'static str {
        "activity.recorder"
    }

    fn handle(&self, event: &E) {
        match serde_json::to_value(event) {
            Ok(payload) => self
                .feed
                .record(event.event_type(), event.occurred_at(), payload),
            Err(e) => tracing::warn!(
                event_type = event.event_type(),
                error = %e,
                "failed to serialize event for activity feed"
            ),
        }
    }
}
