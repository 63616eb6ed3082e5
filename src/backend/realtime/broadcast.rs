/**
 * Real-time Event Broadcasting
 *
 * Manages per-conversation broadcast channels for real-time delivery.
 * Each conversation gets its own channel so subscribers never receive
 * cross-talk from conversations they did not subscribe to.
 *
 * Events are broadcast using `tokio::sync::broadcast`: every active
 * subscriber of a conversation receives a copy of each event. A send
 * with no subscribers is not an error — the durable state is already
 * committed before anything is broadcast.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::ChatEvent;

/// Channel capacity per conversation. A subscriber that lags this far
/// behind misses events and must rely on its next snapshot.
const CHANNEL_CAPACITY: usize = 100;

/// Broadcast state for chat conversations
#[derive(Clone)]
pub struct ChatBroadcast {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<ChatEvent>>>>,
}

impl Default for ChatBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatBroadcast {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a conversation
    fn sender(&self, conversation_id: Uuid) -> broadcast::Sender<ChatEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a conversation's events
    pub fn subscribe(&self, conversation_id: Uuid) -> broadcast::Receiver<ChatEvent> {
        self.sender(conversation_id).subscribe()
    }

    /// Broadcast an event to all subscribers of its conversation
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: ChatEvent) -> usize {
        let conversation_id = event.conversation_id();
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(&conversation_id).cloned()
        };
        match sender {
            Some(sender) => match sender.send(event) {
                Ok(count) => {
                    tracing::debug!(
                        "[Realtime] Event broadcast to {} subscribers of {}",
                        count,
                        conversation_id
                    );
                    count
                }
                Err(_) => 0,
            },
            // Nobody ever subscribed to this conversation
            None => 0,
        }
    }

    /// Drop channels with no remaining subscribers
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Subscriber count for a conversation
    pub fn subscriber_count(&self, conversation_id: Uuid) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(&conversation_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}
