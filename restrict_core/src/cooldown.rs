use std::collections::HashMap;

use restrict_runtime::ActorId;

/// Last time each actor was shown a pickup-denial message.
///
/// Walking over a restricted weapon triggers the acquisition hook every
/// frame; this keeps chat from flooding while the player stands on it.
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    last_message: HashMap<ActorId, f64>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `actor` saw a message less than `cooldown_seconds` ago.
    /// A non-positive cooldown disables suppression.
    pub fn should_suppress(&self, actor: ActorId, now: f64, cooldown_seconds: f64) -> bool {
        if cooldown_seconds <= 0.0 {
            return false;
        }
        self.last_message
            .get(&actor)
            .is_some_and(|&last| now - last < cooldown_seconds)
    }

    pub fn record_message(&mut self, actor: ActorId, now: f64) {
        self.last_message.insert(actor, now);
    }

    /// Runs on map start and round start.
    pub fn clear(&mut self) {
        self.last_message.clear();
    }

    pub fn len(&self) -> usize {
        self.last_message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_message.is_empty()
    }
}
