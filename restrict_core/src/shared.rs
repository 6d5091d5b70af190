use std::sync::Arc;

use parking_lot::Mutex;
use restrict_runtime::{AcquireEvent, AcquireResponse, CommandPayload};

use crate::config::RestrictConfig;
use crate::engine::{CommandReply, EngineError, RestrictEngine};

/// Engine handle for hosts that deliver events from more than one thread.
///
/// One mutex guards the whole engine, so a map-start reconfiguration or an
/// admin command is never observed half-applied by an evaluation.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<RestrictEngine>>,
}

impl SharedEngine {
    pub fn new(engine: RestrictEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn from_config(config: Arc<RestrictConfig>) -> Self {
        Self::new(RestrictEngine::new(config))
    }

    pub fn handle_acquire(&self, event: &AcquireEvent) -> Result<AcquireResponse, EngineError> {
        self.inner.lock().handle_acquire(event)
    }

    pub fn apply_command(&self, payload: CommandPayload) -> Result<CommandReply, EngineError> {
        self.inner.lock().apply_command(payload)
    }

    pub fn on_map_start(&self, map_name: Option<&str>) {
        self.inner.lock().on_map_start(map_name);
    }

    pub fn on_round_start(&self) {
        self.inner.lock().on_round_start();
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut RestrictEngine) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}
