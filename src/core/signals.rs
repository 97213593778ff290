//! Readiness signals the sequencer races on before a fetch cascade.

use std::time::Duration;
use tokio::sync::Notify;

/// The two readiness notifications produced by the host application.
///
/// Before a fetch cascade the sequencer waits for whichever of the two fires
/// first, bounded by an explicit timeout. A signal arriving while no cycle is
/// waiting stores a permit, so the next wait returns immediately.
#[derive(Debug, Default)]
pub struct ReadinessSignals {
    loading_entities: Notify,
    dependency_map: Notify,
}

impl ReadinessSignals {
    pub fn new() -> Self {
        ReadinessSignals::default()
    }

    /// Signal that the set of loading entities has been updated.
    pub fn notify_loading_entities_updated(&self) {
        self.loading_entities.notify_one();
    }

    /// Signal that the inverse dependency map has been updated.
    pub fn notify_dependency_map_updated(&self) {
        self.dependency_map.notify_one();
    }

    /// Wait for either signal, whichever fires first.
    ///
    /// Returns `true` when a signal fired and `false` when the timeout
    /// elapsed.
    pub async fn wait_any(&self, timeout: Duration) -> bool {
        tokio::select! {
            _ = self.loading_entities.notified() => true,
            _ = self.dependency_map.notified() => true,
            _ = tokio::time::sleep(timeout) => false,
        }
    }
}
