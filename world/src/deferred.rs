use std::time::Duration;

use blobsync_core::DeferredAction;

/// Fire-once actions ordered by their due time on the frame clock.
#[derive(Debug, Default)]
pub(crate) struct DeferredQueue {
    clock: Duration,
    pending: Vec<(Duration, DeferredAction)>,
}

impl DeferredQueue {
    /// Queues `action` to become due once `delay` of frame time elapsed.
    pub(crate) fn schedule(&mut self, delay: Duration, action: DeferredAction) {
        let due = self.clock.saturating_add(delay);
        let index = self.pending.partition_point(|(at, _)| *at <= due);
        self.pending.insert(index, (due, action));
    }

    /// Advances the clock and drains every action that became due, oldest first.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<DeferredAction> {
        self.clock = self.clock.saturating_add(dt);
        let ready = self.pending.partition_point(|(at, _)| *at <= self.clock);
        self.pending
            .drain(..ready)
            .map(|(_, action)| action)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
