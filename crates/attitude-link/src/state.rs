use crate::types::OrientationSample;
use std::sync::Arc;
use tokio::sync::watch;

/// Latest-value register for orientation samples.
///
/// The serial reader overwrites it on every parsed line and the render tick
/// reads it without consuming. Each write replaces the whole sample, so a
/// reader never sees fields from two different writes. Handles are cheap to
/// clone and all clones share one slot.
#[derive(Clone)]
pub struct OrientationState {
    slot: Arc<watch::Sender<OrientationSample>>,
}

impl OrientationState {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(OrientationSample::default());
        Self {
            slot: Arc::new(slot),
        }
    }

    /// Replace the stored sample.
    pub fn set(&self, sample: OrientationSample) {
        self.slot.send_replace(sample);
    }

    /// Latest sample, or all zeros before the first `set`.
    pub fn get(&self) -> OrientationSample {
        *self.slot.borrow()
    }

    /// Receiver that is notified on every `set`.
    pub fn subscribe(&self) -> watch::Receiver<OrientationSample> {
        self.slot.subscribe()
    }
}

impl Default for OrientationState {
    fn default() -> Self {
        Self::new()
    }
}
