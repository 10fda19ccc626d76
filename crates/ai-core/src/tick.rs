#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-frame timing handed to every node ticked during one tree update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    /// Number of updates the owning tree has completed before this one.
    pub tick: u64,
    pub dt_seconds: f32,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32) -> Self {
        Self { tick, dt_seconds }
    }
}
