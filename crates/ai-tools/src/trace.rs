#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use ai_core::Blackboard;

/// One recorded node transition.
///
/// `node` is the arena index of the node inside its tree and `detail` is a
/// tag-specific payload (for exits, the result code).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub node: u32,
    pub detail: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            node: 0,
            detail: 0,
        }
    }

    pub fn with_node(mut self, node: u32) -> Self {
        self.node = node;
        self
    }

    pub fn with_detail(mut self, detail: u64) -> Self {
        self.detail = detail;
        self
    }
}

/// Destination for trace events, installed in a blackboard under
/// [`TRACE_SINK`] as a `Box<dyn TraceSink>`.
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Streams events to the `tracing` subscriber at DEBUG level.
#[derive(Debug, Default)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::debug!(
            tick = event.tick,
            node = event.node,
            detail = event.detail,
            "{}",
            event.tag
        );
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Blackboard key for collecting events in-memory (`TraceLog`).
pub const TRACE_LOG: &str = "ai_tools.trace_log";
/// Blackboard key for streaming events into a user-provided sink (`Box<dyn TraceSink>`).
pub const TRACE_SINK: &str = "ai_tools.trace_sink";

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_mut::<TraceLog>(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut::<Box<dyn TraceSink>>(TRACE_SINK) {
        sink.emit(event);
    }
}

/// True when either trace destination is installed, so callers can skip
/// building events nobody will see.
pub fn is_enabled(blackboard: &Blackboard) -> bool {
    blackboard.contains(TRACE_LOG) || blackboard.contains(TRACE_SINK)
}
