//! Tooling primitives for behaviour-tree debugging.
//!
//! Trace events are recorded during ticks and later rendered by inspectors or
//! the command-line simulator. Nothing here affects tick semantics.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    emit, is_enabled, LogTraceSink, TraceEvent, TraceLog, TraceSink, TRACE_LOG,
    TRACE_SINK,
};
