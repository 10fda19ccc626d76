//! Engine-agnostic primitives shared by behaviour-tree nodes.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod tick;

pub use blackboard::Blackboard;
pub use tick::TickContext;
