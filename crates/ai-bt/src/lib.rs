//! Behaviour tree runtime built on `ai-core`.
//!
//! Trees are assembled from named node prototypes held by a [`NodeFactory`],
//! either through the flat `(name, depth)` builder or from a nested
//! [`TreeDocument`], and advanced once per frame with
//! [`BehaviourTree::update`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod component;
pub mod document;
pub mod error;
pub mod factory;
pub mod format;
pub mod node;
pub mod nodes;
pub mod status;
pub mod tree;

pub use builder::{build_flat, build_nested, BuildOptions, TreeBuilder};
pub use component::{update_components, BehaviourTreeComponent, ComponentDocument};
pub use document::{NodeDocument, TreeDocument};
pub use error::{BtError, Result};
pub use factory::NodeFactory;
pub use format::{
    load_flat_file, load_flat_str, parse_flat, save_flat_file, write_flat, FlatEntry, FlatSource,
};
pub use node::{Behaviour, BehaviourClone, BehaviourNode, NodeId};
pub use nodes::{register_all_node_types, CheckSignal, Force, Invert, Outcome, Selector, Sequence, Wait};
pub use status::{NodeResult, NodeStatus, NodeType};
pub use tree::{BehaviourTree, NodeContext};
