//! Nested, serializable descriptions of behaviour trees.
//!
//! A document carries structure only (names, depths, nesting). Runtime state
//! is never written, and loading always goes back through a [`NodeFactory`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::builder::{build_nested, TreeBuilder};
use crate::error::{BtError, Result};
use crate::factory::NodeFactory;
use crate::node::NodeId;
use crate::tree::BehaviourTree;

/// One node with its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeDocument {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub depth: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<NodeDocument>,
}

impl NodeDocument {
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NodeDocument) -> Self {
        self.children.push(child);
        self
    }

    /// Captures the subtree rooted at `id`. Returns `None` for an id the tree
    /// does not own.
    pub fn from_node(tree: &BehaviourTree, id: NodeId) -> Option<Self> {
        let node = tree.node(id)?;
        Some(Self {
            name: node.name().to_owned(),
            depth: node.depth(),
            children: node
                .children()
                .iter()
                .filter_map(|&child| Self::from_node(tree, child))
                .collect(),
        })
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// `(name, depth)` pairs in pre-order, the shape the flat builder expects.
    pub fn flatten(&self) -> Vec<(String, u32)> {
        let mut out = Vec::with_capacity(1 + self.descendant_count());
        let mut stack = vec![self];
        while let Some(doc) = stack.pop() {
            out.push((doc.name.clone(), doc.depth));
            stack.extend(doc.children.iter().rev());
        }
        out
    }
}

/// A whole tree: its name plus the root's fields at the top level.
///
/// ```yaml
/// Tree Name: patrol
/// name: C_Sequence
/// depth: 0
/// children:
///   - name: L_Wait
///     depth: 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeDocument {
    #[cfg_attr(feature = "serde", serde(rename = "Tree Name", default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub root: NodeDocument,
}

impl TreeDocument {
    pub fn new(name: impl Into<String>, root: NodeDocument) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn from_tree(tree: &BehaviourTree) -> Result<Self> {
        let root = tree
            .root_id()
            .and_then(|id| NodeDocument::from_node(tree, id))
            .ok_or(BtError::EmptyTree)?;
        Ok(Self::new(tree.name(), root))
    }

    /// Rebuilds a live tree. Entries whose node type is unknown are skipped
    /// with their subtrees.
    pub fn build(&self, factory: &NodeFactory) -> BehaviourTree {
        build_nested(factory, &self.name, &self.root)
    }

    /// Like [`TreeDocument::build`] but with an explicit builder, so callers
    /// can pick construction options.
    pub fn build_with(&self, mut builder: TreeBuilder, factory: &NodeFactory) -> BehaviourTree {
        builder.set_name(self.name.clone());
        builder.add_nested(factory, None, &self.root);
        builder.finish()
    }
}

#[cfg(feature = "serde")]
impl TreeDocument {
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|err| encode_error("yaml", err))
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|err| parse_error("yaml", err))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| encode_error("json", err))
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|err| parse_error("json", err))
    }
}

#[cfg(feature = "serde")]
pub(crate) fn encode_error(format: &str, err: impl std::fmt::Display) -> BtError {
    tracing::error!(%format, error = %err, "failed to encode behaviour tree");
    BtError::Encode(err.to_string())
}

#[cfg(feature = "serde")]
pub(crate) fn parse_error(format: &str, err: impl std::fmt::Display) -> BtError {
    tracing::error!(%format, error = %err, "failed to parse behaviour tree document");
    BtError::MalformedSource(err.to_string())
}
