#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::document::NodeDocument;
use crate::error::{BtError, Result};
use crate::factory::NodeFactory;
use crate::node::{BehaviourNode, NodeId};
use crate::tree::BehaviourTree;

/// Knobs for tree construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BuildOptions {
    /// Reject insertions that land more than one level below their
    /// attachment point instead of attaching them as-is.
    pub reject_depth_skips: bool,
}

/// Assembles a [`BehaviourTree`] one node at a time.
///
/// The builder remembers the most recently attached node so that a flat,
/// pre-order list of `(name, depth)` entries can be turned back into a
/// hierarchy. That scratch state is dropped by [`TreeBuilder::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: BehaviourTree,
    previous: Option<NodeId>,
    options: BuildOptions,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            tree: BehaviourTree::with_name(name),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.tree.set_name(name);
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    pub fn previous_node(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn tree(&self) -> &BehaviourTree {
        &self.tree
    }

    /// Attaches `child` at `depth`.
    ///
    /// Depth 0 installs the root. Otherwise the attachment point starts at
    /// `parent_hint` (or the previously attached node): a deeper entry becomes
    /// its child, a shallower or equal entry walks up the ancestors to the
    /// first one strictly shallower than `depth`.
    pub fn add_node(
        &mut self,
        parent_hint: Option<NodeId>,
        mut child: BehaviourNode,
        depth: u32,
    ) -> Result<NodeId> {
        if depth == 0 {
            if self.tree.root_id().is_some() {
                tracing::error!(node = %child.name(), "root node already exists");
                return Err(BtError::InvalidRoot(child.name().to_owned()));
            }
            let id = self.tree.set_root_node(child);
            self.previous = Some(id);
            return Ok(id);
        }

        let Some(hint) = parent_hint.or(self.previous) else {
            tracing::error!(node = %child.name(), depth, "no valid parent for depth");
            return Err(BtError::NoValidParent { depth });
        };
        let Some(hint_depth) = self.tree.node(hint).map(BehaviourNode::depth) else {
            tracing::error!(node = %child.name(), depth, %hint, "parent hint is not part of this tree");
            return Err(BtError::NoValidParent { depth });
        };

        let parent = if depth > hint_depth {
            if self.options.reject_depth_skips && depth > hint_depth + 1 {
                tracing::error!(
                    node = %child.name(),
                    depth,
                    parent_depth = hint_depth,
                    "depth skips a level"
                );
                return Err(BtError::DepthSkip {
                    depth,
                    parent_depth: hint_depth,
                });
            }
            hint
        } else {
            self.shallower_ancestor(hint, depth)?
        };

        child.set_depth(depth);
        let id = self.tree.add_child(parent, child)?;
        self.previous = Some(id);
        Ok(id)
    }

    /// Creates `name` through `factory` and attaches it like [`Self::add_node`].
    pub fn add_named(
        &mut self,
        factory: &NodeFactory,
        parent_hint: Option<NodeId>,
        name: &str,
        depth: u32,
    ) -> Result<NodeId> {
        let node = factory.create_node_by_name(name)?;
        self.add_node(parent_hint, node, depth)
    }

    /// Appends a flat pre-order sequence, skipping entries that fail.
    pub fn extend_flat<I, S>(&mut self, factory: &NodeFactory, entries: I)
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        for (name, depth) in entries {
            let name = name.as_ref();
            if let Err(err) = self.add_named(factory, None, name, depth) {
                tracing::warn!(%name, depth, error = %err, "skipping tree entry");
            }
        }
    }

    /// Attaches a nested description under `parent` (or as the root when
    /// `parent` is `None`). Every child is given its parent explicitly, so the
    /// previous-node heuristic never comes into play.
    ///
    /// Depths are taken from the document as written, so a top-level entry
    /// must declare depth 0. A node that cannot be created or attached is
    /// skipped together with its whole subtree.
    pub fn add_nested(
        &mut self,
        factory: &NodeFactory,
        parent: Option<NodeId>,
        document: &NodeDocument,
    ) -> Option<NodeId> {
        let depth = document.depth;
        let attached = factory
            .create_node_by_name(&document.name)
            .and_then(|node| self.add_node(parent, node, depth));
        let id = match attached {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(
                    node = %document.name,
                    depth,
                    descendants = document.descendant_count(),
                    error = %err,
                    "skipping subtree"
                );
                return None;
            }
        };
        tracing::trace!(node = %document.name, depth, "node attached");

        for child in &document.children {
            self.add_nested(factory, Some(id), child);
        }
        Some(id)
    }

    pub fn finish(self) -> BehaviourTree {
        tracing::debug!(tree = %self.tree.name(), nodes = self.tree.len(), "tree built");
        self.tree
    }

    fn shallower_ancestor(&self, from: NodeId, depth: u32) -> Result<NodeId> {
        let mut current = from;
        loop {
            let Some(node) = self.tree.node(current) else {
                return Err(BtError::NoValidParent { depth });
            };
            if node.depth() < depth {
                return Ok(current);
            }
            match node.parent() {
                Some(parent) => current = parent,
                None => {
                    tracing::error!(depth, "ran out of ancestors looking for a parent");
                    return Err(BtError::NoValidParent { depth });
                }
            }
        }
    }
}

/// Builds a tree from a flat pre-order list of `(name, depth)` entries.
pub fn build_flat<I, S>(factory: &NodeFactory, name: &str, entries: I) -> BehaviourTree
where
    I: IntoIterator<Item = (S, u32)>,
    S: AsRef<str>,
{
    let mut builder = TreeBuilder::named(name);
    builder.extend_flat(factory, entries);
    builder.finish()
}

/// Builds a tree from a nested description rooted at `root`.
pub fn build_nested(factory: &NodeFactory, name: &str, root: &NodeDocument) -> BehaviourTree {
    let mut builder = TreeBuilder::named(name);
    builder.add_nested(factory, None, root);
    builder.finish()
}
