use std::fmt;

use ai_core::{Blackboard, TickContext};
use ai_tools::{emit as trace_emit, TraceEvent};

use crate::error::{BtError, Result};
use crate::node::{BehaviourNode, NodeId};
use crate::status::{NodeResult, NodeStatus};

/// A named hierarchy of behaviour nodes stored in one arena.
///
/// Nodes are owned by the tree and linked by [`NodeId`]; the root is the only
/// node without a parent. Trees are populated through [`crate::TreeBuilder`]
/// and driven once per frame with [`BehaviourTree::update`].
#[derive(Default)]
pub struct BehaviourTree {
    name: String,
    nodes: Vec<BehaviourNode>,
    root: Option<NodeId>,
    blackboard: Blackboard,
    ticks: u64,
}

impl BehaviourTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let mut tree = Self::new();
        tree.set_name(name);
        tree
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        tracing::trace!(tree = %self.name, "tree name set");
    }

    /// Replaces the whole hierarchy with `root` at depth 0.
    pub fn set_root_node(&mut self, mut root: BehaviourNode) -> NodeId {
        root.detach();
        root.set_depth(0);
        self.nodes.clear();
        self.nodes.push(root);
        let id = NodeId(0);
        self.root = Some(id);
        id
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&BehaviourNode> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&BehaviourNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut BehaviourNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent()
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(BehaviourNode::children).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends `child` under `parent`, recording the back-reference.
    ///
    /// The child's depth is left as the caller set it.
    pub fn add_child(&mut self, parent: NodeId, mut child: BehaviourNode) -> Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(BtError::NoValidParent {
                depth: child.depth(),
            });
        }
        let id = NodeId(self.nodes.len());
        child.detach();
        child.attach(parent);
        self.nodes.push(child);
        self.nodes[parent.0].push_child(id);
        Ok(id)
    }

    /// Node ids in depth-first, parent-before-children order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        out
    }

    /// Nodes whose depth is not exactly one more than their parent's.
    pub fn depth_violations(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|&id| {
                let node = &self.nodes[id.0];
                match node.parent() {
                    Some(parent) => node.depth() != self.nodes[parent.0].depth() + 1,
                    None => node.depth() != 0,
                }
            })
            .collect()
    }

    pub fn set_status_all(&mut self, id: NodeId, status: NodeStatus) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current.0) else {
                continue;
            };
            node.set_status(status);
            stack.extend_from_slice(node.children());
        }
    }

    pub fn set_status_children(&mut self, id: NodeId, status: NodeStatus) {
        for child in self.children_of(id).to_vec() {
            self.nodes[child.0].set_status(status);
        }
    }

    pub fn set_result_children(&mut self, id: NodeId, result: NodeResult) {
        for child in self.children_of(id).to_vec() {
            self.nodes[child.0].set_result(result);
        }
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Number of completed [`BehaviourTree::update`] calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one step of a node's state machine.
    ///
    /// Each stage is checked after the previous one, so a node can enter,
    /// update and exit within a single call.
    pub fn tick(&mut self, id: NodeId, dt: f32) {
        let Some(mut behaviour) = self.nodes.get_mut(id.0).and_then(|n| n.behaviour.take()) else {
            return;
        };
        let ctx = TickContext::new(self.ticks, dt);

        {
            let mut node = NodeContext {
                tree: &mut *self,
                id,
                ctx,
            };

            if node.status() == NodeStatus::Ready {
                behaviour.on_enter(&mut node);
                node.trace("bt.node.enter", 0);
            }
            if node.status() == NodeStatus::Running {
                behaviour.on_update(&mut node, dt);
            }
            if node.status() == NodeStatus::Exiting {
                let result = node.result();
                behaviour.on_exit(&mut node);
                node.trace("bt.node.exit", result.code());
            }
        }

        self.nodes[id.0].behaviour = Some(behaviour);
    }

    /// Ticks the root once and restarts it if it is no longer running.
    ///
    /// A tree never terminates: a finished root is reset to `Ready` so the
    /// next call evaluates it again from the top.
    pub fn update(&mut self, dt: f32) {
        let Some(root) = self.root else {
            tracing::debug!(tree = %self.name, "update skipped, tree has no root");
            return;
        };

        self.tick(root, dt);

        if !self.nodes[root.0].is_running() {
            self.nodes[root.0].set_status(NodeStatus::Ready);
            if ai_tools::is_enabled(&self.blackboard) {
                trace_emit(
                    &mut self.blackboard,
                    TraceEvent::new(self.ticks, "bt.tree.restart").with_node(root.0 as u32),
                );
            }
        }

        self.ticks = self.ticks.wrapping_add(1);
    }
}

impl fmt::Debug for BehaviourTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviourTree")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .field("ticks", &self.ticks)
            .finish()
    }
}

/// The view a [`crate::Behaviour`] gets of its own node while a hook runs.
///
/// It exposes the node's state, its children (by position), and the tree's
/// blackboard. Children are ticked through [`NodeContext::tick_child`].
pub struct NodeContext<'a> {
    tree: &'a mut BehaviourTree,
    id: NodeId,
    ctx: TickContext,
}

impl NodeContext<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tick_context(&self) -> TickContext {
        self.ctx
    }

    pub fn node(&self) -> &BehaviourNode {
        &self.tree.nodes[self.id.0]
    }

    fn node_mut(&mut self) -> &mut BehaviourNode {
        &mut self.tree.nodes[self.id.0]
    }

    pub fn status(&self) -> NodeStatus {
        self.node().status()
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.node_mut().set_status(status);
    }

    pub fn result(&self) -> NodeResult {
        self.node().result()
    }

    pub fn set_result(&mut self, result: NodeResult) {
        self.node_mut().set_result(result);
    }

    /// Default entry: running, in progress, immediate children reset to
    /// `Ready`/`InProgress` (but not ticked).
    pub fn enter(&mut self) {
        self.set_status(NodeStatus::Running);
        self.set_result(NodeResult::InProgress);
        self.tree.set_status_children(self.id, NodeStatus::Ready);
        self.tree.set_result_children(self.id, NodeResult::InProgress);
    }

    pub fn leaf_enter(&mut self) {
        self.node_mut().on_leaf_enter();
    }

    pub fn exit(&mut self) {
        self.set_status(NodeStatus::Suspended);
    }

    pub fn success(&mut self) {
        self.node_mut().on_success();
    }

    pub fn failure(&mut self) {
        self.node_mut().on_failure();
    }

    pub fn child_count(&self) -> usize {
        self.node().children().len()
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.node().children().get(index).copied()
    }

    /// Ticks the child at `index` and returns its result afterwards.
    pub fn tick_child(&mut self, index: usize, dt: f32) -> Option<NodeResult> {
        let child = self.child(index)?;
        self.tree.tick(child, dt);
        self.tree.node(child).map(BehaviourNode::result)
    }

    pub fn set_status_all(&mut self, status: NodeStatus) {
        self.tree.set_status_all(self.id, status);
    }

    pub fn set_status_children(&mut self, status: NodeStatus) {
        self.tree.set_status_children(self.id, status);
    }

    pub fn set_result_children(&mut self, result: NodeResult) {
        self.tree.set_result_children(self.id, result);
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.tree.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.tree.blackboard
    }

    fn trace(&mut self, tag: &'static str, detail: u64) {
        if !ai_tools::is_enabled(&self.tree.blackboard) {
            return;
        }
        let event = TraceEvent::new(self.ctx.tick, tag)
            .with_node(self.id.0 as u32)
            .with_detail(detail);
        trace_emit(&mut self.tree.blackboard, event);
    }
}
