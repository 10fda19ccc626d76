use std::fmt;

use crate::status::{NodeResult, NodeStatus, NodeType};
use crate::tree::NodeContext;

/// Index of a node inside the arena of the tree that owns it.
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-kind logic plugged into the node state machine.
///
/// The defaults implement the generic lifecycle: entering marks the node
/// running and resets its immediate children, updating does nothing, and
/// exiting suspends the node. Concrete kinds override the hooks they need and
/// decide when to call [`NodeContext::success`] or [`NodeContext::failure`].
pub trait Behaviour: BehaviourClone + Send + Sync + 'static {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        node.enter();
    }

    fn on_update(&mut self, _node: &mut NodeContext<'_>, _dt: f32) {}

    fn on_exit(&mut self, node: &mut NodeContext<'_>) {
        node.exit();
    }
}

/// Object-safe cloning for boxed behaviours, implemented for every `Clone`
/// behaviour so concrete kinds never write it by hand.
pub trait BehaviourClone {
    fn clone_box(&self) -> Box<dyn Behaviour>;
}

impl<T> BehaviourClone for T
where
    T: Behaviour + Clone,
{
    fn clone_box(&self) -> Box<dyn Behaviour> {
        Box::new(self.clone())
    }
}

/// One unit of a behaviour tree: bookkeeping shared by every kind plus the
/// kind-specific [`Behaviour`].
///
/// A node starts detached. Once handed to a [`crate::BehaviourTree`] it lives in
/// the tree's arena and refers to its parent and children by [`NodeId`].
pub struct BehaviourNode {
    name: String,
    depth: u32,
    node_type: NodeType,
    status: NodeStatus,
    result: NodeResult,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // Taken out while the node's own hooks run.
    pub(crate) behaviour: Option<Box<dyn Behaviour>>,
}

impl BehaviourNode {
    /// Creates a detached node whose type is derived from the name prefix.
    pub fn new(name: impl Into<String>, behaviour: impl Behaviour) -> Self {
        let name = name.into();
        let node_type = NodeType::from_name(&name);
        Self::with_type(name, node_type, behaviour)
    }

    pub fn with_type(name: impl Into<String>, node_type: NodeType, behaviour: impl Behaviour) -> Self {
        Self {
            name: name.into(),
            depth: 0,
            node_type,
            status: NodeStatus::Ready,
            result: NodeResult::InProgress,
            parent: None,
            children: Vec::new(),
            behaviour: Some(Box::new(behaviour)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        tracing::trace!(name = %self.name, "node name set");
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    pub fn result(&self) -> NodeResult {
        self.result
    }

    pub fn set_result(&mut self, result: NodeResult) {
        self.result = result;
    }

    pub fn is_ready(&self) -> bool {
        self.status == NodeStatus::Ready
    }

    pub fn is_running(&self) -> bool {
        self.status == NodeStatus::Running
    }

    pub fn is_suspended(&self) -> bool {
        self.status == NodeStatus::Suspended
    }

    pub fn has_succeeded(&self) -> bool {
        self.result == NodeResult::Success
    }

    pub fn has_failed(&self) -> bool {
        self.result == NodeResult::Failure
    }

    /// Leaf entry: running and in progress, no children to reset.
    pub fn on_leaf_enter(&mut self) {
        self.status = NodeStatus::Running;
        self.result = NodeResult::InProgress;
    }

    pub fn on_success(&mut self) {
        self.status = NodeStatus::Exiting;
        self.result = NodeResult::Success;
    }

    pub fn on_failure(&mut self) {
        self.status = NodeStatus::Exiting;
        self.result = NodeResult::Failure;
    }

    pub(crate) fn attach(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.children.clear();
    }
}

/// Clones are detached: name, depth, type, state and behaviour are copied,
/// parent and child links are not.
impl Clone for BehaviourNode {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            depth: self.depth,
            node_type: self.node_type,
            status: self.status,
            result: self.result,
            parent: None,
            children: Vec::new(),
            behaviour: self.behaviour.as_ref().map(|b| b.clone_box()),
        }
    }
}

impl fmt::Debug for BehaviourNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviourNode")
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("node_type", &self.node_type)
            .field("status", &self.status)
            .field("result", &self.result)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Noop;

    impl Behaviour for Noop {}

    #[test]
    fn new_node_derives_type_and_starts_ready() {
        let node = BehaviourNode::new("D_Invert", Noop);
        assert_eq!(node.node_type(), NodeType::Decorator);
        assert!(node.is_ready());
        assert_eq!(node.result(), NodeResult::InProgress);
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn success_and_failure_mark_exiting() {
        let mut node = BehaviourNode::new("L_Test", Noop);
        node.on_leaf_enter();
        assert!(node.is_running());

        node.on_success();
        assert_eq!(node.status(), NodeStatus::Exiting);
        assert!(node.has_succeeded());

        node.on_failure();
        assert!(node.has_failed());
        assert!(!node.has_succeeded());
    }

    #[test]
    fn clone_drops_links() {
        let mut node = BehaviourNode::new("C_Test", Noop);
        node.set_depth(2);
        node.attach(NodeId(7));
        node.push_child(NodeId(8));

        let copy = node.clone();
        assert_eq!(copy.name(), "C_Test");
        assert_eq!(copy.depth(), 2);
        assert_eq!(copy.parent(), None);
        assert!(copy.children().is_empty());
        assert!(copy.behaviour.is_some());
    }
}
