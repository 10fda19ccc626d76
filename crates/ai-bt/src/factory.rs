use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{BtError, Result};
use crate::node::{Behaviour, BehaviourNode};
use crate::nodes::register_all_node_types;
use crate::status::NodeType;

static REGISTRY: OnceLock<NodeFactory> = OnceLock::new();

/// Name → prototype registry. New nodes are produced by cloning a prototype.
///
/// A factory is filled once during startup and only read afterwards, which is
/// what makes the process-wide instance ([`NodeFactory::init`]) safe to share
/// between trees without locking.
#[derive(Debug, Default)]
pub struct NodeFactory {
    prototypes: BTreeMap<String, BehaviourNode>,
}

impl NodeFactory {
    /// An empty factory. Most callers want [`NodeFactory::with_default_nodes`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory holding every node kind this crate ships.
    pub fn with_default_nodes() -> Self {
        let mut factory = Self::new();
        register_all_node_types(&mut factory);
        factory
    }

    /// Initializes the process-wide registry with the built-in node kinds.
    pub fn init() -> &'static NodeFactory {
        Self::init_with(|_| {})
    }

    /// Initializes the process-wide registry with the built-in node kinds plus
    /// whatever `register` adds. Only the first initialization runs; later
    /// calls return the existing registry untouched.
    pub fn init_with(register: impl FnOnce(&mut NodeFactory)) -> &'static NodeFactory {
        let mut register = Some(register);
        let factory = REGISTRY.get_or_init(|| {
            let mut factory = Self::with_default_nodes();
            if let Some(register) = register.take() {
                register(&mut factory);
            }
            tracing::debug!(prototypes = factory.len(), "node factory initialized");
            factory
        });
        if register.is_some() {
            tracing::warn!("node factory already initialized, extra registrations ignored");
        }
        factory
    }

    /// The process-wide registry, if [`NodeFactory::init`] has run.
    pub fn global() -> Option<&'static NodeFactory> {
        REGISTRY.get()
    }

    /// Registers (or replaces) a prototype; its type comes from the name prefix.
    pub fn register_node_prototype(&mut self, name: impl Into<String>, prototype: impl Behaviour) {
        self.register(BehaviourNode::new(name, prototype));
    }

    pub fn register_control_flow(&mut self, name: impl Into<String>, prototype: impl Behaviour) {
        self.register(BehaviourNode::with_type(name, NodeType::ControlFlow, prototype));
    }

    pub fn register_decorator(&mut self, name: impl Into<String>, prototype: impl Behaviour) {
        self.register(BehaviourNode::with_type(name, NodeType::Decorator, prototype));
    }

    pub fn register_leaf(&mut self, name: impl Into<String>, prototype: impl Behaviour) {
        self.register(BehaviourNode::with_type(name, NodeType::Leaf, prototype));
    }

    /// Registers a fully-formed prototype node under its own name.
    pub fn register(&mut self, prototype: BehaviourNode) {
        let name = prototype.name().to_owned();
        if self.prototypes.insert(name.clone(), prototype).is_some() {
            tracing::debug!(%name, "node prototype replaced");
        }
    }

    /// Clones the prototype registered as `name`.
    pub fn create_node_by_name(&self, name: &str) -> Result<BehaviourNode> {
        match self.prototypes.get(name) {
            Some(prototype) => {
                let mut node = prototype.clone();
                node.set_name(name);
                Ok(node)
            }
            None => {
                tracing::error!(%name, "node type not found");
                Err(BtError::UnknownNodeType(name.to_owned()))
            }
        }
    }

    pub fn string_to_node_type(name: &str) -> NodeType {
        NodeType::from_name(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Registered names with their node type, in name order.
    pub fn prototypes(&self) -> impl Iterator<Item = (&str, NodeType)> {
        self.prototypes
            .iter()
            .map(|(name, node)| (name.as_str(), node.node_type()))
    }
}
