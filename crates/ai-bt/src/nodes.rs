//! Built-in node kinds and their registration.

use crate::factory::NodeFactory;
use crate::node::Behaviour;
use crate::status::NodeResult;
use crate::tree::NodeContext;

/// Registers every built-in kind under its canonical name.
///
/// Called once by [`NodeFactory::with_default_nodes`] during startup.
pub fn register_all_node_types(factory: &mut NodeFactory) {
    // Control flow
    factory.register_control_flow("C_Sequence", Sequence::default());
    factory.register_control_flow("C_Sequencer", Sequence::default());
    factory.register_control_flow("C_Selector", Selector::default());

    // Decorators
    factory.register_decorator("D_Invert", Invert);
    factory.register_decorator("D_AlwaysSucceed", Force(NodeResult::Success));
    factory.register_decorator("D_AlwaysFail", Force(NodeResult::Failure));

    // Leaves
    factory.register_leaf("L_Wait", Wait::new(1.0));
    factory.register_leaf("L_Idle", Wait::new(3.0));
    factory.register_leaf("L_Succeed", Outcome(NodeResult::Success));
    factory.register_leaf("L_Fail", Outcome(NodeResult::Failure));
    factory.register_leaf("L_CheckSignal", CheckSignal::new(CheckSignal::DEFAULT_KEY));
}

/// Ticks children in order, one per update, until one fails.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    index: usize,
}

impl Behaviour for Sequence {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        self.index = 0;
        node.enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, dt: f32) {
        let Some(result) = node.tick_child(self.index, dt) else {
            node.success();
            return;
        };
        match result {
            NodeResult::Failure => node.failure(),
            NodeResult::Success => {
                self.index += 1;
                if self.index >= node.child_count() {
                    node.success();
                }
            }
            NodeResult::InProgress => {}
        }
    }
}

/// Ticks children in order, one per update, until one succeeds.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    index: usize,
}

impl Behaviour for Selector {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        self.index = 0;
        node.enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, dt: f32) {
        let Some(result) = node.tick_child(self.index, dt) else {
            node.failure();
            return;
        };
        match result {
            NodeResult::Success => node.success(),
            NodeResult::Failure => {
                self.index += 1;
                if self.index >= node.child_count() {
                    node.failure();
                }
            }
            NodeResult::InProgress => {}
        }
    }
}

/// Swaps the success and failure of its first child. Fails without a child.
#[derive(Debug, Clone)]
pub struct Invert;

impl Behaviour for Invert {
    fn on_update(&mut self, node: &mut NodeContext<'_>, dt: f32) {
        match node.tick_child(0, dt) {
            Some(NodeResult::Success) | None => node.failure(),
            Some(NodeResult::Failure) => node.success(),
            Some(NodeResult::InProgress) => {}
        }
    }
}

/// Reports a fixed result once its first child finishes, whatever the child
/// returned. Without a child it reports immediately.
#[derive(Debug, Clone)]
pub struct Force(pub NodeResult);

impl Behaviour for Force {
    fn on_update(&mut self, node: &mut NodeContext<'_>, dt: f32) {
        let finished = node
            .tick_child(0, dt)
            .map_or(true, NodeResult::is_finished);
        if finished {
            finish(node, self.0);
        }
    }
}

/// Succeeds once more than `duration` seconds of frame time have elapsed
/// since entry.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: f32,
    remaining: f32,
}

impl Wait {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }
}

impl Behaviour for Wait {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        self.remaining = self.duration;
        node.leaf_enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, _dt: f32) {
        self.remaining -= node.tick_context().dt_seconds;
        tracing::trace!(node = %node.id(), remaining = self.remaining, "waiting");
        if self.remaining < 0.0 {
            node.success();
        }
    }
}

/// Leaf that reports a fixed result on its first update.
#[derive(Debug, Clone)]
pub struct Outcome(pub NodeResult);

impl Behaviour for Outcome {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        node.leaf_enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, _dt: f32) {
        finish(node, self.0);
    }
}

/// Succeeds when a boolean blackboard entry is `true`, fails otherwise
/// (including when the entry is missing or not a `bool`).
#[derive(Debug, Clone)]
pub struct CheckSignal {
    key: String,
}

impl CheckSignal {
    pub const DEFAULT_KEY: &'static str = "signal";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Behaviour for CheckSignal {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        node.leaf_enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, _dt: f32) {
        let raised = node.blackboard().get::<bool>(&self.key).copied().unwrap_or(false);
        tracing::trace!(key = %self.key, raised, "signal checked");
        if raised {
            node.success();
        } else {
            node.failure();
        }
    }
}

fn finish(node: &mut NodeContext<'_>, result: NodeResult) {
    match result {
        NodeResult::Success => node.success(),
        NodeResult::Failure => node.failure(),
        NodeResult::InProgress => {}
    }
}
