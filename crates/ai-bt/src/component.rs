//! Per-entity container of trees.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::document::TreeDocument;
use crate::error::{BtError, Result};
use crate::factory::NodeFactory;
use crate::tree::BehaviourTree;

/// The trees attached to one entity, updated in insertion order.
#[derive(Debug, Default)]
pub struct BehaviourTreeComponent {
    trees: Vec<BehaviourTree>,
}

impl BehaviourTreeComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `tree`. A tree without a root can never run and is refused.
    pub fn add_tree(&mut self, tree: BehaviourTree) -> Result<()> {
        if tree.root_id().is_none() {
            tracing::error!(tree = %tree.name(), "refusing to attach a tree without a root");
            return Err(BtError::IncompleteTree(tree.name().to_owned()));
        }
        tracing::debug!(tree = %tree.name(), nodes = tree.len(), "tree attached");
        self.trees.push(tree);
        Ok(())
    }

    pub fn update(&mut self, dt: f32) {
        for tree in &mut self.trees {
            tree.update(dt);
        }
    }

    pub fn trees(&self) -> &[BehaviourTree] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [BehaviourTree] {
        &mut self.trees
    }

    /// First attached tree called `name`.
    pub fn tree(&self, name: &str) -> Option<&BehaviourTree> {
        self.trees.iter().find(|tree| tree.name() == name)
    }

    pub fn tree_mut(&mut self, name: &str) -> Option<&mut BehaviourTree> {
        self.trees.iter_mut().find(|tree| tree.name() == name)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// Advances every tree of every component by `dt`, one frame.
pub fn update_components<'a>(
    components: impl IntoIterator<Item = &'a mut BehaviourTreeComponent>,
    dt: f32,
) {
    for component in components {
        component.update(dt);
    }
}

/// Serialized form of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentDocument {
    #[cfg_attr(feature = "serde", serde(rename = "Behaviour Trees", default))]
    pub trees: Vec<TreeDocument>,
}

impl ComponentDocument {
    /// Captures every attached tree. Attached trees always have a root, so
    /// this only fails if one was emptied after attachment.
    pub fn from_component(component: &BehaviourTreeComponent) -> Result<Self> {
        let trees = component
            .trees()
            .iter()
            .map(TreeDocument::from_tree)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { trees })
    }

    /// Rebuilds a component. Trees that end up without a root (for instance
    /// because the root's type is unknown) are logged and left out.
    pub fn build(&self, factory: &NodeFactory) -> BehaviourTreeComponent {
        let mut component = BehaviourTreeComponent::new();
        for doc in &self.trees {
            if let Err(err) = component.add_tree(doc.build(factory)) {
                tracing::warn!(tree = %doc.name, error = %err, "tree dropped from component");
            }
        }
        component
    }
}

#[cfg(feature = "serde")]
impl ComponentDocument {
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|err| crate::document::encode_error("yaml", err))
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|err| crate::document::parse_error("yaml", err))
    }
}
