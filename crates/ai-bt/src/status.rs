use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structural role of a node, conventionally encoded in its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeType {
    ControlFlow,
    Decorator,
    Leaf,
    Unknown,
}

impl NodeType {
    /// Classifies a node name by its two-character prefix (`C_`, `D_`, `L_`).
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("C_") {
            NodeType::ControlFlow
        } else if name.starts_with("D_") {
            NodeType::Decorator
        } else if name.starts_with("L_") {
            NodeType::Leaf
        } else {
            NodeType::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::ControlFlow => "CONTROLFLOW",
            NodeType::Decorator => "DECORATOR",
            NodeType::Leaf => "LEAF",
            NodeType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a node within one run of its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeStatus {
    /// Eligible to begin; the next tick enters the node.
    #[default]
    Ready,
    /// Actively ticking.
    Running,
    /// Result decided; the exit hook runs before the tick returns.
    Exiting,
    /// Finished and dormant until reset to `Ready`.
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeResult {
    #[default]
    InProgress,
    Success,
    Failure,
}

impl NodeResult {
    /// Stable numeric code used in trace events.
    pub fn code(self) -> u64 {
        match self {
            NodeResult::InProgress => 0,
            NodeResult::Success => 1,
            NodeResult::Failure => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(NodeResult::InProgress),
            1 => Some(NodeResult::Success),
            2 => Some(NodeResult::Failure),
            _ => None,
        }
    }

    pub fn is_finished(self) -> bool {
        self != NodeResult::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_classification() {
        assert_eq!(NodeType::from_name("C_Sequence"), NodeType::ControlFlow);
        assert_eq!(NodeType::from_name("D_Invert"), NodeType::Decorator);
        assert_eq!(NodeType::from_name("L_Wait"), NodeType::Leaf);
        assert_eq!(NodeType::from_name("X_Other"), NodeType::Unknown);
        assert_eq!(NodeType::from_name("Sequence"), NodeType::Unknown);
    }

    #[test]
    fn short_names_are_unknown() {
        assert_eq!(NodeType::from_name(""), NodeType::Unknown);
        assert_eq!(NodeType::from_name("C"), NodeType::Unknown);
        assert_eq!(NodeType::from_name("L_"), NodeType::Leaf);
    }
}
