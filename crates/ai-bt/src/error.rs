use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while building, loading or attaching behaviour trees.
///
/// Every variant is recoverable: the caller skips the offending entry (or
/// aborts the load) and the rest of the simulation keeps running.
#[derive(Debug, Error)]
pub enum BtError {
    #[error("node type {0:?} is not registered")]
    UnknownNodeType(String),

    #[error("root node already exists, refusing to insert {0:?} at depth 0")]
    InvalidRoot(String),

    #[error("no valid parent for a node at depth {depth}")]
    NoValidParent { depth: u32 },

    #[error("node at depth {depth} skips levels below its parent at depth {parent_depth}")]
    DepthSkip { depth: u32, parent_depth: u32 },

    #[error("malformed behaviour tree source: {0}")]
    MalformedSource(String),

    #[error("behaviour tree has no root node")]
    EmptyTree,

    #[error("behaviour tree {0:?} is incomplete (no root node)")]
    IncompleteTree(String),

    #[error("failed to encode behaviour tree: {0}")]
    Encode(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BtError>;
