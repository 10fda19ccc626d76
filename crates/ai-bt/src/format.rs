//! Line-oriented text form of a tree.
//!
//! ```text
//! # comments and blank lines are ignored
//! TREENAME patrol route
//! TREENODE C_Sequence 0
//! TREENODE L_Wait 1
//! TREENODE L_CheckSignal 1
//! ```
//!
//! Nodes are listed in pre-order with their depth and rebuilt with the flat
//! builder, so the format round-trips any tree that respects the depth
//! invariant.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::builder::{BuildOptions, TreeBuilder};
use crate::error::{BtError, Result};
use crate::factory::NodeFactory;
use crate::tree::BehaviourTree;

const TREE_NAME: &str = "TREENAME";
const TREE_NODE: &str = "TREENODE";

/// One `TREENODE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    pub name: String,
    pub depth: u32,
    /// 1-based source line, for diagnostics.
    pub line: usize,
}

/// Parsed text source, before any node is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatSource {
    pub name: Option<String>,
    pub entries: Vec<FlatEntry>,
}

impl FlatSource {
    /// Builds the tree, skipping entries the factory or the builder reject.
    pub fn build(&self, factory: &NodeFactory, options: BuildOptions) -> BehaviourTree {
        let mut builder = TreeBuilder::named(self.name.clone().unwrap_or_default()).with_options(options);
        for entry in &self.entries {
            if let Err(err) = builder.add_named(factory, None, &entry.name, entry.depth) {
                tracing::warn!(
                    line = entry.line,
                    node = %entry.name,
                    depth = entry.depth,
                    error = %err,
                    "skipping tree entry"
                );
            }
        }
        builder.finish()
    }
}

/// Parses the text form. Never fails: malformed lines are logged and skipped.
pub fn parse_flat(source: &str) -> FlatSource {
    let mut parsed = FlatSource::default();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let (keyword, rest) = match text.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (text, ""),
        };

        match keyword {
            TREE_NAME => {
                if parsed.name.is_some() {
                    tracing::warn!(line, "tree name given twice, keeping the last one");
                }
                parsed.name = Some(rest.to_owned());
            }
            TREE_NODE => match parse_node(rest) {
                Some((name, depth)) => parsed.entries.push(FlatEntry {
                    name: name.to_owned(),
                    depth,
                    line,
                }),
                None => tracing::warn!(line, text, "malformed tree node line"),
            },
            other => tracing::debug!(line, keyword = other, "ignoring unknown keyword"),
        }
    }

    parsed
}

fn parse_node(rest: &str) -> Option<(&str, u32)> {
    let mut fields = rest.split_whitespace();
    let name = fields.next()?;
    let depth = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((name, depth))
}

/// Renders `tree` in the text form, nodes in pre-order.
pub fn write_flat(tree: &BehaviourTree) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TREE_NAME} {}", tree.name());
    for id in tree.pre_order() {
        if let Some(node) = tree.node(id) {
            let _ = writeln!(out, "{TREE_NODE} {} {}", node.name(), node.depth());
        }
    }
    out
}

pub fn load_flat_str(source: &str, factory: &NodeFactory) -> BehaviourTree {
    parse_flat(source).build(factory, BuildOptions::default())
}

/// Reads and builds a text tree file. A file that cannot be read is reported
/// as a malformed source.
pub fn load_flat_file(path: impl AsRef<Path>, factory: &NodeFactory) -> Result<BehaviourTree> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "failed to read behaviour tree");
        BtError::MalformedSource(format!("{}: {err}", path.display()))
    })?;
    let tree = load_flat_str(&source, factory);
    tracing::info!(path = %path.display(), tree = %tree.name(), nodes = tree.len(), "behaviour tree loaded");
    Ok(tree)
}

pub fn save_flat_file(path: impl AsRef<Path>, tree: &BehaviourTree) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, write_flat(tree)).map_err(|source| BtError::Io {
        path: path.to_path_buf(),
        source,
    })
}
