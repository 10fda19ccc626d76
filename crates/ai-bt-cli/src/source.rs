//! Loading and saving trees by file extension.

use std::fs;
use std::path::Path;

use ai_bt::{
    parse_flat, save_flat_file, BehaviourTree, BuildOptions, NodeFactory, TreeBuilder,
    TreeDocument,
};
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `TREENAME` / `TREENODE` lines
    Text,
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("bt" | "txt") => Ok(Self::Text),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Cannot tell the tree format of {} (expected .bt, .txt, .yaml, .yml or .json)",
                path.display()
            ),
        }
    }
}

pub fn load_tree(path: &Path, factory: &NodeFactory, options: BuildOptions) -> Result<BehaviourTree> {
    let format = SourceFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree from {}", path.display()))?;

    let tree = match format {
        SourceFormat::Text => parse_flat(&content).build(factory, options),
        SourceFormat::Yaml | SourceFormat::Json => {
            let parsed = match format {
                SourceFormat::Yaml => TreeDocument::from_yaml_str(&content),
                _ => TreeDocument::from_json_str(&content),
            };
            let document =
                parsed.with_context(|| format!("Failed to parse tree from {}", path.display()))?;
            document.build_with(TreeBuilder::new().with_options(options), factory)
        }
    };

    tracing::info!(path = %path.display(), tree = %tree.name(), nodes = tree.len(), "Loaded tree");
    Ok(tree)
}

pub fn save_tree(path: &Path, tree: &BehaviourTree) -> Result<()> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Text => save_flat_file(path, tree)?,
        format => {
            let document = TreeDocument::from_tree(tree)?;
            let content = if format == SourceFormat::Yaml {
                document.to_yaml_string()?
            } else {
                document.to_json_string()?
            };
            fs::write(path, content)
                .with_context(|| format!("Failed to write tree to {}", path.display()))?;
        }
    }
    tracing::info!(path = %path.display(), tree = %tree.name(), "Saved tree");
    Ok(())
}
