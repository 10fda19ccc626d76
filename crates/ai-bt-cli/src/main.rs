//! btree - behaviour tree inspector and simulator.
//!
//! - `btree nodes` - list registered node types
//! - `btree show <file>` - print a tree's hierarchy
//! - `btree convert <input> <output>` - convert between text, YAML and JSON
//! - `btree run <file>` - simulate a tree frame by frame

mod config;
mod source;

use std::path::{Path, PathBuf};

use ai_bt::{BehaviourTree, BuildOptions, CheckSignal, NodeFactory, NodeResult};
use ai_tools::{LogTraceSink, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use config::SimulationConfig;

#[derive(Parser)]
#[command(name = "btree")]
#[command(about = "Behaviour tree inspector and simulator", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject tree entries that skip depth levels
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered node types
    Nodes,

    /// Print the hierarchy of a tree file
    Show {
        /// Tree file (.bt, .yaml, .yml or .json)
        file: PathBuf,
    },

    /// Convert a tree between formats, chosen by file extension
    Convert { input: PathBuf, output: PathBuf },

    /// Simulate a tree and print node transitions
    Run {
        /// Tree file (.bt, .yaml, .yml or .json)
        file: PathBuf,

        /// Simulation settings (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of frames to simulate
        #[arg(long)]
        frames: Option<u32>,

        /// Seconds per frame
        #[arg(long)]
        dt: Option<f32>,

        /// Raise the `signal` blackboard entry before the first frame
        #[arg(long)]
        signal: bool,

        /// Stream transitions to the debug log instead of printing them
        #[arg(long)]
        stream: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let factory = NodeFactory::init();
    let options = BuildOptions {
        reject_depth_skips: cli.strict,
    };

    match cli.command {
        Commands::Nodes => list_nodes(factory),
        Commands::Show { file } => show_tree(factory, &file, options),
        Commands::Convert { input, output } => convert_tree(factory, &input, &output, options),
        Commands::Run {
            file,
            config,
            frames,
            dt,
            signal,
            stream,
        } => {
            let mut config = SimulationConfig::load_or_default(config.as_deref())?;
            if let Some(frames) = frames {
                config.frames = frames;
            }
            if let Some(dt) = dt {
                config.dt = dt;
            }
            config.signal |= signal;
            config.reject_depth_skips |= cli.strict;
            config.validate()?;
            run_tree(factory, &file, &config, stream)
        }
    }
}

fn list_nodes(factory: &NodeFactory) -> Result<()> {
    println!("{} registered node types", factory.len());
    for (name, node_type) in factory.prototypes() {
        println!("  {name:<20} {node_type}");
    }
    Ok(())
}

fn show_tree(factory: &NodeFactory, file: &Path, options: BuildOptions) -> Result<()> {
    let tree = source::load_tree(file, factory, options)?;
    println!("{}", tree.name());
    print!("{}", render_hierarchy(&tree));

    let violations = tree.depth_violations();
    if !violations.is_empty() {
        tracing::warn!(count = violations.len(), "Nodes with inconsistent depth");
    }
    Ok(())
}

/// One line per node, indented by its position in the tree. The declared
/// depth comes from the source and may be arbitrarily large, so it is only
/// printed, never used for layout.
fn render_hierarchy(tree: &BehaviourTree) -> String {
    let mut levels = vec![0usize; tree.len()];
    let mut out = String::new();
    for id in tree.pre_order() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        // Pre-order visits parents first, so their level is already known.
        let level = node
            .parent()
            .and_then(|parent| levels.get(parent.index()))
            .map_or(0, |parent_level| parent_level + 1);
        if let Some(slot) = levels.get_mut(id.index()) {
            *slot = level;
        }
        let indent = "  ".repeat(level);
        out.push_str(&format!(
            "{indent}{} [{}] depth {}\n",
            node.name(),
            node.node_type(),
            node.depth()
        ));
    }
    out
}

fn convert_tree(factory: &NodeFactory, input: &Path, output: &Path, options: BuildOptions) -> Result<()> {
    let tree = source::load_tree(input, factory, options)?;
    source::save_tree(output, &tree)
        .with_context(|| format!("Failed to convert {} to {}", input.display(), output.display()))?;
    println!("{} -> {} ({} nodes)", input.display(), output.display(), tree.len());
    Ok(())
}

fn run_tree(factory: &NodeFactory, file: &Path, config: &SimulationConfig, stream: bool) -> Result<()> {
    let mut tree = source::load_tree(file, factory, config.build_options())?;
    if tree.root_id().is_none() {
        anyhow::bail!("{} has no root node, nothing to run", file.display());
    }

    let names = node_names(&tree);
    tree.blackboard_mut().set(CheckSignal::DEFAULT_KEY, config.signal);
    if stream {
        tree.blackboard_mut()
            .set(TRACE_SINK, Box::new(LogTraceSink) as Box<dyn TraceSink>);
    } else {
        tree.blackboard_mut().set(TRACE_LOG, TraceLog::default());
    }

    tracing::info!(tree = %tree.name(), frames = config.frames, dt = config.dt, "Starting simulation");

    for _ in 0..config.frames {
        tree.update(config.dt);

        let events = tree
            .blackboard_mut()
            .get_mut::<TraceLog>(TRACE_LOG)
            .map(|log| std::mem::take(&mut log.events))
            .unwrap_or_default();
        for event in events {
            let name = names.get(event.node as usize).map_or("?", String::as_str);
            let outcome = match NodeResult::from_code(event.detail) {
                Some(NodeResult::Success) if event.tag == "bt.node.exit" => "success",
                Some(NodeResult::Failure) if event.tag == "bt.node.exit" => "failure",
                _ => "",
            };
            println!("[{:>5}] {:<16} {name} {outcome}", event.tick, event.tag);
        }
    }

    let result = tree
        .root_node()
        .map_or(NodeResult::InProgress, |root| root.result());
    println!();
    println!("{} frames simulated, last root result: {result:?}", tree.ticks());
    Ok(())
}

/// Node names indexed by arena position, for labelling trace events.
fn node_names(tree: &BehaviourTree) -> Vec<String> {
    let mut names = vec![String::new(); tree.len()];
    for id in tree.pre_order() {
        if let (Some(slot), Some(node)) = (names.get_mut(id.index()), tree.node(id)) {
            *slot = node.name().to_owned();
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_bt::load_flat_str;

    #[test]
    fn hierarchy_is_indented_by_tree_position() {
        let factory = NodeFactory::with_default_nodes();
        let tree = load_flat_str(
            "TREENAME guard\nTREENODE C_Sequence 0\nTREENODE D_Invert 1\nTREENODE L_Wait 2\nTREENODE L_Idle 1\n",
            &factory,
        );
        assert_eq!(
            render_hierarchy(&tree),
            "C_Sequence [CONTROLFLOW] depth 0\n  D_Invert [DECORATOR] depth 1\n    L_Wait [LEAF] depth 2\n  L_Idle [LEAF] depth 1\n"
        );
    }

    #[test]
    fn huge_declared_depth_only_shows_as_text() {
        let factory = NodeFactory::with_default_nodes();
        let tree = load_flat_str("TREENODE C_Sequence 0\nTREENODE L_Wait 4294967295\n", &factory);
        assert_eq!(tree.len(), 2);

        let rendered = render_hierarchy(&tree);
        assert_eq!(
            rendered,
            "C_Sequence [CONTROLFLOW] depth 0\n  L_Wait [LEAF] depth 4294967295\n"
        );
    }
}
