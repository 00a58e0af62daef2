//! `plangraph` command line entry point.
//!
//! Reads a markdown outline, derives its task graph and prints JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use plangraph_core::layout::{Direction, LayoutConfig, LayoutEngine};
use plangraph_core::outline::{read_markdown_file, MarkdownImportOptions};
use plangraph_core::{
    default_log_level, init_logging, DisabledReadiness, GraphDeriver, GraphModel,
    PrerequisiteReadiness, ProjectContent,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "plangraph",
    version,
    about = "Turn a markdown task outline into a laid-out dependency diagram"
)]
struct Cli {
    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the derived task forest as JSON
    Derive {
        outline: PathBuf,
        /// Spaces per list nesting level
        #[arg(long, default_value_t = 2)]
        indent_width: usize,
        #[arg(long, value_enum, default_value_t = ReadinessArg::Disabled)]
        readiness: ReadinessArg,
    },
    /// Print the positioned diagram as JSON
    Layout {
        outline: PathBuf,
        /// Flow direction: TB or LR
        #[arg(long, default_value = "TB")]
        direction: Direction,
        /// JSON file overriding layout spacing
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 2)]
        indent_width: usize,
        #[arg(long, value_enum, default_value_t = ReadinessArg::Disabled)]
        readiness: ReadinessArg,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReadinessArg {
    Disabled,
    Prerequisite,
}

impl ReadinessArg {
    fn deriver(self) -> GraphDeriver {
        match self {
            Self::Disabled => GraphDeriver::new(Box::new(DisabledReadiness)),
            Self::Prerequisite => GraphDeriver::new(Box::new(PrerequisiteReadiness)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;

    match cli.command {
        Command::Derive {
            outline,
            indent_width,
            readiness,
        } => run_derive(&outline, indent_width, readiness),
        Command::Layout {
            outline,
            direction,
            config,
            indent_width,
            readiness,
        } => run_layout(&outline, direction, config.as_deref(), indent_width, readiness),
    }
}

fn setup_logging(level: Option<&str>, log_dir: Option<&Path>) -> Result<()> {
    let Some(log_dir) = log_dir else {
        if level.is_some() {
            bail!("--log-level needs --log-dir");
        }
        return Ok(());
    };
    let log_dir = log_dir
        .to_str()
        .context("--log-dir must be valid UTF-8")?;
    init_logging(level.unwrap_or(default_log_level()), log_dir)?;
    Ok(())
}

fn load_content(path: &Path, indent_width: usize) -> Result<ProjectContent> {
    let outline = read_markdown_file(path, &MarkdownImportOptions { indent_width })?;
    Ok(ProjectContent {
        outline,
        ..ProjectContent::default()
    })
}

fn run_derive(path: &Path, indent_width: usize, readiness: ReadinessArg) -> Result<()> {
    let content = load_content(path, indent_width)?;
    let deriver = readiness.deriver();
    let graph = deriver.derive(
        &content.outline,
        &content.task_metadata,
        &content.relationships,
    );
    info!(
        "event=cli_derive module=cli status=ok tasks={} readiness={}",
        graph.forest.len(),
        deriver.readiness_name()
    );

    let output = serde_json::json!({
        "tasks": graph.forest.to_tree(),
        "task_metadata": graph.metadata,
        "relationships": graph.relationships,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_layout(
    path: &Path,
    direction: Direction,
    config_path: Option<&Path>,
    indent_width: usize,
    readiness: ReadinessArg,
) -> Result<()> {
    let config = match config_path {
        Some(config_path) => {
            let raw = std::fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config `{}`", config_path.display()))?;
            serde_json::from_str::<LayoutConfig>(&raw)
                .with_context(|| format!("invalid layout config `{}`", config_path.display()))?
        }
        None => LayoutConfig::default(),
    };

    let content = load_content(path, indent_width)?;
    let deriver = readiness.deriver();
    let readiness_name = deriver.readiness_name();
    let model = GraphModel::from_content(deriver, LayoutEngine::new(config), &content, direction);
    let diagram = model.diagram();
    info!(
        "event=cli_layout module=cli status=ok nodes={} direction={} readiness={}",
        diagram.nodes.len(),
        direction,
        readiness_name
    );
    println!("{}", serde_json::to_string_pretty(&diagram)?);
    Ok(())
}
