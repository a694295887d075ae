use crate::config::load_config;
use crate::ir::Graph;
use crate::layout::compute_layout_detailed;
use crate::layout_dump::write_layout_dump;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tidy", version, about = "Tidy layout for node-and-port graphs")]
pub struct Args {
    /// Input graph (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file ({"layout": {"gap": 30}})
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the input graph with new positions instead of a position map
    #[arg(long = "apply")]
    pub apply: bool,

    /// Also write per-node layout diagnostics to this file
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let graph: Graph = serde_json::from_str(&input).context("failed to parse input graph")?;
    let layout = compute_layout_detailed(&graph, &config.layout)?;

    if let Some(path) = args.dump.as_deref() {
        write_layout_dump(path, &layout, &graph)
            .with_context(|| format!("failed to write dump to {}", path.display()))?;
    }

    let positions = layout.positions();
    let rendered = if args.apply {
        serde_json::to_string_pretty(&graph.apply_positions(&positions))?
    } else {
        serde_json::to_string_pretty(&positions)?
    };
    write_output(&rendered, args.output.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, format!("{contents}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{contents}")?;
        }
    }
    Ok(())
}
