mod app;
mod concept;
mod layout;
mod physics;
mod util;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::concept::load_concept_graph;
use crate::layout::{LayoutConfig, LayoutMode, PlacedNode, compute_layout};
use crate::physics::{ForceConfig, Simulation};

/// Upper bound on simulation ticks for a headless force layout.
const DUMP_MAX_TICKS: usize = 300;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Concept graph JSON file, or `-` for stdin.
    #[arg(long, default_value = "concept-graph.json")]
    graph: PathBuf,

    #[arg(long, default_value_t = LayoutMode::Force)]
    layout: LayoutMode,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,

    /// Print node positions as JSON instead of opening the viewer.
    #[arg(long)]
    dump_layout: bool,
}

#[derive(Serialize)]
struct LayoutDump {
    mode: LayoutMode,
    width: f32,
    height: f32,
    nodes: Vec<PlacedNode>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concept_lens=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.dump_layout {
        return dump_layout(&args);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "concept-lens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ConceptLensApp::new(
                cc,
                args.graph.clone(),
                args.layout,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the viewer: {error}"))
}

fn dump_layout(args: &Args) -> Result<()> {
    let config = LayoutConfig::new(args.width, args.height);
    if !config.is_measured() {
        bail!("--width and --height must be positive, got {}x{}", args.width, args.height);
    }

    let graph = load_concept_graph(&args.graph)?;
    let layout = compute_layout(args.layout, &graph, config);

    let nodes = if args.layout.is_simulated() {
        let radii = graph
            .nodes
            .iter()
            .map(|node| node.visual_radius())
            .collect::<Vec<_>>();
        let mut simulation = Simulation::new(
            Simulation::nodes_from_layout(&layout, &radii),
            &layout.links,
            config.center(),
            ForceConfig::default(),
        );
        let ticks = simulation.run(DUMP_MAX_TICKS);
        info!(ticks, alpha = simulation.alpha(), "force layout finished");

        simulation
            .nodes()
            .iter()
            .map(|node| PlacedNode {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
            })
            .collect()
    } else {
        layout.nodes
    };

    let dump = LayoutDump {
        mode: args.layout,
        width: args.width,
        height: args.height,
        nodes,
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &dump).context("failed to write layout JSON")?;
    writeln!(stdout).context("failed to write layout JSON")?;
    Ok(())
}
