use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::graph::ConceptGraph;
use super::parse::parse_concept_graph;

/// Reads a concept graph from `path`, or from stdin when `path` is `-`.
pub fn load_concept_graph(path: &Path) -> Result<ConceptGraph> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read concept graph from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read concept graph from {}", path.display()))?
    };

    let graph = parse_concept_graph(&raw)
        .with_context(|| format!("failed to parse concept graph from {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = graph.nodes.len(),
        relationships = graph.relationships.len(),
        complexity = graph.complexity,
        "loaded concept graph"
    );
    Ok(graph)
}
