//! Position assignment for concept graphs.
//!
//! Every layout here is a pure function of the node set (and, for the
//! tree, the relationships) and the viewport. Coordinates are viewport
//! space: `(0, 0)` is the top-left corner, `(width / 2, height / 2)` the
//! centre.

use std::fmt;
use std::str::FromStr;

use eframe::egui::{Pos2, pos2};
use serde::Serialize;
use tracing::debug;

use crate::concept::{ConceptGraph, ConceptNode, ConceptRelationship, RelationKind, index_nodes};

mod cluster;
mod force;
mod grid;
mod hierarchy;
mod radial;

pub use cluster::{cluster_centers, cluster_inner_radius, cluster_layout};
pub use force::seed_layout;
pub use grid::grid_layout;
pub use hierarchy::hierarchy_layout;
pub use radial::radial_layout;

pub const DEFAULT_PADDING: f32 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Force,
    Radial,
    Hierarchy,
    Cluster,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 4] = [Self::Force, Self::Radial, Self::Hierarchy, Self::Cluster];

    pub fn label(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Radial => "radial",
            Self::Hierarchy => "hierarchy",
            Self::Cluster => "cluster",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Force => "Force",
            Self::Radial => "Radial",
            Self::Hierarchy => "Tree",
            Self::Cluster => "Clusters",
        }
    }

    /// Whether positions come from a running simulation rather than a
    /// one-shot computation.
    pub fn is_simulated(self) -> bool {
        self == Self::Force
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                format!("unknown layout `{value}` (expected force, radial, hierarchy or cluster)")
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl LayoutConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn center(&self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }

    /// False until the container has reported a usable size.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl PlacedNode {
    pub fn new(node: &ConceptNode, position: Pos2) -> Self {
        Self {
            id: node.id.clone(),
            x: position.x,
            y: position.y,
        }
    }

    pub fn position(&self) -> Pos2 {
        pos2(self.x, self.y)
    }
}

/// A relationship whose endpoints are indices into the placed node list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLink {
    pub source: usize,
    pub target: usize,
    pub kind: RelationKind,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub nodes: Vec<PlacedNode>,
    pub links: Vec<ResolvedLink>,
}

pub fn compute_layout(mode: LayoutMode, graph: &ConceptGraph, config: LayoutConfig) -> Layout {
    let nodes = match mode {
        LayoutMode::Force => seed_layout(&graph.nodes, config),
        LayoutMode::Radial => radial_layout(&graph.nodes, config),
        LayoutMode::Hierarchy => hierarchy_layout(&graph.nodes, &graph.relationships, config),
        LayoutMode::Cluster => cluster_layout(&graph.nodes, config),
    };
    let links = resolve_links(&graph.nodes, &graph.relationships);

    Layout { nodes, links }
}

/// Single pass turning id endpoints into indices. Relationships whose
/// endpoints are not in `nodes` are dropped.
pub fn resolve_links(
    nodes: &[ConceptNode],
    relationships: &[ConceptRelationship],
) -> Vec<ResolvedLink> {
    let index_by_id = index_nodes(nodes);
    relationships
        .iter()
        .filter_map(|relationship| {
            let source = index_by_id.get(relationship.source.as_str()).copied();
            let target = index_by_id.get(relationship.target.as_str()).copied();
            match (source, target) {
                (Some(source), Some(target)) => Some(ResolvedLink {
                    source,
                    target,
                    kind: relationship.kind,
                    strength: relationship.strength,
                }),
                _ => {
                    debug!(
                        source = %relationship.source,
                        target = %relationship.target,
                        "skipping relationship with an endpoint outside the node set"
                    );
                    None
                }
            }
        })
        .collect()
}

fn placed(nodes: &[ConceptNode], positions: Vec<Pos2>) -> Vec<PlacedNode> {
    nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| PlacedNode::new(node, position))
        .collect()
}
