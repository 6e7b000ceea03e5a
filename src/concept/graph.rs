use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

pub const MAX_NODES: usize = 50;
pub const MAX_RELATIONSHIPS: usize = 100;
pub const MAX_LABEL_CHARS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Persona,
    Task,
    Constraints,
    Context,
    Output,
    Examples,
    Metadata,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Persona,
        Self::Task,
        Self::Constraints,
        Self::Context,
        Self::Output,
        Self::Examples,
        Self::Metadata,
    ];

    /// Order in which clusters are placed around the ring, starting at the top.
    pub const CLUSTER_ORDER: [Category; 7] = [
        Self::Task,
        Self::Persona,
        Self::Context,
        Self::Constraints,
        Self::Output,
        Self::Examples,
        Self::Metadata,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Persona => "persona",
            Self::Task => "task",
            Self::Constraints => "constraints",
            Self::Context => "context",
            Self::Output => "output",
            Self::Examples => "examples",
            Self::Metadata => "metadata",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Influences,
    Requires,
    Conflicts,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [Self::Influences, Self::Requires, Self::Conflicts];

    pub fn label(self) -> &'static str {
        match self {
            Self::Influences => "influences",
            Self::Requires => "requires",
            Self::Conflicts => "conflicts",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConceptNode {
    pub id: String,
    pub label: String,
    pub category: Category,
    /// Importance in `[0, 1]`.
    pub weight: f32,
    /// Hierarchy level, 0 is a root.
    pub depth: u32,
    /// Extraction certainty in `[0, 1]`.
    pub confidence: f32,
    pub description: Option<String>,
    pub extracted_text: Option<String>,
}

impl ConceptNode {
    /// Circle radius used for drawing and, padded, for collision.
    pub fn visual_radius(&self) -> f32 {
        (20.0 + self.weight * 15.0 - self.depth as f32 * 3.0).max(15.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConceptRelationship {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConceptGraph {
    pub nodes: Vec<ConceptNode>,
    pub relationships: Vec<ConceptRelationship>,
    pub complexity: u8,
    pub bifurcated: bool,
}

/// One relationship seen from a particular node.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection<'a> {
    pub other: &'a ConceptNode,
    pub kind: RelationKind,
    pub strength: f32,
    pub outgoing: bool,
}

impl ConceptGraph {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            relationships: Vec::new(),
            complexity: 1,
            bifurcated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&ConceptNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        index_nodes(&self.nodes)
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.category == category)
            .count()
    }

    pub fn connections(&self, id: &str) -> Vec<Connection<'_>> {
        let index_by_id = self.index_by_id();
        self.relationships
            .iter()
            .filter_map(|relationship| {
                let (other_id, outgoing) = if relationship.source == id {
                    (relationship.target.as_str(), true)
                } else if relationship.target == id {
                    (relationship.source.as_str(), false)
                } else {
                    return None;
                };

                let &other = index_by_id.get(other_id)?;
                Some(Connection {
                    other: &self.nodes[other],
                    kind: relationship.kind,
                    strength: relationship.strength,
                    outgoing,
                })
            })
            .collect()
    }
}

pub fn index_nodes(nodes: &[ConceptNode]) -> HashMap<&str, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(id: &str, category: Category, depth: u32, weight: f32) -> ConceptNode {
        ConceptNode {
            id: id.to_owned(),
            label: id.to_owned(),
            category,
            weight,
            depth,
            confidence: 1.0,
            description: None,
            extracted_text: None,
        }
    }

    pub fn edge(source: &str, target: &str, kind: RelationKind, strength: f32) -> ConceptRelationship {
        ConceptRelationship {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            strength,
        }
    }

    /// A(depth 0) -> B, A -> C (depth 1), B -> D (depth 2).
    pub fn four_node_graph() -> ConceptGraph {
        ConceptGraph {
            nodes: vec![
                node("A", Category::Task, 0, 1.0),
                node("B", Category::Constraints, 1, 0.6),
                node("C", Category::Context, 1, 0.6),
                node("D", Category::Output, 2, 0.3),
            ],
            relationships: vec![
                edge("A", "B", RelationKind::Requires, 0.7),
                edge("A", "C", RelationKind::Influences, 0.5),
                edge("B", "D", RelationKind::Requires, 0.4),
            ],
            complexity: 3,
            bifurcated: false,
        }
    }
}
