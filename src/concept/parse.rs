use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::util::{clamp_unit, truncate_label};

use super::graph::{
    Category, ConceptGraph, ConceptNode, ConceptRelationship, MAX_LABEL_CHARS, MAX_NODES,
    MAX_RELATIONSHIPS, RelationKind,
};

const DEFAULT_WEIGHT: f64 = 0.5;
const DEFAULT_STRENGTH: f64 = 0.5;
const BIFURCATION_COMPLEXITY: u8 = 5;

// Fields stay as raw JSON so one badly typed entry is repaired or skipped
// instead of failing the whole document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConceptGraph {
    nodes: Value,
    relationships: Value,
    complexity: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawConceptNode {
    id: Value,
    label: Value,
    category: Value,
    weight: Value,
    depth: Value,
    confidence: Value,
    description: Value,
    extracted_text: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRelationship {
    source: Value,
    target: Value,
    #[serde(rename = "type")]
    kind: Value,
    strength: Value,
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

fn endpoint_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => object.get("id").and_then(text),
        other => text(other),
    }
}

fn entries<'a>(value: &'a Value, what: &str) -> &'a [Value] {
    match value {
        Value::Array(items) => items,
        Value::Null => &[],
        _ => {
            warn!(field = what, "expected a list, ignoring it");
            &[]
        }
    }
}

fn entry<'a, T: Deserialize<'a>>(value: &'a Value, what: &str, index: usize) -> Option<T> {
    if !value.is_object() {
        warn!(field = what, index, "skipping entry that is not an object");
        return None;
    }
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(field = what, index, %error, "skipping malformed entry");
            None
        }
    }
}

/// Parses either a bare graph object or an envelope carrying it under
/// `graph` or `data`.
pub fn parse_concept_graph(raw: &str) -> Result<ConceptGraph> {
    let parsed: Value = serde_json::from_str(raw).context("invalid concept graph JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("concept graph JSON must be an object"))?;

    let graph_value = ["graph", "data"]
        .into_iter()
        .find_map(|key| object.get(key).filter(|value| value.is_object()))
        .unwrap_or(&parsed);

    let raw_graph =
        RawConceptGraph::deserialize(graph_value).context("invalid concept graph structure")?;
    Ok(normalize(raw_graph))
}

pub(super) fn normalize(raw: RawConceptGraph) -> ConceptGraph {
    let complexity = number(&raw.complexity)
        .map(|value| value.round().clamp(1.0, 7.0) as u8)
        .unwrap_or(1);

    let raw_nodes = entries(&raw.nodes, "nodes");
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(raw_nodes.len().min(MAX_NODES));
    for (index, value) in raw_nodes.iter().enumerate() {
        let Some(raw_node) = entry::<RawConceptNode>(value, "nodes", index) else {
            continue;
        };
        let Some(id) = text(&raw_node.id) else {
            warn!(index, "dropping concept node without an id");
            continue;
        };
        if seen.contains(&id) {
            warn!(%id, "dropping duplicate concept node");
            continue;
        }
        if nodes.len() == MAX_NODES {
            warn!(%id, limit = MAX_NODES, "node limit reached, dropping remaining nodes");
            break;
        }

        seen.insert(id.clone());
        nodes.push(normalize_node(id, &raw_node));
    }

    let raw_relationships = entries(&raw.relationships, "relationships");
    let mut relationships = Vec::with_capacity(raw_relationships.len().min(MAX_RELATIONSHIPS));
    for (index, value) in raw_relationships.iter().enumerate() {
        let Some(raw_relationship) = entry::<RawRelationship>(value, "relationships", index) else {
            continue;
        };
        let (Some(source), Some(target)) = (
            endpoint_id(&raw_relationship.source),
            endpoint_id(&raw_relationship.target),
        ) else {
            warn!(index, "dropping relationship without both endpoints");
            continue;
        };

        if !seen.contains(&source) || !seen.contains(&target) {
            warn!(%source, %target, "dropping relationship with an unresolved endpoint");
            continue;
        }
        if source == target {
            warn!(%source, "dropping self-referencing relationship");
            continue;
        }
        if relationships.len() == MAX_RELATIONSHIPS {
            warn!(limit = MAX_RELATIONSHIPS, "relationship limit reached, dropping the rest");
            break;
        }

        let kind = match raw_relationship.kind.as_str() {
            Some(kind) => RelationKind::parse(kind).unwrap_or_else(|| {
                warn!(kind, "unknown relationship type, treating as influences");
                RelationKind::Influences
            }),
            None => RelationKind::Influences,
        };

        relationships.push(ConceptRelationship {
            source,
            target,
            kind,
            strength: clamp_unit(number(&raw_relationship.strength).unwrap_or(DEFAULT_STRENGTH) as f32),
        });
    }

    ConceptGraph {
        nodes,
        relationships,
        complexity,
        bifurcated: complexity >= BIFURCATION_COMPLEXITY,
    }
}

fn normalize_node(id: String, raw: &RawConceptNode) -> ConceptNode {
    let label = text(&raw.label).unwrap_or_else(|| id.clone());
    let label = truncate_label(&label, MAX_LABEL_CHARS).into_owned();

    let category = match raw.category.as_str() {
        Some(value) => Category::parse(value).unwrap_or_else(|| {
            warn!(%id, category = value, "unknown category, treating as metadata");
            Category::Metadata
        }),
        None => Category::Metadata,
    };

    let depth = number(&raw.depth)
        .map(|value| value.floor().max(0.0) as u32)
        .unwrap_or(0);

    ConceptNode {
        label,
        category,
        weight: clamp_unit(number(&raw.weight).unwrap_or(DEFAULT_WEIGHT) as f32),
        depth,
        confidence: clamp_unit(number(&raw.confidence).unwrap_or(1.0) as f32),
        description: raw
            .description
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned),
        extracted_text: raw
            .extracted_text
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned),
        id,
    }
}
