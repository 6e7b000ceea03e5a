use std::cmp::Ordering;

use eframe::egui::{Pos2, pos2};
use tracing::debug;

use crate::concept::{ConceptNode, ConceptRelationship, index_nodes};

use super::{LayoutConfig, PlacedNode, grid_layout, placed};

/// Spanning forest over node indices.
///
/// A node is claimed by the first traversal that reaches it, so a node
/// with several parents hangs under whichever parent comes first in
/// relationship order. When the forest has more than one top-level node
/// they are treated as children of an implicit root that is never placed.
struct Forest {
    tops: Vec<usize>,
    children: Vec<Vec<usize>>,
    level: Vec<usize>,
    claimed: Vec<bool>,
}

impl Forest {
    // Several roots share level 0 as siblings. The implicit virtual root
    // above them is never placed and takes no level, so y runs
    // level / max_level over real nodes only instead of starting at 1.
    fn build(node_count: usize, roots: &[usize], adjacency: &[Vec<usize>]) -> Option<Self> {
        if node_count == 0 {
            return None;
        }

        let mut forest = Self {
            tops: Vec::new(),
            children: vec![Vec::new(); node_count],
            level: vec![0; node_count],
            claimed: vec![false; node_count],
        };

        for &root in roots {
            forest.plant(root, adjacency);
        }

        // Nodes unreachable from every root (e.g. a cycle hanging off the
        // rest of the graph) become extra top-level subtrees.
        for index in 0..node_count {
            if !forest.claimed[index] {
                debug!(index, "node unreachable from tree roots, adding as a separate subtree");
                forest.plant(index, adjacency);
            }
        }

        if forest.tops.is_empty() {
            None
        } else {
            Some(forest)
        }
    }

    fn plant(&mut self, root: usize, adjacency: &[Vec<usize>]) {
        if self.claimed[root] {
            return;
        }
        self.tops.push(root);
        self.claim(root, 0, adjacency);
    }

    fn claim(&mut self, index: usize, level: usize, adjacency: &[Vec<usize>]) {
        self.claimed[index] = true;
        self.level[index] = level;

        for &child in &adjacency[index] {
            if self.claimed[child] {
                continue;
            }
            self.children[index].push(child);
            self.claim(child, level + 1, adjacency);
        }
    }

    fn max_level(&self) -> usize {
        self.level.iter().copied().max().unwrap_or(0)
    }

    fn leaves_in_order(&self) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = self.tops.iter().rev().copied().collect::<Vec<_>>();
        while let Some(index) = stack.pop() {
            if self.children[index].is_empty() {
                leaves.push(index);
            } else {
                stack.extend(self.children[index].iter().rev().copied());
            }
        }
        leaves
    }

    /// Post-order x assignment: leaves take their slot, parents the middle
    /// of their children's span.
    fn assign_x(&self, index: usize, xs: &mut [f32]) -> f32 {
        if self.children[index].is_empty() {
            return xs[index];
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        for &child in &self.children[index] {
            let x = self.assign_x(child, xs);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
        xs[index] = (min_x + max_x) * 0.5;
        xs[index]
    }
}

/// Level-based tree. Roots are nodes at depth 0 or without incoming
/// relationships; with no such node the heaviest node is used instead.
pub fn hierarchy_layout(
    nodes: &[ConceptNode],
    relationships: &[ConceptRelationship],
    config: LayoutConfig,
) -> Vec<PlacedNode> {
    let index_by_id = index_nodes(nodes);
    let mut adjacency = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![0usize; nodes.len()];
    for relationship in relationships {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(relationship.source.as_str()),
            index_by_id.get(relationship.target.as_str()),
        ) else {
            continue;
        };
        adjacency[source].push(target);
        incoming[target] += 1;
    }

    let mut roots = (0..nodes.len())
        .filter(|&index| nodes[index].depth == 0 || incoming[index] == 0)
        .collect::<Vec<_>>();
    if roots.is_empty()
        && let Some(heaviest) = heaviest_node(nodes)
    {
        roots.push(heaviest);
    }

    let Some(forest) = Forest::build(nodes.len(), &roots, &adjacency) else {
        return grid_layout(nodes, config);
    };

    placed(nodes, tree_positions(&forest, nodes.len(), config))
}

fn heaviest_node(nodes: &[ConceptNode]) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .max_by(|(a_index, a), (b_index, b)| {
            a.weight
                .partial_cmp(&b.weight)
                .unwrap_or(Ordering::Equal)
                // earlier index wins ties
                .then_with(|| b_index.cmp(a_index))
        })
        .map(|(index, _)| index)
}

fn tree_positions(forest: &Forest, node_count: usize, config: LayoutConfig) -> Vec<Pos2> {
    let tree_width = (config.width - config.padding * 2.0).max(0.0);
    let tree_height = (config.height - config.padding * 2.0).max(0.0);

    let leaves = forest.leaves_in_order();
    let mut xs = vec![0.0; node_count];
    for (leaf_index, &node_index) in leaves.iter().enumerate() {
        xs[node_index] = if leaves.len() == 1 {
            config.width * 0.5
        } else {
            config.padding + (leaf_index as f32 / (leaves.len() - 1) as f32) * tree_width
        };
    }
    for &top in &forest.tops {
        forest.assign_x(top, &mut xs);
    }

    let max_level = forest.max_level();
    (0..node_count)
        .map(|index| {
            let y = if max_level == 0 {
                config.height * 0.5
            } else {
                (forest.level[index] as f32 / max_level as f32) * tree_height + config.padding
            };
            pos2(xs[index], y)
        })
        .collect()
}
