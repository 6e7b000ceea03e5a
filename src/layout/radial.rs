use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::vec2;

use crate::concept::ConceptNode;

use super::{LayoutConfig, PlacedNode, placed};

/// Concentric rings by depth. Depth 0 sits at the centre and the deepest
/// level on the outer ring; each ring starts at the top and runs clockwise
/// in input order.
pub fn radial_layout(nodes: &[ConceptNode], config: LayoutConfig) -> Vec<PlacedNode> {
    let center = config.center();
    let max_radius = (config.width.min(config.height) * 0.5 - config.padding).max(0.0);
    let max_depth = nodes.iter().map(|node| node.depth).max().unwrap_or(0);

    let mut rings: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, node) in nodes.iter().enumerate() {
        rings.entry(node.depth).or_default().push(index);
    }

    let mut positions = vec![center; nodes.len()];
    for (depth, members) in &rings {
        let radius = if max_depth == 0 {
            0.0
        } else {
            (*depth as f32 / max_depth as f32) * max_radius
        };
        let angle_step = TAU / members.len() as f32;

        for (slot, &index) in members.iter().enumerate() {
            let angle = -FRAC_PI_2 + slot as f32 * angle_step;
            positions[index] = center + vec2(angle.cos(), angle.sin()) * radius;
        }
    }

    placed(nodes, positions)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use eframe::egui::{Pos2, pos2};

    use super::*;
    use crate::concept::Category;
    use crate::concept::fixtures::{four_node_graph, node};

    const EPSILON: f32 = 1e-3;

    fn assert_close(actual: Pos2, expected: Pos2) {
        assert!(
            actual.distance(expected) < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn four_node_scenario() {
        let graph = four_node_graph();
        let config = LayoutConfig::new(800.0, 600.0);
        let layout = radial_layout(&graph.nodes, config);

        let center = pos2(400.0, 300.0);
        let max_radius = 300.0 - 50.0;

        assert_close(layout[0].position(), center);

        let half = max_radius * 0.5;
        let top = -PI / 2.0;
        let bottom = -PI / 2.0 + PI;
        assert_close(
            layout[1].position(),
            center + vec2(top.cos(), top.sin()) * half,
        );
        assert_close(
            layout[2].position(),
            center + vec2(bottom.cos(), bottom.sin()) * half,
        );
        assert_close(layout[3].position(), pos2(400.0, 300.0 - max_radius));
    }

    #[test]
    fn ring_distance_follows_depth() {
        let nodes = (0..9)
            .map(|index| node(&format!("n{index}"), Category::Context, index % 4, 0.5))
            .collect::<Vec<_>>();
        let config = LayoutConfig::new(1000.0, 700.0);
        let layout = radial_layout(&nodes, config);
        let max_radius = 350.0 - 50.0;

        for (concept, placed) in nodes.iter().zip(&layout) {
            let expected = concept.depth as f32 / 3.0 * max_radius;
            let distance = placed.position().distance(config.center());
            assert!((distance - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn single_depth_collapses_to_centre() {
        let nodes = vec![
            node("a", Category::Task, 0, 0.9),
            node("b", Category::Persona, 0, 0.4),
        ];
        let config = LayoutConfig::new(640.0, 480.0);
        for placed in radial_layout(&nodes, config) {
            assert_close(placed.position(), config.center());
        }
    }

    #[test]
    fn lone_ring_member_sits_at_the_top() {
        let nodes = vec![
            node("root", Category::Task, 0, 1.0),
            node("only", Category::Output, 1, 0.5),
        ];
        let config = LayoutConfig::new(600.0, 600.0);
        let layout = radial_layout(&nodes, config);
        assert_close(layout[1].position(), pos2(300.0, 50.0));
    }
}
