use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Pos2, vec2};

use crate::concept::{Category, ConceptNode};

use super::{LayoutConfig, PlacedNode, placed};

pub fn cluster_inner_radius(cluster_size: usize) -> f32 {
    (20.0 + 8.0 * cluster_size as f32).min(60.0)
}

/// Centres of the non-empty categories, evenly spaced on a ring of radius
/// `min(width, height) / 3` starting at the top.
pub fn cluster_centers(nodes: &[ConceptNode], config: LayoutConfig) -> Vec<(Category, Pos2)> {
    let clusters = active_clusters(nodes);
    clusters
        .iter()
        .enumerate()
        .map(|(slot, (category, _))| (*category, ring_point(config, slot, clusters.len())))
        .collect()
}

pub fn cluster_layout(nodes: &[ConceptNode], config: LayoutConfig) -> Vec<PlacedNode> {
    let clusters = active_clusters(nodes);
    let mut positions = vec![config.center(); nodes.len()];

    for (slot, (_, members)) in clusters.iter().enumerate() {
        let cluster_center = ring_point(config, slot, clusters.len());
        if let [only] = members.as_slice() {
            positions[*only] = cluster_center;
            continue;
        }

        let inner_radius = cluster_inner_radius(members.len());
        let angle_step = TAU / members.len() as f32;
        for (position_in_cluster, &index) in members.iter().enumerate() {
            let angle = -FRAC_PI_2 + position_in_cluster as f32 * angle_step;
            positions[index] = cluster_center + vec2(angle.cos(), angle.sin()) * inner_radius;
        }
    }

    placed(nodes, positions)
}

fn active_clusters(nodes: &[ConceptNode]) -> Vec<(Category, Vec<usize>)> {
    Category::CLUSTER_ORDER
        .into_iter()
        .map(|category| {
            let members = nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| node.category == category)
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            (category, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

fn ring_point(config: LayoutConfig, slot: usize, slots: usize) -> Pos2 {
    let ring_radius = config.width.min(config.height) / 3.0;
    let angle = -FRAC_PI_2 + slot as f32 * (TAU / slots.max(1) as f32);
    config.center() + vec2(angle.cos(), angle.sin()) * ring_radius
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::pos2;

    use super::*;
    use crate::concept::fixtures::node;

    #[test]
    fn same_category_nodes_share_a_cluster() {
        let nodes = vec![
            node("t1", Category::Task, 0, 0.9),
            node("p1", Category::Persona, 0, 0.8),
            node("t2", Category::Task, 1, 0.5),
            node("c1", Category::Constraints, 1, 0.4),
            node("t3", Category::Task, 2, 0.3),
            node("p2", Category::Persona, 1, 0.6),
        ];
        let config = LayoutConfig::new(900.0, 600.0);
        let layout = cluster_layout(&nodes, config);
        let centers = cluster_centers(&nodes, config)
            .into_iter()
            .collect::<HashMap<_, _>>();

        for (concept, placed) in nodes.iter().zip(&layout) {
            let center = centers[&concept.category];
            let members = nodes
                .iter()
                .filter(|other| other.category == concept.category)
                .count();
            let distance = placed.position().distance(center);
            assert!(distance <= cluster_inner_radius(members) + 1e-3);
        }

        let ring = 600.0 / 3.0;
        let min_separation = 2.0 * ring * (std::f32::consts::PI / 3.0).sin();
        let center_list = centers.values().copied().collect::<Vec<_>>();
        for (index, a) in center_list.iter().enumerate() {
            for b in &center_list[index + 1..] {
                assert!(a.distance(*b) >= min_separation - 1e-3);
            }
        }
    }

    #[test]
    fn clusters_follow_fixed_order_from_the_top() {
        let nodes = vec![
            node("o", Category::Output, 0, 0.5),
            node("t", Category::Task, 0, 0.5),
        ];
        let config = LayoutConfig::new(600.0, 600.0);
        let layout = cluster_layout(&nodes, config);

        // Task comes first in cluster order, so it takes the top slot.
        assert!(layout[1].position().distance(pos2(300.0, 100.0)) < 1e-3);
        assert!(layout[0].position().distance(pos2(300.0, 500.0)) < 1e-3);
    }

    #[test]
    fn inner_radius_is_capped() {
        assert_eq!(cluster_inner_radius(2), 36.0);
        assert_eq!(cluster_inner_radius(5), 60.0);
        assert_eq!(cluster_inner_radius(20), 60.0);
    }

    #[test]
    fn multi_member_cluster_spreads_around_its_centre() {
        let nodes = vec![
            node("x1", Category::Examples, 0, 0.5),
            node("x2", Category::Examples, 0, 0.5),
        ];
        let config = LayoutConfig::new(600.0, 600.0);
        let layout = cluster_layout(&nodes, config);
        let center = pos2(300.0, 100.0);
        assert!(layout[0].position().distance(center + vec2(0.0, -36.0)) < 1e-3);
        assert!(layout[1].position().distance(center + vec2(0.0, 36.0)) < 1e-3);
    }
}
