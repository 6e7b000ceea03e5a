use eframe::egui::{Pos2, Vec2, vec2};

use super::{SimLink, SimNode};

/// Tiny deterministic offset used when two points coincide.
fn jiggle(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

/// Springs pulling each linked pair toward `distance`. The less connected
/// endpoint takes the larger share of the correction.
pub(super) fn apply_links(
    nodes: &mut [SimNode],
    links: &[SimLink],
    distance: f32,
    alpha: f32,
) {
    for link in links {
        let source = &nodes[link.source];
        let target = &nodes[link.target];
        let mut delta = (target.position + target.velocity) - (source.position + source.velocity);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle(link.source, link.target);
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * link.strength);

        nodes[link.target].velocity -= correction * link.bias;
        nodes[link.source].velocity += correction * (1.0 - link.bias);
    }
}

/// All-pairs repulsion falling off with squared distance. `strength` is
/// negative for repulsion.
pub(super) fn apply_charge(nodes: &mut [SimNode], strength: f32, distance_min: f32, alpha: f32) {
    let distance_min_sq = distance_min * distance_min;
    let count = nodes.len();
    let mut impulses = vec![Vec2::ZERO; count];

    for i in 0..count {
        for j in (i + 1)..count {
            let mut delta = nodes[j].position - nodes[i].position;
            if delta.length_sq() <= f32::EPSILON {
                delta = jiggle(i, j);
            }

            let mut distance_sq = delta.length_sq();
            if distance_sq < distance_min_sq {
                distance_sq = (distance_min_sq * distance_sq).sqrt();
            }

            let impulse = delta * (strength * alpha / distance_sq);
            impulses[i] += impulse;
            impulses[j] -= impulse;
        }
    }

    for (node, impulse) in nodes.iter_mut().zip(impulses) {
        node.velocity += impulse;
    }
}

/// Moves every node so the mean position drifts toward `center`.
pub(super) fn apply_centering(nodes: &mut [SimNode], center: Pos2, strength: f32) {
    if nodes.is_empty() {
        return;
    }

    let mut mean = Vec2::ZERO;
    for node in nodes.iter() {
        mean += node.position.to_vec2();
    }
    mean /= nodes.len() as f32;

    let shift = (center.to_vec2() - mean) * strength;
    for node in nodes.iter_mut() {
        node.position += shift;
    }
}

/// Pushes apart any pair whose predicted positions overlap their padded
/// radii. Not scaled by alpha, so overlap is resolved even when cool.
pub(super) fn apply_collisions(nodes: &mut [SimNode], padding: f32, strength: f32) {
    let count = nodes.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let radius_i = nodes[i].radius + padding;
            let radius_j = nodes[j].radius + padding;
            let reach = radius_i + radius_j;

            let mut delta = (nodes[i].position + nodes[i].velocity)
                - (nodes[j].position + nodes[j].velocity);
            let distance_sq = delta.length_sq();
            if distance_sq >= reach * reach {
                continue;
            }
            if distance_sq <= f32::EPSILON {
                delta = jiggle(i, j);
            }

            let distance = delta.length();
            let push = delta * ((reach - distance) / distance * strength);
            let share_i = (radius_j * radius_j) / (radius_i * radius_i + radius_j * radius_j);

            nodes[i].velocity += push * share_i;
            nodes[j].velocity -= push * (1.0 - share_i);
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn sim_node(x: f32, y: f32, radius: f32) -> SimNode {
        SimNode {
            id: format!("{x}:{y}"),
            position: pos2(x, y),
            velocity: Vec2::ZERO,
            pin: None,
            radius,
        }
    }

    #[test]
    fn charge_pushes_nodes_apart() {
        let mut nodes = vec![sim_node(0.0, 0.0, 15.0), sim_node(10.0, 0.0, 15.0)];
        apply_charge(&mut nodes, -400.0, 1.0, 1.0);
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[1].velocity.x > 0.0);
        assert_eq!(nodes[0].velocity.x, -nodes[1].velocity.x);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = vec![sim_node(0.0, 0.0, 15.0), sim_node(300.0, 0.0, 15.0)];
        let links = vec![SimLink {
            source: 0,
            target: 1,
            strength: 0.35,
            bias: 0.5,
        }];
        apply_links(&mut nodes, &links, 120.0, 1.0);
        assert!(nodes[0].velocity.x > 0.0);
        assert!(nodes[1].velocity.x < 0.0);
    }

    #[test]
    fn centering_moves_mean_toward_center() {
        let mut nodes = vec![sim_node(0.0, 0.0, 15.0), sim_node(100.0, 0.0, 15.0)];
        apply_centering(&mut nodes, pos2(150.0, 0.0), 1.0);
        assert_eq!(nodes[0].position, pos2(100.0, 0.0));
        assert_eq!(nodes[1].position, pos2(200.0, 0.0));
    }

    #[test]
    fn overlapping_nodes_collide() {
        let mut nodes = vec![sim_node(0.0, 0.0, 20.0), sim_node(5.0, 0.0, 20.0)];
        apply_collisions(&mut nodes, 10.0, 1.0);
        assert!(nodes[0].velocity.x < 0.0);
        assert!(nodes[1].velocity.x > 0.0);

        let mut apart = vec![sim_node(0.0, 0.0, 20.0), sim_node(500.0, 0.0, 20.0)];
        apply_collisions(&mut apart, 10.0, 1.0);
        assert_eq!(apart[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn coincident_nodes_do_not_produce_nan() {
        let mut nodes = vec![sim_node(10.0, 10.0, 15.0), sim_node(10.0, 10.0, 15.0)];
        apply_charge(&mut nodes, -400.0, 1.0, 1.0);
        apply_collisions(&mut nodes, 10.0, 1.0);
        for node in &nodes {
            assert!(node.velocity.x.is_finite() && node.velocity.y.is_finite());
        }
    }
}
