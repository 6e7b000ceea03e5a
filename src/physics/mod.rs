mod forces;

use eframe::egui::{Pos2, Vec2};
use tracing::{debug, warn};

use crate::layout::{Layout, ResolvedLink};

use forces::{apply_centering, apply_charge, apply_collisions, apply_links};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceConfig {
    pub link_distance: f32,
    pub link_strength_scale: f32,
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub center_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub drag_alpha_target: f32,
    pub reheat_alpha: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 120.0,
            link_strength_scale: 0.5,
            charge_strength: -400.0,
            charge_distance_min: 1.0,
            center_strength: 0.1,
            collision_padding: 10.0,
            collision_strength: 1.0,
            velocity_decay: 0.4,
            alpha_min,
            // reaches alpha_min after ~300 ticks from 1.0
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            drag_alpha_target: 0.3,
            reheat_alpha: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
    pub id: String,
    pub position: Pos2,
    pub velocity: Vec2,
    /// Fixed position overriding the forces, set while dragging.
    pub pin: Option<Pos2>,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimLink {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) strength: f32,
    pub(crate) bias: f32,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    center: Pos2,
    config: ForceConfig,
    alpha: f32,
    alpha_target: f32,
    running: bool,
}

impl Simulation {
    /// Builds a hot simulation. Links pointing outside `nodes` are dropped
    /// here so ticks never index a missing node.
    pub fn new(nodes: Vec<SimNode>, links: &[ResolvedLink], center: Pos2, config: ForceConfig) -> Self {
        let node_count = nodes.len();
        let mut degree = vec![0usize; node_count];
        let valid = links
            .iter()
            .filter(|link| {
                let ok = link.source < node_count
                    && link.target < node_count
                    && link.source != link.target;
                if !ok {
                    warn!(
                        source = link.source,
                        target = link.target,
                        "dropping link outside the simulated node set"
                    );
                }
                ok
            })
            .collect::<Vec<_>>();

        for link in &valid {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let links = valid
            .into_iter()
            .map(|link| SimLink {
                source: link.source,
                target: link.target,
                strength: link.strength * config.link_strength_scale,
                bias: degree[link.source] as f32
                    / (degree[link.source] + degree[link.target]) as f32,
            })
            .collect();

        Self {
            nodes,
            links,
            center,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
        }
    }

    pub fn frozen(nodes: Vec<SimNode>, links: &[ResolvedLink], center: Pos2, config: ForceConfig) -> Self {
        let mut simulation = Self::new(nodes, links, center, config);
        simulation.alpha = 0.0;
        simulation.running = false;
        simulation
    }

    pub fn nodes_from_layout(layout: &Layout, radii: &[f32]) -> Vec<SimNode> {
        layout
            .nodes
            .iter()
            .zip(radii)
            .map(|(placed, &radius)| SimNode {
                id: placed.id.clone(),
                position: placed.position(),
                velocity: Vec2::ZERO,
                pin: None,
                radius,
            })
            .collect()
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
        self.running = true;
    }

    /// Sets the temperature alpha decays toward. A non-zero target keeps
    /// the simulation alive, which is what dragging relies on.
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        if self.alpha_target > 0.0 {
            self.running = true;
        }
    }

    /// Fixes a node at `position`. The node jumps there immediately so a
    /// stopped simulation still follows the pointer.
    pub fn pin(&mut self, index: usize, position: Pos2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = Some(position);
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        apply_links(
            &mut self.nodes,
            &self.links,
            self.config.link_distance,
            self.alpha,
        );
        apply_charge(
            &mut self.nodes,
            self.config.charge_strength,
            self.config.charge_distance_min,
            self.alpha,
        );
        apply_collisions(
            &mut self.nodes,
            self.config.collision_padding,
            self.config.collision_strength,
        );
        apply_centering(&mut self.nodes, self.center, self.config.center_strength);

        let keep = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= keep;
                node.position += node.velocity;
            }
        }

        if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
            debug!(alpha = self.alpha, "simulation settled");
            self.running = false;
        }
        true
    }

    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.nodes.iter().map(|node| node.velocity.length()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::fixtures::four_node_graph;
    use crate::layout::{LayoutConfig, LayoutMode, compute_layout};

    fn four_node_simulation() -> Simulation {
        let graph = four_node_graph();
        let config = LayoutConfig::new(800.0, 600.0);
        let layout = compute_layout(LayoutMode::Force, &graph, config);
        let radii = graph
            .nodes
            .iter()
            .map(|node| node.visual_radius())
            .collect::<Vec<_>>();
        Simulation::new(
            Simulation::nodes_from_layout(&layout, &radii),
            &layout.links,
            config.center(),
            ForceConfig::default(),
        )
    }

    // Seeded nodes start within 50px of the centre, so the first ticks are
    // spent pushing overlapping discs apart and energy can still bounce.
    const WARM_UP_TICKS: usize = 10;

    #[test]
    fn settles_from_jittered_start() {
        let mut simulation = four_node_simulation();

        let mut energies = Vec::new();
        for _ in 0..300 {
            simulation.tick();
            energies.push(simulation.kinetic_energy());
        }

        let peak = energies.iter().copied().fold(0.0_f32, f32::max);
        let last = *energies.last().expect("ticks recorded");
        assert!(last < 0.5, "still moving: {last}");
        assert!(last < peak);

        for (offset, pair) in energies[WARM_UP_TICKS..].windows(2).enumerate() {
            assert!(
                pair[1] <= pair[0] + 1e-4,
                "energy rose after tick {}: {} -> {}",
                WARM_UP_TICKS + offset,
                pair[0],
                pair[1]
            );
        }

        simulation.run(1_000);
        assert!(!simulation.is_running());
        assert!(simulation.alpha() < ForceConfig::default().alpha_min);
    }

    #[test]
    fn settled_layout_spreads_nodes_apart() {
        let mut simulation = four_node_simulation();
        simulation.run(1_000);

        let nodes = simulation.nodes();
        for (index, a) in nodes.iter().enumerate() {
            for b in &nodes[index + 1..] {
                assert!(a.position.distance(b.position) > a.radius.max(b.radius));
            }
        }
    }

    #[test]
    fn pinned_node_stays_put_and_keeps_simulation_alive() {
        let mut simulation = four_node_simulation();
        simulation.run(1_000);
        assert!(!simulation.is_running());

        let target = Pos2::new(100.0, 100.0);
        simulation.pin(0, target);
        simulation.set_alpha_target(0.3);
        assert!(simulation.is_running());

        for _ in 0..50 {
            simulation.tick();
        }
        assert_eq!(simulation.nodes()[0].position, target);
        assert!(simulation.is_running());
        assert!(simulation.alpha() > 0.1);

        simulation.unpin(0);
        simulation.set_alpha_target(0.0);
        simulation.run(1_000);
        assert!(!simulation.is_running());
    }

    #[test]
    fn frozen_simulation_does_not_move_nodes() {
        let graph = four_node_graph();
        let config = LayoutConfig::new(800.0, 600.0);
        let layout = compute_layout(LayoutMode::Radial, &graph, config);
        let radii = vec![20.0; layout.nodes.len()];
        let mut simulation = Simulation::frozen(
            Simulation::nodes_from_layout(&layout, &radii),
            &layout.links,
            config.center(),
            ForceConfig::default(),
        );

        assert!(!simulation.tick());
        for (node, placed) in simulation.nodes().iter().zip(&layout.nodes) {
            assert_eq!(node.position, placed.position());
        }

        simulation.pin(2, Pos2::new(10.0, 20.0));
        assert_eq!(simulation.nodes()[2].position, Pos2::new(10.0, 20.0));
    }

    #[test]
    fn out_of_range_links_are_dropped() {
        let nodes = vec![
            SimNode {
                id: "a".to_owned(),
                position: Pos2::new(0.0, 0.0),
                velocity: Vec2::ZERO,
                pin: None,
                radius: 15.0,
            },
            SimNode {
                id: "b".to_owned(),
                position: Pos2::new(50.0, 0.0),
                velocity: Vec2::ZERO,
                pin: None,
                radius: 15.0,
            },
        ];
        let links = [
            ResolvedLink {
                source: 0,
                target: 7,
                kind: crate::concept::RelationKind::Requires,
                strength: 0.5,
            },
            ResolvedLink {
                source: 0,
                target: 1,
                kind: crate::concept::RelationKind::Influences,
                strength: 0.8,
            },
        ];
        let mut simulation = Simulation::new(nodes, &links, Pos2::new(25.0, 0.0), ForceConfig::default());
        assert_eq!(simulation.links.len(), 1);
        assert!((simulation.links[0].strength - 0.4).abs() < 1e-6);
        assert!(simulation.tick());
    }
}
