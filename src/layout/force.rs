use eframe::egui::vec2;

use crate::concept::ConceptNode;
use crate::util::stable_pair;

use super::{LayoutConfig, PlacedNode, placed};

const SEED_JITTER: f32 = 50.0;

/// Starting positions for the force simulation: the viewport centre plus up
/// to 50 units of per-node jitter on each axis.
pub fn seed_layout(nodes: &[ConceptNode], config: LayoutConfig) -> Vec<PlacedNode> {
    let center = config.center();
    let positions = nodes
        .iter()
        .map(|node| {
            let (jx, jy) = stable_pair(&node.id);
            center + vec2(jx, jy) * SEED_JITTER
        })
        .collect();

    placed(nodes, positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::Category;
    use crate::concept::fixtures::node;

    #[test]
    fn seeds_stay_within_jitter_box() {
        let nodes = (0..20)
            .map(|index| node(&format!("seed-{index}"), Category::Task, 0, 0.5))
            .collect::<Vec<_>>();
        let config = LayoutConfig::new(800.0, 600.0);
        for placed in seed_layout(&nodes, config) {
            assert!((placed.x - 400.0).abs() <= SEED_JITTER);
            assert!((placed.y - 300.0).abs() <= SEED_JITTER);
        }
    }
}
