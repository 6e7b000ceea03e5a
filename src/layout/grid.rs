use eframe::egui::pos2;

use crate::concept::ConceptNode;

use super::{LayoutConfig, PlacedNode, placed};

/// Row-major grid with `ceil(sqrt(n))` columns, each node centred in its
/// cell. Used when the tree layout has nothing to work with.
pub fn grid_layout(nodes: &[ConceptNode], config: LayoutConfig) -> Vec<PlacedNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let columns = (nodes.len() as f32).sqrt().ceil().max(1.0) as usize;
    let rows = nodes.len().div_ceil(columns);
    let cell_width = (config.width - config.padding * 2.0).max(0.0) / columns as f32;
    let cell_height = (config.height - config.padding * 2.0).max(0.0) / rows as f32;

    let positions = (0..nodes.len())
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            pos2(
                config.padding + (column as f32 + 0.5) * cell_width,
                config.padding + (row as f32 + 0.5) * cell_height,
            )
        })
        .collect();

    placed(nodes, positions)
}
