use eframe::egui::{Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::layout::cluster_inner_radius;
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{
    DIMMED_EDGE_OPACITY, blend_color, category_color, circle_visible, draw_background, edge_width,
    paint_edge, relation_color, relation_opacity, to_screen,
};
use super::super::scene::EdgeEmphasis;

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.scene.set_viewport(rect.width(), rect.height());
        self.scene.ensure_built();

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_drag(ui, rect, &response);
        self.handle_graph_pointer(ui, rect, &response);

        if self.scene.tick() || self.scene.is_dragging() {
            ui.ctx().request_repaint();
        }

        let transform = self.scene.transform();
        draw_background(&painter, rect, transform);

        if !self.scene.is_built() {
            return;
        }

        let visible = self.scene.visible();
        if visible.is_empty() {
            let message = if self.scene.source().is_empty() {
                "This graph has no concepts to show."
            } else {
                "No concepts match the current filters."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(170),
            );
            return;
        }

        let scale = transform.scale;

        for &(category, center) in self.scene.cluster_labels() {
            let lift = (cluster_inner_radius(visible.count_in(category)) + 28.0) * scale;
            painter.text(
                to_screen(rect, transform, center) - vec2(0.0, lift),
                Align2::CENTER_BOTTOM,
                category.label().to_uppercase(),
                FontId::proportional((12.0 * scale).clamp(9.0, 20.0)),
                category_color(category).gamma_multiply(0.8),
            );
        }

        for (index, link) in self.scene.links().iter().enumerate() {
            let (Some(start), Some(end)) = (
                self.scene.position(link.source),
                self.scene.position(link.target),
            ) else {
                continue;
            };

            let width = edge_width(link.strength);
            let (opacity, width) = match self.scene.edge_emphasis(index) {
                EdgeEmphasis::Normal => (relation_opacity(link.kind), width),
                EdgeEmphasis::Highlighted => (1.0, width * 1.6),
                EdgeEmphasis::Dimmed => (DIMMED_EDGE_OPACITY, width),
            };
            let target_radius = visible.nodes[link.target].visual_radius()
                * self.scene.node_scale(link.target)
                * scale;

            paint_edge(
                &painter,
                to_screen(rect, transform, start),
                to_screen(rect, transform, end),
                target_radius,
                link.kind,
                Stroke::new(width * scale, relation_color(link.kind).gamma_multiply(opacity)),
            );
        }

        for (index, node) in visible.nodes.iter().enumerate() {
            let Some(world) = self.scene.position(index) else {
                continue;
            };
            let center = to_screen(rect, transform, world);
            let radius = node.visual_radius() * self.scene.node_scale(index) * scale;
            if !circle_visible(rect, center, radius) {
                continue;
            }

            let base = category_color(node.category);
            let fill = base.gamma_multiply(0.45 + 0.55 * node.confidence);
            let stroke = if self.scene.is_selected(index) {
                Stroke::new(3.0, SELECTED_COLOR)
            } else if self.scene.hovered() == Some(index) {
                Stroke::new(2.0, Color32::WHITE)
            } else {
                Stroke::new(1.5, blend_color(base, Color32::WHITE, 0.35))
            };
            painter.circle(center, radius, fill, stroke);

            if scale >= 0.35 {
                let max_chars = 12 + (node.weight * 8.0).round() as usize;
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    truncate_label(&node.label, max_chars),
                    FontId::proportional((11.0 * scale).clamp(8.0, 22.0)),
                    Color32::WHITE,
                );
            }
        }
    }
}
