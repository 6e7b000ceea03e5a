use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::to_viewport;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.scene.zoom_about(to_viewport(rect, pointer), zoom_factor);
    }

    /// Primary drag on a node moves it; any other drag pans the view.
    pub(in crate::app) fn handle_graph_drag(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            self.scene.drag_start(to_viewport(rect, origin));
        }

        if response.dragged() {
            if self.scene.is_dragging() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    self.scene.drag_move(to_viewport(rect, pointer));
                }
            } else {
                self.scene.pan_by(response.drag_delta());
            }
        }

        if response.drag_stopped() {
            self.scene.drag_end();
        }
    }

    pub(in crate::app) fn handle_graph_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.scene.click(to_viewport(rect, pointer));
        }

        let hover = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| to_viewport(rect, pointer));
        self.scene.hover(hover);

        if self.scene.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if self.scene.hovered().is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
    }
}
