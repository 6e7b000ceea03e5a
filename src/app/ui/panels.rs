use eframe::egui::{self, Align, Color32, Context, Layout, RichText};
use tracing::debug;

use crate::concept::ConceptGraph;
use crate::layout::LayoutMode;

use super::super::ViewModel;
use super::super::scene::{GraphScene, SceneEvent};

impl ViewModel {
    pub(in crate::app) fn new(graph: ConceptGraph, mode: LayoutMode) -> Self {
        Self {
            scene: GraphScene::new(graph, mode),
            search: String::new(),
            find_query: String::new(),
            hover_label: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("concept-lens");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(self.visible_graph_text());
                    ui.label(format!("complexity: {}", self.scene.source().complexity));
                    if self.scene.source().bifurcated {
                        ui.label(
                            RichText::new("bifurcated")
                                .strong()
                                .color(Color32::from_rgb(246, 178, 72)),
                        )
                        .on_hover_text("This graph contains branching alternative paths.");
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(label) = &self.hover_label {
                            ui.label(format!("hovering: {label}"));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        self.drain_scene_events();
    }

    fn visible_graph_text(&self) -> String {
        let source = self.scene.source();
        let visible = self.scene.visible();
        if self.scene.filter().is_active() {
            format!(
                "nodes: {}/{}  edges: {}/{}",
                visible.nodes.len(),
                source.nodes.len(),
                visible.relationships.len(),
                source.relationships.len()
            )
        } else {
            format!(
                "nodes: {}  edges: {}",
                source.nodes.len(),
                source.relationships.len()
            )
        }
    }

    fn drain_scene_events(&mut self) {
        for event in self.scene.take_events() {
            debug!(?event, "scene event");
            if let SceneEvent::HoverChanged(id) = event {
                self.hover_label = id
                    .and_then(|id| self.scene.source().node(&id))
                    .map(|node| node.label.clone());
            }
        }
    }
}
