use eframe::egui::{self, RichText, Ui};

use crate::concept::RelationKind;

use super::super::ViewModel;
use super::super::render_utils::{category_color, relation_color};

struct ConnectionRow {
    id: String,
    label: String,
    kind: RelationKind,
    strength: f32,
    outgoing: bool,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Concept Details");
        ui.add_space(6.0);

        let Some(node) = self.scene.selected_node() else {
            ui.label("Select a concept in the graph to inspect it.");
            return;
        };

        let node = node.clone();
        let hidden = self.scene.visible().node(&node.id).is_none();
        let connections = self
            .scene
            .source()
            .connections(&node.id)
            .into_iter()
            .map(|connection| ConnectionRow {
                id: connection.other.id.clone(),
                label: connection.other.label.clone(),
                kind: connection.kind,
                strength: connection.strength,
                outgoing: connection.outgoing,
            })
            .collect::<Vec<_>>();

        ui.horizontal(|ui| {
            ui.label(RichText::new(node.label.as_str()).strong());
            if ui.small_button("Clear").clicked() {
                self.scene.clear_selection();
            }
        });
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(RichText::new(node.category.label()).color(category_color(node.category)));
        ui.label(format!("Weight: {:.2}", node.weight));
        ui.label(format!("Depth: {}", node.depth));
        ui.label(format!("Confidence: {:.0}%", node.confidence * 100.0));
        if hidden {
            ui.small("Hidden by the current filters.");
        }

        if let Some(description) = &node.description {
            ui.separator();
            ui.label(RichText::new("Description").strong());
            ui.label(description.as_str());
        }

        if let Some(extracted) = &node.extracted_text {
            ui.separator();
            ui.label(RichText::new("Extracted text").strong());
            egui::ScrollArea::vertical()
                .id_salt("extracted_text_scroll")
                .max_height(160.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(extracted.as_str()).italics());
                });
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        if connections.is_empty() {
            ui.label("No relationships touch this concept.");
            return;
        }

        let mut jump_to = None;
        for row in &connections {
            ui.horizontal(|ui| {
                let arrow = if row.outgoing { "->" } else { "<-" };
                ui.label(
                    RichText::new(format!("{arrow} {}", row.kind.label()))
                        .color(relation_color(row.kind)),
                );
                if ui
                    .link(row.label.as_str())
                    .on_hover_text(format!("strength {:.2}", row.strength))
                    .clicked()
                {
                    jump_to = Some(row.id.clone());
                }
            });
        }

        if let Some(id) = jump_to {
            self.scene.select_by_id(&id);
        }
    }
}
