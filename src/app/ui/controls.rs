use eframe::egui::{self, RichText, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::concept::{Category, RelationKind};
use crate::layout::LayoutMode;

use super::super::ViewModel;
use super::super::render_utils::{category_color, relation_color, relation_style_name};

const FIND_RESULT_LIMIT: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn swatch(ui: &mut Ui, color: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("controls_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_layout_controls(ui);
                ui.separator();
                self.draw_category_toggles(ui);
                ui.separator();
                self.draw_search(ui);
                ui.separator();
                self.draw_node_finder(ui);
                ui.separator();
                draw_legend(ui);
                ui.separator();
                self.draw_simulation_status(ui);
            });
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout").strong());
        ui.horizontal_wrapped(|ui| {
            let current = self.scene.mode();
            for mode in LayoutMode::ALL {
                if ui.selectable_label(current == mode, mode.title()).clicked() {
                    self.scene.set_layout(mode);
                }
            }
        });

        ui.horizontal_wrapped(|ui| {
            if ui.button("Zoom in").clicked() {
                self.scene.zoom_in();
            }
            if ui.button("Zoom out").clicked() {
                self.scene.zoom_out();
            }
            if ui
                .button("Fit")
                .on_hover_text("Frame every visible node.")
                .clicked()
            {
                self.scene.fit_to_view();
            }
            if ui
                .button("Reset")
                .on_hover_text("Restore the default view and re-run the force layout.")
                .clicked()
            {
                self.scene.reset_view();
            }
        });
        ui.small(format!("zoom: {:.0}%", self.scene.transform().scale * 100.0));
    }

    fn draw_category_toggles(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Categories").strong());
        for category in Category::ALL {
            let count = self.scene.source().count_in(category);
            let shown = !self.scene.filter().is_excluded(category);
            ui.horizontal(|ui| {
                swatch(ui, category_color(category));
                let text = format!("{category} ({count})");
                if ui
                    .selectable_label(shown, text)
                    .on_hover_text("Click to show or hide this category.")
                    .clicked()
                {
                    self.scene.toggle_category(category);
                }
            });
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Search").strong())
            .on_hover_text("Hide concepts whose label and description do not contain the text.");
        if ui.text_edit_singleline(&mut self.search).changed() {
            self.scene.set_search_query(&self.search);
        }
    }

    fn draw_node_finder(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Find node").strong())
            .on_hover_text("Fuzzy-match concept labels and select one.");
        ui.text_edit_singleline(&mut self.find_query);

        let query = self.find_query.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches = self
            .scene
            .source()
            .nodes
            .iter()
            .filter_map(|node| {
                fuzzy_match_score(&matcher, &node.label, query)
                    .map(|score| (score, node.id.clone(), node.label.clone(), node.category))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.0.cmp(&a.0));
        matches.truncate(FIND_RESULT_LIMIT);

        if matches.is_empty() {
            ui.small("No matching concepts.");
            return;
        }

        let mut picked = None;
        for (_, id, label, category) in &matches {
            ui.horizontal(|ui| {
                swatch(ui, category_color(*category));
                if ui.link(label.as_str()).on_hover_text(id.as_str()).clicked() {
                    picked = Some(id.clone());
                }
            });
        }
        if let Some(id) = picked {
            self.scene.select_by_id(&id);
        }
    }

    fn draw_simulation_status(&self, ui: &mut Ui) {
        ui.label(RichText::new("Simulation").strong());
        match self.scene.simulation() {
            Some(_) if !self.scene.mode().is_simulated() => {
                ui.label("Static layout");
            }
            Some(simulation) => {
                let state = if simulation.is_running() {
                    "running"
                } else {
                    "settled"
                };
                ui.label(format!(
                    "{state} (alpha {:.3}, motion {:.1})",
                    simulation.alpha(),
                    simulation.kinetic_energy()
                ));
            }
            None => {
                ui.label("Waiting for the view size");
            }
        }
    }
}

fn draw_legend(ui: &mut Ui) {
    ui.label(RichText::new("Relationships").strong());
    for kind in RelationKind::ALL {
        ui.horizontal(|ui| {
            swatch(ui, relation_color(kind));
            ui.label(format!("{} ({})", kind.label(), relation_style_name(kind)));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_match_ignores_case() {
        let matcher = SkimMatcherV2::default();
        assert!(fuzzy_match_score(&matcher, "Output Format", "outfmt").is_some());
        assert!(fuzzy_match_score(&matcher, "Persona", "zzz").is_none());
    }
}
