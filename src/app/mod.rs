use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::concept::{ConceptGraph, load_concept_graph};
use crate::layout::LayoutMode;

use scene::GraphScene;

mod graph;
mod render_utils;
mod scene;
mod transform;
mod ui;

type LoadResult = Result<ConceptGraph, String>;

pub struct ConceptLensApp {
    graph_path: PathBuf,
    initial_layout: LayoutMode,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    scene: GraphScene,
    search: String,
    find_query: String,
    hover_label: Option<String>,
}

impl ConceptLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, graph_path: PathBuf, initial_layout: LayoutMode) -> Self {
        let state = Self::start_load(graph_path.clone());
        Self {
            graph_path,
            initial_layout,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_concept_graph(&graph_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(graph_path: PathBuf) -> AppState {
        info!(path = %graph_path.display(), "loading concept graph");
        AppState::Loading {
            rx: Self::spawn_load(graph_path),
        }
    }

    fn loaded(&self, result: LoadResult) -> AppState {
        match result {
            Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph, self.initial_layout))),
            Err(message) => {
                error!(%message, "concept graph load failed");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for ConceptLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading concept graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load concept graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let source = self.graph_path.display().to_string();
                model.show(ctx, &source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.graph_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // layout mode, filters and view carry over
                        Ok(Ok(graph)) => {
                            info!(nodes = graph.nodes.len(), "reloaded concept graph");
                            model.scene.set_graph(graph);
                        }
                        Ok(Err(message)) => transition = Some(Err(message)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.graph_path.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.loaded(result);
        }
    }
}
