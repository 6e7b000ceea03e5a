use std::mem;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::{debug, info};

use crate::concept::{Category, ConceptGraph, ConceptNode, GraphFilter};
use crate::layout::{LayoutConfig, LayoutMode, ResolvedLink, cluster_centers, compute_layout};
use crate::physics::{ForceConfig, Simulation};

use super::transform::ViewTransform;

pub const HOVER_SCALE: f32 = 1.2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    NodeClicked(Option<String>),
    HoverChanged(Option<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEmphasis {
    Normal,
    Highlighted,
    Dimmed,
}

pub struct GraphScene {
    source: ConceptGraph,
    filter: GraphFilter,
    visible: ConceptGraph,
    mode: LayoutMode,
    viewport: LayoutConfig,
    transform: ViewTransform,
    force_config: ForceConfig,
    simulation: Option<Simulation>,
    links: Vec<ResolvedLink>,
    cluster_labels: Vec<(Category, Pos2)>,
    selected: Option<String>,
    hovered: Option<usize>,
    dragging: Option<usize>,
    dirty: bool,
    revision: u64,
    events: Vec<SceneEvent>,
}

impl GraphScene {
    pub fn new(graph: ConceptGraph, mode: LayoutMode) -> Self {
        let filter = GraphFilter::default();
        let visible = filter.apply(&graph);
        Self {
            source: graph,
            filter,
            visible,
            mode,
            viewport: LayoutConfig::new(0.0, 0.0),
            transform: ViewTransform::IDENTITY,
            force_config: ForceConfig::default(),
            simulation: None,
            links: Vec::new(),
            cluster_labels: Vec::new(),
            selected: None,
            hovered: None,
            dragging: None,
            dirty: true,
            revision: 0,
            events: Vec::new(),
        }
    }

    /// Replaces the graph wholesale. Selection survives when the selected
    /// id still exists.
    pub fn set_graph(&mut self, graph: ConceptGraph) {
        self.source = graph;
        if let Some(selected) = &self.selected
            && self.source.node(selected).is_none()
        {
            self.selected = None;
        }
        self.refilter();
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if (self.viewport.width - width).abs() < 0.5 && (self.viewport.height - height).abs() < 0.5 {
            return;
        }
        self.viewport.width = width;
        self.viewport.height = height;
        self.invalidate();
    }

    pub fn set_layout(&mut self, mode: LayoutMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.invalidate();
    }

    pub fn toggle_category(&mut self, category: Category) -> bool {
        let excluded = self.filter.toggle_category(category);
        self.refilter();
        excluded
    }

    pub fn set_search_query(&mut self, query: &str) {
        if self.filter.search_query() == query {
            return;
        }
        self.filter.set_search_query(query);
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = self.filter.apply(&self.source);
        self.invalidate();
    }

    /// Stops the current simulation; the next [`Self::ensure_built`]
    /// rebuilds positions from scratch.
    fn invalidate(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
        self.dirty = true;
    }

    /// Rebuilds layout and simulation if anything changed. Does nothing
    /// until the viewport has a usable size. Returns true on rebuild.
    pub fn ensure_built(&mut self) -> bool {
        if !self.dirty || !self.viewport.is_measured() {
            return false;
        }

        let layout = compute_layout(self.mode, &self.visible, self.viewport);
        let radii = self
            .visible
            .nodes
            .iter()
            .map(ConceptNode::visual_radius)
            .collect::<Vec<_>>();
        let sim_nodes = Simulation::nodes_from_layout(&layout, &radii);
        let center = self.viewport.center();

        self.simulation = Some(if self.mode.is_simulated() {
            Simulation::new(sim_nodes, &layout.links, center, self.force_config)
        } else {
            Simulation::frozen(sim_nodes, &layout.links, center, self.force_config)
        });
        self.cluster_labels = if self.mode == LayoutMode::Cluster {
            cluster_centers(&self.visible.nodes, self.viewport)
        } else {
            Vec::new()
        };
        self.links = layout.links;

        if self.hovered.take().is_some() {
            self.events.push(SceneEvent::HoverChanged(None));
        }
        self.dragging = None;
        self.dirty = false;
        self.revision += 1;

        info!(
            mode = %self.mode,
            nodes = self.visible.nodes.len(),
            links = self.links.len(),
            width = self.viewport.width,
            height = self.viewport.height,
            revision = self.revision,
            "rebuilt graph scene"
        );
        true
    }

    pub fn tick(&mut self) -> bool {
        self.ensure_built();
        self.simulation
            .as_mut()
            .is_some_and(|simulation| simulation.tick())
    }

    pub fn is_built(&self) -> bool {
        !self.dirty && self.simulation.is_some()
    }

    pub fn source(&self) -> &ConceptGraph {
        &self.source
    }

    pub fn visible(&self) -> &ConceptGraph {
        &self.visible
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn links(&self) -> &[ResolvedLink] {
        &self.links
    }

    pub fn cluster_labels(&self) -> &[(Category, Pos2)] {
        &self.cluster_labels
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn position(&self, index: usize) -> Option<Pos2> {
        self.simulation
            .as_ref()
            .and_then(|simulation| simulation.nodes().get(index))
            .map(|node| node.position)
    }

    pub fn screen_position(&self, index: usize) -> Option<Pos2> {
        self.position(index)
            .map(|position| self.transform.apply(position))
    }

    /// Topmost node under a viewport-space point. Later nodes are drawn
    /// over earlier ones, so they win ties.
    pub fn hit_test(&self, screen: Pos2) -> Option<usize> {
        if !self.is_built() {
            return None;
        }
        let world = self.transform.invert(screen);
        let simulation = self.simulation.as_ref()?;
        simulation
            .nodes()
            .iter()
            .enumerate()
            .rev()
            .find(|(index, node)| {
                node.position.distance(world) <= node.radius * self.node_scale(*index)
            })
            .map(|(index, _)| index)
    }

    pub fn hover(&mut self, screen: Option<Pos2>) {
        if self.dragging.is_some() {
            return;
        }
        let hovered = screen.and_then(|screen| self.hit_test(screen));
        if hovered == self.hovered {
            return;
        }
        self.hovered = hovered;
        let id = hovered.map(|index| self.visible.nodes[index].id.clone());
        debug!(node = ?id, "hover changed");
        self.events.push(SceneEvent::HoverChanged(id));
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Toggles selection of the node under the pointer; a click on empty
    /// background clears it.
    pub fn click(&mut self, screen: Pos2) {
        match self.hit_test(screen) {
            Some(index) => {
                let id = self.visible.nodes[index].id.clone();
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                } else {
                    self.selected = Some(id.clone());
                }
                self.events.push(SceneEvent::NodeClicked(Some(id)));
            }
            None => {
                self.selected = None;
                self.events.push(SceneEvent::NodeClicked(None));
            }
        }
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        if self.source.node(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_owned());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_node(&self) -> Option<&ConceptNode> {
        self.selected.as_deref().and_then(|id| self.source.node(id))
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.as_deref() == self.visible.nodes.get(index).map(|node| node.id.as_str())
    }

    pub fn drag_start(&mut self, screen: Pos2) -> bool {
        let Some(index) = self.hit_test(screen) else {
            return false;
        };
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };

        let Some(position) = simulation.nodes().get(index).map(|node| node.position) else {
            return false;
        };
        simulation.pin(index, position);
        if self.mode.is_simulated() {
            simulation.set_alpha_target(self.force_config.drag_alpha_target);
            simulation.reheat(self.force_config.drag_alpha_target);
        }
        self.dragging = Some(index);
        debug!(node = %self.visible.nodes[index].id, "drag started");
        true
    }

    pub fn drag_move(&mut self, screen: Pos2) {
        let Some(index) = self.dragging else {
            return;
        };
        let world = self.transform.invert(screen);
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.pin(index, world);
        }
    }

    pub fn drag_end(&mut self) {
        let Some(index) = self.dragging.take() else {
            return;
        };
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.unpin(index);
            if self.mode.is_simulated() {
                simulation.set_alpha_target(0.0);
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.pan_by(delta);
    }

    pub fn zoom_about(&mut self, anchor: Pos2, factor: f32) {
        self.transform.scale_about(anchor, factor);
    }

    pub fn zoom_in(&mut self) {
        self.transform.zoom_in(self.viewport_size());
    }

    pub fn zoom_out(&mut self) {
        self.transform.zoom_out(self.viewport_size());
    }

    pub fn fit_to_view(&mut self) {
        let Some(simulation) = self.simulation.as_ref() else {
            return;
        };
        let bounds = simulation
            .nodes()
            .iter()
            .fold(Rect::NOTHING, |bounds, node| bounds.union(Rect::from_min_max(node.position, node.position)));
        if let Some(transform) = ViewTransform::fit(bounds, self.viewport_size()) {
            self.transform = transform;
        }
    }

    pub fn reset_view(&mut self) {
        self.transform = ViewTransform::IDENTITY;
        if self.mode.is_simulated()
            && let Some(simulation) = self.simulation.as_mut()
        {
            simulation.reheat(self.force_config.reheat_alpha);
        }
    }

    fn viewport_size(&self) -> Vec2 {
        vec2(self.viewport.width, self.viewport.height)
    }

    pub fn edge_emphasis(&self, index: usize) -> EdgeEmphasis {
        let Some(hovered) = self.hovered else {
            return EdgeEmphasis::Normal;
        };
        match self.links.get(index) {
            Some(link) if link.source == hovered || link.target == hovered => {
                EdgeEmphasis::Highlighted
            }
            _ => EdgeEmphasis::Dimmed,
        }
    }

    pub fn node_scale(&self, index: usize) -> f32 {
        if self.hovered == Some(index) {
            HOVER_SCALE
        } else {
            1.0
        }
    }

    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        mem::take(&mut self.events)
    }
}
