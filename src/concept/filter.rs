use std::collections::{BTreeSet, HashSet};

use super::graph::{Category, ConceptGraph, ConceptNode};

/// Category exclusion plus text search over a concept graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphFilter {
    excluded: BTreeSet<Category>,
    search: String,
}

impl GraphFilter {
    /// Flips the visibility of `category`. Returns true when it is now hidden.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        if self.excluded.remove(&category) {
            false
        } else {
            self.excluded.insert(category);
            true
        }
    }

    pub fn is_excluded(&self, category: Category) -> bool {
        self.excluded.contains(&category)
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    pub fn is_active(&self) -> bool {
        !self.excluded.is_empty() || !self.search.trim().is_empty()
    }

    /// Builds a new graph holding the surviving nodes and only the
    /// relationships whose endpoints both survive. `graph` is untouched.
    pub fn apply(&self, graph: &ConceptGraph) -> ConceptGraph {
        let needle = self.search.trim().to_lowercase();

        let nodes = graph
            .nodes
            .iter()
            .filter(|node| !self.excluded.contains(&node.category))
            .filter(|node| needle.is_empty() || matches_search(node, &needle))
            .cloned()
            .collect::<Vec<_>>();

        let kept = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let relationships = graph
            .relationships
            .iter()
            .filter(|relationship| {
                kept.contains(relationship.source.as_str())
                    && kept.contains(relationship.target.as_str())
            })
            .cloned()
            .collect();

        ConceptGraph {
            nodes,
            relationships,
            complexity: graph.complexity,
            bifurcated: graph.bifurcated,
        }
    }
}

fn matches_search(node: &ConceptNode, needle: &str) -> bool {
    node.label.to_lowercase().contains(needle)
        || node
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::super::graph::fixtures::{edge, four_node_graph, node};
    use super::super::graph::RelationKind;
    use super::*;

    #[test]
    fn empty_filter_returns_equal_graph() {
        let graph = four_node_graph();
        let filtered = GraphFilter::default().apply(&graph);
        assert_eq!(filtered, graph);
    }

    #[test]
    fn excluding_a_category_cascades_to_relationships() {
        let graph = four_node_graph();
        let mut filter = GraphFilter::default();
        assert!(filter.toggle_category(Category::Constraints));

        let filtered = filter.apply(&graph);
        let ids = filtered.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["A", "C", "D"]);
        assert_eq!(filtered.relationships.len(), 1);
        assert_eq!(filtered.relationships[0].target, "C");
        assert_eq!(graph.nodes.len(), 4);

        assert!(!filter.toggle_category(Category::Constraints));
        assert!(!filter.is_active());
    }

    #[test]
    fn search_matches_label_or_description_case_insensitively() {
        let mut graph = four_node_graph();
        graph.nodes[2].description = Some("Background about the READER".to_owned());

        let mut filter = GraphFilter::default();
        filter.set_search_query("  reader ");
        let filtered = filter.apply(&graph);
        assert_eq!(filtered.nodes.len(), 1);
        assert_eq!(filtered.nodes[0].id, "C");
        assert!(filtered.relationships.is_empty());

        filter.set_search_query("   ");
        assert_eq!(filter.apply(&graph).nodes.len(), 4);
    }

    fn arb_graph() -> impl Strategy<Value = ConceptGraph> {
        let categories = prop::sample::select(Category::ALL.to_vec());
        (
            prop::collection::vec((categories, 0u32..4, 0.0f32..=1.0), 1..16),
            prop::collection::vec((0usize..16, 0usize..16), 0..30),
        )
            .prop_map(|(entries, pairs)| {
                let nodes = entries
                    .iter()
                    .enumerate()
                    .map(|(index, (category, depth, weight))| {
                        let mut concept = node(&format!("n{index}"), *category, *depth, *weight);
                        concept.label = format!("Concept {index} about {}", category.label());
                        concept
                    })
                    .collect::<Vec<_>>();
                let count = nodes.len();
                let relationships = pairs
                    .into_iter()
                    .filter(|(source, target)| source % count != target % count)
                    .map(|(source, target)| {
                        edge(
                            &format!("n{}", source % count),
                            &format!("n{}", target % count),
                            RelationKind::Influences,
                            0.5,
                        )
                    })
                    .collect();
                ConceptGraph {
                    nodes,
                    relationships,
                    complexity: 3,
                    bifurcated: false,
                }
            })
    }

    fn arb_filter() -> impl Strategy<Value = GraphFilter> {
        (
            prop::collection::btree_set(prop::sample::select(Category::ALL.to_vec()), 0..4),
            prop::sample::select(vec!["", "concept 1", "TASK", "about c", "zzz"]),
        )
            .prop_map(|(excluded, search)| GraphFilter {
                excluded,
                search: search.to_owned(),
            })
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(graph in arb_graph(), filter in arb_filter()) {
            let once = filter.apply(&graph);
            let twice = filter.apply(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn filtered_relationships_reference_filtered_nodes(graph in arb_graph(), filter in arb_filter()) {
            let filtered = filter.apply(&graph);
            let ids = filtered.nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
            for relationship in &filtered.relationships {
                prop_assert!(ids.contains(relationship.source.as_str()));
                prop_assert!(ids.contains(relationship.target.as_str()));
            }
        }
    }
}
