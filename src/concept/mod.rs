mod filter;
mod graph;
mod load;
mod parse;

pub use filter::GraphFilter;
pub use graph::{
    Category, ConceptGraph, ConceptNode, ConceptRelationship, RelationKind, index_nodes,
};
pub use load::load_concept_graph;

#[cfg(test)]
pub(crate) use graph::fixtures;
