//! The factory (C2): the pure compiler from canvas data to a typed,
//! dependency-resolved graph. Runs once per canvas load, never again at run
//! time. Organized as the lettered steps it performs in order:
//!
//! - Step A (`classify::expand_labels`): multi-label edge expansion
//! - Step B (`classify::classify_node`): node role/subtype classification
//! - Step C (`classify::classify_edge`): edge subtype classification
//! - Step D (`groups::compute_containment`): geometric group membership
//! - Step E (`crossing::compute_edge_crossing`): crossing-group computation
//! - Step F (`foreach::expand_for_each`): for-each duplication
//! - Step G (`deps`): dependency-set computation
//!
//! `factory::compile` drives all seven; `factory::hydrate` turns the result
//! into a run-owned `object::CannoliGraph`.

mod classify;
mod compile_error;
mod config;
mod crossing;
mod deps;
mod draft;
#[allow(clippy::module_inception)]
mod factory;
mod foreach;
mod groups;
mod label_grammar;
mod validate;

pub use classify::{classify_edge, classify_node, refine_call_kind, EdgeClassification, EndpointRole, NodeClassification};
pub use compile_error::CompilationError;
pub use config::{ColorMap, ColorRole, FactoryConfig};
pub use crossing::{compute_edge_crossing, EdgeCrossing};
pub use deps::{edge_dependencies, incoming_dependencies, EdgeDependencyInput};
pub use draft::{Draft, DraftEdge, DraftGroup, DraftNode};
pub use factory::{compile, hydrate, VerifiedEdge, VerifiedGraph, VerifiedGroup, VerifiedNode};
pub use foreach::expand_for_each;
pub use groups::{compute_containment, detect_overlaps, Containment};
pub use label_grammar::{parse_label, ParsedLabel};
pub use validate::{Diagnostic, DiagnosticKind};
