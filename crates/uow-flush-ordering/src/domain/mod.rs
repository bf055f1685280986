//! Domain module for flush ordering
//!
//! Contains the entity graph model, the work registry, errors, and invariants.

pub mod entities;
pub mod errors;
pub mod graph;
pub mod invariants;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use graph::EntityGraph;
pub use registry::WorkRegistry;
pub use value_objects::*;
