//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the metadata catalog and the store.

mod memory_executor;
mod static_catalog;

pub use memory_executor::InMemoryExecutor;
pub use static_catalog::{RelationMapping, StaticRelationCatalog};
