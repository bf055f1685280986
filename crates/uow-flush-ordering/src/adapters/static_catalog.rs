//! Static Relation Catalog Adapter
//!
//! Implements `RelationMetadata` from a fixed table of relationship mappings,
//! typically loaded from configuration at start-up.

use crate::domain::value_objects::{EntityType, OwningSide, RelationKind};
use crate::ports::outbound::RelationMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One relationship mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMapping {
    pub kind: RelationKind,
    pub parent: EntityType,
    pub child: EntityType,
    pub owning_side: OwningSide,
}

/// Catalog keyed by (kind, parent type, child type).
#[derive(Clone, Debug, Default)]
pub struct StaticRelationCatalog {
    mappings: HashMap<(RelationKind, EntityType, EntityType), OwningSide>,
}

impl StaticRelationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(
        mut self,
        kind: RelationKind,
        parent: EntityType,
        child: EntityType,
        owning_side: OwningSide,
    ) -> Self {
        self.mappings.insert((kind, parent, child), owning_side);
        self
    }

    pub fn from_mappings(mappings: impl IntoIterator<Item = RelationMapping>) -> Self {
        Self {
            mappings: mappings
                .into_iter()
                .map(|m| ((m.kind, m.parent, m.child), m.owning_side))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl RelationMetadata for StaticRelationCatalog {
    fn owning_side_for(
        &self,
        relation_kind: RelationKind,
        types: (&EntityType, &EntityType),
    ) -> Option<OwningSide> {
        self.mappings
            .get(&(relation_kind, types.0.clone(), types.1.clone()))
            .copied()
    }
}
