//! Value objects for the unit-of-work entity graph

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Opaque identity key of a tracked entity instance (e.g. `Order#1`).
///
/// Unique within one [`WorkRegistry`](crate::WorkRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for EntityId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity type descriptor (the mapped class / table of an entity).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Life-cycle state, owned by the surrounding persistence context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Not yet in the store
    New,
    /// Tracked and present in the store
    Managed,
    /// Scheduled for removal
    Removed,
    /// No longer tracked by the context
    Detached,
}

impl LifecycleState {
    /// Operation the executor applies for a node in this state.
    pub fn operation(self) -> OperationKind {
        match self {
            LifecycleState::Removed => OperationKind::Delete,
            LifecycleState::New | LifecycleState::Managed | LifecycleState::Detached => {
                OperationKind::Write
            }
        }
    }
}

/// Relationship multiplicity.
///
/// Multiplicity does not decide commit order; see [`OwningSide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Endpoint of an edge that physically stores the foreign-key reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwningSide {
    /// The traversal parent holds the FK to the child; the child commits first.
    Parent,
    /// The child holds the FK back to the parent; the parent commits first.
    Child,
}

/// Kind of store operation carried by a flush instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Write,
    Delete,
}
