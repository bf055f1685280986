//! # Unit-of-Work Flush Ordering
//!
//! Depth-first flush stack over the entity graph of one unit of work.
//! Produces the order in which tracked entities are written to (or removed
//! from) the backing store so that a referenced row always exists before
//! the row that carries the foreign key to it.
//!
//! ## Architecture
//!
//! - **Domain**: Entity graph (Node, Edge), Work Registry, FlushOrder
//! - **Algorithms**: Flush stack builder (cycle-safe depth-first traversal)
//! - **Ports**: Inbound (FlushOrderingApi) and Outbound (RelationMetadata, FlushExecutor, LifecycleHooks)
//! - **Adapters**: Static relation catalog, in-memory executor
//! - **Application**: Ordering service, drainer, unit-of-work facade
//!
//! ## Example
//!
//! ```rust
//! use uow_flush_ordering::{
//!     build_flush_order, EntityType, LifecycleState, OwningSide, RelationKind, WorkRegistry,
//! };
//!
//! let mut registry = WorkRegistry::new();
//! registry.add_node("Customer#7", EntityType::new("Customer"), LifecycleState::Managed).unwrap();
//! registry.add_node("Order#1", EntityType::new("Order"), LifecycleState::New).unwrap();
//!
//! // Order holds the FK to Customer.
//! registry
//!     .link("Order#1", "Customer#7", RelationKind::ManyToOne, Some(OwningSide::Parent))
//!     .unwrap();
//! registry.register_head("Order#1").unwrap();
//!
//! let order = build_flush_order(&mut registry).unwrap();
//! let ids: Vec<&str> = order.iter().map(|i| i.entity_id.as_str()).collect();
//! assert_eq!(ids, vec!["Customer#7", "Order#1"]);
//! ```

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use algorithms::build_flush_order;
pub use application::{FlushDrainer, FlushOrderingService, FlushReport, UnitOfWork};
pub use config::FlushConfig;
pub use domain::entities::*;
pub use domain::errors::{ExecutorError, FlushError, HookError};
pub use domain::registry::WorkRegistry;
pub use domain::value_objects::*;
pub use ports::inbound::FlushOrderingApi;
pub use ports::outbound::{FlushExecutor, LifecycleHooks, NoopHooks, RelationMetadata};
pub use telemetry::{init_tracing, TelemetryError, TracingConfig};
