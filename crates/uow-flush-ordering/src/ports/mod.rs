//! Ports module for flush ordering
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::FlushOrderingApi;
pub use outbound::{FlushExecutor, LifecycleHooks, NoopHooks, RelationMetadata};
