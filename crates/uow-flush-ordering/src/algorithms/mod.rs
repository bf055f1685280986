//! Algorithms module for flush ordering
//!
//! Contains:
//! - Flush stack builder (depth-first, cycle-safe)
//! - Dependency settling (Kahn's algorithm over the walked order)

pub mod flush_stack;
mod settle;

pub use flush_stack::build_flush_order;
