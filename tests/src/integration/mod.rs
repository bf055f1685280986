//! Integration tests across the registry, builder, drainer, and adapters.

pub mod flows;
