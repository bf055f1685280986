//! Application layer for flush ordering
//!
//! Contains the service implementing FlushOrderingApi, the drainer that
//! hands a flush order to the store, and the unit-of-work facade.

mod drainer;
mod service;
mod unit_of_work;

pub use drainer::{FlushDrainer, FlushReport};
pub use service::FlushOrderingService;
pub use unit_of_work::UnitOfWork;
