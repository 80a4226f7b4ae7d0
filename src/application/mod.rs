//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic; it performs no I/O itself.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
