//! Engine core.
//!
//! Domain models, errors, constants and the per-engine configuration store.
//! Nothing in here performs I/O.

pub mod audit;
pub mod constants;
pub mod errors;
pub mod hooks;
pub mod models;
pub mod store;
