//! Invoice lifecycle domain: the store contract, its Postgres and in-memory
//! implementations, the lifecycle service and the pure total calculator.

pub mod memory;
pub mod repository;
pub mod service;
pub mod store;
pub mod totals;

pub use service::{InvoiceError, InvoiceService};
pub use store::InvoiceStore;
