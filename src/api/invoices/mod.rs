pub mod error_handling;
pub mod handlers;
pub mod models;
