//! Core business logic for tierboard.

pub mod services;

pub use services::*;
