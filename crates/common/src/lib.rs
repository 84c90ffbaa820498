//! Common utilities and shared types for tierboard.
//!
//! This crate provides foundational components used across all tierboard crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Voter identity**: Stable rate-limit key derivation via [`VoterIdentity`]
//! - **Poll-local time**: IANA-timezone day boundary computation
//!
//! # Example
//!
//! ```no_run
//! use tierboard_common::{Config, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod time;

pub use config::{Config, RateLimitSettings, VotingConfig};
pub use error::{AppError, AppResult};
pub use identity::{VoterIdentity, sha256_hex};
pub use time::{local_day, local_day_for_date, parse_timezone, previous_local_day};
