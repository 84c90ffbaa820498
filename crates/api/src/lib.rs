//! HTTP API layer for tierboard.
//!
//! This crate provides ballot intake and leaderboard reads:
//!
//! - **Endpoints**: ballot submission, leaderboards, snapshot trigger
//! - **Extractors**: client identity hints for rate limiting
//! - **Rate limiting**: Redis-backed fixed-window counters
//! - **Streaming**: WebSocket fan-out of leaderboard events

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod streaming;

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{RateLimitQuota, RateLimiter};
pub use streaming::{Broadcaster, streaming_handler};
