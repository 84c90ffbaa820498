//! Business logic services.

pub mod ballot;
pub mod challenge;
pub mod events;
pub mod leaderboard;
pub mod ranking;
pub mod snapshot;

pub use ballot::{BallotReceipt, BallotService, BallotSubmission, Tier, TierBallot, validate_ballot};
pub use challenge::{ChallengeVerifier, StaticVerifier, TurnstileVerifier};
pub use events::{EventDelta, EventPublisher, LeaderboardEvent, NoopPublisher};
pub use leaderboard::{Leaderboard, LeaderboardRow, LeaderboardService};
pub use ranking::{Standing, Tally, rank};
pub use snapshot::{SnapshotService, SnapshotSummary};
