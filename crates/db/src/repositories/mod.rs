//! Repository layer for database access.

pub mod candidate;
pub mod daily_rank;
pub mod daily_score;
pub mod poll;

pub use candidate::CandidateRepository;
pub use daily_rank::{DailyRankRepository, RankEntry};
pub use daily_score::{DailyScoreRepository, ScoreDelta};
pub use poll::PollRepository;
