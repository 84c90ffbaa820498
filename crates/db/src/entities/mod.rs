//! Database entities.

pub mod candidate;
pub mod daily_rank;
pub mod daily_score;
pub mod poll;

pub use candidate::Entity as Candidate;
pub use daily_rank::Entity as DailyRank;
pub use daily_score::Entity as DailyScore;
pub use poll::Entity as Poll;
