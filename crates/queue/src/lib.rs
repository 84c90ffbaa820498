//! Background jobs and cross-instance event distribution for tierboard.

pub mod pubsub;
pub mod scheduler;

pub use pubsub::{EVENTS_CHANNEL, PubSubBridge, RedisPubSub};
pub use scheduler::{JobExecutor, SchedulerConfig, SnapshotJob, run_scheduler};
