// Library interface for tripday
// This allows integration tests to access internal modules

pub mod activity;
pub mod config;
pub mod errors;
pub mod indicators;
pub mod loader;
pub mod positions;
pub mod scheduler;
pub mod writer;

// Re-export commonly used types
pub use activity::{Activity, ActivityCategory, ActivityTiming, SiteActivity, Trip};
pub use config::SchedulerConfig;
pub use errors::TripdayError;
pub use indicators::DayIndicators;
pub use positions::{Position, deduplicate_positions};
pub use scheduler::{Bucket, SiteSchedule, SiteStatus};
