// Activity data model
// Provides the trip activities consumed by the indicators and positions modules
// and the site activities consumed by the scheduler

pub mod site;
pub mod types;

// Re-export commonly used types
pub use site::{ActivityStatus, PunctualityStatus, SiteActivity, TransportRef, TransportStatus};
pub use types::{Activity, ActivityCategory, ActivityTiming, Address, DateTimeRange, Trip};
