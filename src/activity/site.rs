// Site scheduler variant of an activity, as seen from the site receiving trucks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{ActivityCategory, Address, DateTimeRange};

/// Lifecycle status of a transport
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    Created,
    Updated,
    Unassigned,
    Declined,
    Assigned,
    SentToTrucker,
    Acknowledged,
    Confirmed,
    OnLoadingSite,
    LoadingComplete,
    OnUnloadingSite,
    UnloadingComplete,
    Done,
    Verified,
    Invoiced,
    Paid,
    Cancelled,
    /// Any status this crate does not know about
    #[serde(other)]
    Other,
}

impl TransportStatus {
    /// Transport was completed, possibly followed by back-office steps
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            TransportStatus::Done
                | TransportStatus::Verified
                | TransportStatus::Invoiced
                | TransportStatus::Paid
        )
    }

    /// Transport still waits for a carrier or a trucker
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TransportStatus::Created | TransportStatus::Updated | TransportStatus::Unassigned
        )
    }

    /// Transport has a trucker and is being executed
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            TransportStatus::Assigned
                | TransportStatus::SentToTrucker
                | TransportStatus::Acknowledged
                | TransportStatus::Confirmed
                | TransportStatus::OnLoadingSite
                | TransportStatus::LoadingComplete
                | TransportStatus::OnUnloadingSite
                | TransportStatus::UnloadingComplete
        )
    }
}

/// Progress of the trucker on one site
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    NotStarted,
    OnSite,
    ActivityDone,
    Departed,
    #[serde(other)]
    Other,
}

/// Punctuality computed by ETA tracking
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PunctualityStatus {
    OnTime,
    Late,
    Untracked,
    #[serde(other)]
    Other,
}

/// The transport an activity belongs to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransportRef {
    pub uid: String,
    pub status: TransportStatus,
}

/// An activity displayed in the site scheduler
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SiteActivity {
    pub uid: String,
    #[serde(default)]
    pub status: ActivityStatus,
    pub category: ActivityCategory,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub real_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub real_end: Option<DateTime<Utc>>,
    /// Asked time windows, the first one is used for scheduling
    #[serde(default)]
    pub slots: Vec<DateTimeRange>,
    pub transport: TransportRef,
    #[serde(default)]
    pub punctuality_status: Option<PunctualityStatus>,
}

impl SiteActivity {
    /// Create a not started activity with no slot
    pub fn new(
        uid: impl Into<String>,
        category: ActivityCategory,
        transport_uid: impl Into<String>,
        transport_status: TransportStatus,
    ) -> Self {
        Self {
            uid: uid.into(),
            status: ActivityStatus::NotStarted,
            category,
            address: None,
            real_start: None,
            real_end: None,
            slots: Vec::new(),
            transport: TransportRef {
                uid: transport_uid.into(),
                status: transport_status,
            },
            punctuality_status: None,
        }
    }

    pub fn with_slot(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.slots.push(DateTimeRange::new(start, end));
        self
    }

    pub fn with_real_start(mut self, real_start: DateTime<Utc>) -> Self {
        self.real_start = Some(real_start);
        self
    }

    pub fn with_status(mut self, status: ActivityStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_punctuality(mut self, punctuality_status: PunctualityStatus) -> Self {
        self.punctuality_status = Some(punctuality_status);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// First asked time window, if any
    pub fn first_slot(&self) -> Option<&DateTimeRange> {
        self.slots.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status_groups_are_disjoint() {
        let all = [
            TransportStatus::Created,
            TransportStatus::Updated,
            TransportStatus::Unassigned,
            TransportStatus::Declined,
            TransportStatus::Assigned,
            TransportStatus::SentToTrucker,
            TransportStatus::Acknowledged,
            TransportStatus::Confirmed,
            TransportStatus::OnLoadingSite,
            TransportStatus::LoadingComplete,
            TransportStatus::OnUnloadingSite,
            TransportStatus::UnloadingComplete,
            TransportStatus::Done,
            TransportStatus::Verified,
            TransportStatus::Invoiced,
            TransportStatus::Paid,
            TransportStatus::Cancelled,
            TransportStatus::Other,
        ];
        for status in all {
            let groups = [status.is_done(), status.is_pending(), status.is_in_progress()];
            assert!(
                groups.iter().filter(|g| **g).count() <= 1,
                "{status:?} belongs to several groups"
            );
        }
    }

    #[test]
    fn test_unknown_statuses_deserialize_as_other() {
        let status: TransportStatus = serde_json::from_str("\"rejected_by_site\"").unwrap();
        assert_eq!(status, TransportStatus::Other);
        let status: ActivityStatus = serde_json::from_str("\"teleported\"").unwrap();
        assert_eq!(status, ActivityStatus::Other);
    }

    #[test]
    fn test_deserialize_site_activity() {
        let json = r#"{
            "uid": "act-1",
            "status": "on_site",
            "category": "unloading",
            "real_start": "2024-05-02T08:12:00Z",
            "slots": [{"start": "2024-05-02T08:00:00Z", "end": "2024-05-02T09:00:00Z"}],
            "transport": {"uid": "tr-1", "status": "on_unloading_site"},
            "punctuality_status": "late"
        }"#;
        let activity: SiteActivity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.status, ActivityStatus::OnSite);
        assert_eq!(activity.transport.status, TransportStatus::OnUnloadingSite);
        assert_eq!(activity.punctuality_status, Some(PunctualityStatus::Late));
        assert_eq!(activity.slots.len(), 1);
        assert!(activity.address.is_none());
    }
}
