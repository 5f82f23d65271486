// Site status classification
// A site status is never stored, it is derived from the transport status, the
// activity status and the punctuality of the trucker.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityStatus, PunctualityStatus, SiteActivity, TransportStatus};

/// Status displayed for an activity in the site scheduler
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Cancelled,
    Done,
    ActivityDone,
    Departed,
    Late,
    OnSite,
    Pending,
    Planned,
    Unknown,
}

impl SiteStatus {
    pub const ALL: [SiteStatus; 9] = [
        SiteStatus::Cancelled,
        SiteStatus::Done,
        SiteStatus::ActivityDone,
        SiteStatus::Departed,
        SiteStatus::Late,
        SiteStatus::OnSite,
        SiteStatus::Pending,
        SiteStatus::Planned,
        SiteStatus::Unknown,
    ];

    /// Label shown to the user. A done transport means the activity is done from
    /// the site point of view, so both share the same label.
    pub fn label(&self) -> &'static str {
        match self {
            SiteStatus::Cancelled => "cancelled",
            SiteStatus::Done | SiteStatus::ActivityDone => "activity_done",
            SiteStatus::Departed => "departed",
            SiteStatus::Late => "late",
            SiteStatus::OnSite => "on_site",
            SiteStatus::Pending => "pending",
            SiteStatus::Planned => "planned",
            SiteStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything the classification depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteStatusContext {
    pub transport_status: TransportStatus,
    pub activity_status: ActivityStatus,
    pub punctuality_status: Option<PunctualityStatus>,
    pub eta_tracking_enabled: bool,
}

impl SiteStatusContext {
    pub fn from_activity(activity: &SiteActivity, eta_tracking_enabled: bool) -> Self {
        Self {
            transport_status: activity.transport.status,
            activity_status: activity.status,
            punctuality_status: activity.punctuality_status,
            eta_tracking_enabled,
        }
    }
}

/// One entry of the precedence table
pub struct SiteStatusRule {
    pub name: &'static str,
    pub applies: fn(&SiteStatusContext) -> bool,
    pub status: SiteStatus,
}

fn transport_cancelled(ctx: &SiteStatusContext) -> bool {
    ctx.transport_status == TransportStatus::Cancelled
}

fn transport_done(ctx: &SiteStatusContext) -> bool {
    ctx.transport_status.is_done()
}

fn activity_done(ctx: &SiteStatusContext) -> bool {
    ctx.activity_status == ActivityStatus::ActivityDone
}

fn activity_departed(ctx: &SiteStatusContext) -> bool {
    ctx.activity_status == ActivityStatus::Departed
}

fn trucker_late(ctx: &SiteStatusContext) -> bool {
    ctx.eta_tracking_enabled && ctx.punctuality_status == Some(PunctualityStatus::Late)
}

fn trucker_on_site(ctx: &SiteStatusContext) -> bool {
    ctx.activity_status == ActivityStatus::OnSite
}

fn transport_pending(ctx: &SiteStatusContext) -> bool {
    ctx.transport_status.is_pending()
}

fn transport_planned(ctx: &SiteStatusContext) -> bool {
    ctx.transport_status.is_in_progress() && ctx.activity_status == ActivityStatus::NotStarted
}

/// Classification rules, evaluated in order, first match wins
pub static SITE_STATUS_RULES: [SiteStatusRule; 8] = [
    SiteStatusRule {
        name: "transport_cancelled",
        applies: transport_cancelled,
        status: SiteStatus::Cancelled,
    },
    SiteStatusRule {
        name: "transport_done",
        applies: transport_done,
        status: SiteStatus::Done,
    },
    SiteStatusRule {
        name: "activity_done",
        applies: activity_done,
        status: SiteStatus::ActivityDone,
    },
    SiteStatusRule {
        name: "activity_departed",
        applies: activity_departed,
        status: SiteStatus::Departed,
    },
    SiteStatusRule {
        name: "trucker_late",
        applies: trucker_late,
        status: SiteStatus::Late,
    },
    SiteStatusRule {
        name: "trucker_on_site",
        applies: trucker_on_site,
        status: SiteStatus::OnSite,
    },
    SiteStatusRule {
        name: "transport_pending",
        applies: transport_pending,
        status: SiteStatus::Pending,
    },
    SiteStatusRule {
        name: "transport_planned",
        applies: transport_planned,
        status: SiteStatus::Planned,
    },
];

/// Derive the site status, falling back to [`SiteStatus::Unknown`]
pub fn classify(ctx: &SiteStatusContext) -> SiteStatus {
    match SITE_STATUS_RULES.iter().find(|rule| (rule.applies)(ctx)) {
        Some(rule) => rule.status,
        None => {
            // should not happen with known statuses
            warn!("No site status rule matches {:?}", ctx);
            SiteStatus::Unknown
        }
    }
}

/// Derive the site status of a scheduler activity
pub fn site_status(activity: &SiteActivity, eta_tracking_enabled: bool) -> SiteStatus {
    classify(&SiteStatusContext::from_activity(
        activity,
        eta_tracking_enabled,
    ))
}
