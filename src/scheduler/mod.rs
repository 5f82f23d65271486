// Site scheduler day view
// Localizes site activities, classifies their status and distributes them over an
// untimed row and 24 hour rows split into slots.

pub mod status;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use itertools::Itertools;
use log::{debug, warn};
use serde::Serialize;

use crate::activity::{ActivityCategory, Address, DateTimeRange, SiteActivity};
use crate::config::{DEFAULT_SLOTS_PER_ROW, SchedulerConfig};

pub use status::{SITE_STATUS_RULES, SiteStatus, SiteStatusContext, classify, site_status};

const HOURS_PER_DAY: u32 = 24;

/// When an activity shows up in the day view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityTime {
    /// Local wall clock start on the selected day
    Timed(NaiveDateTime),
    Untimed,
}

/// A row of the day view: the untimed row, or the slot starting at a local time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Untimed,
    At(NaiveTime),
}

/// Whether a time window spans the whole selected day, 00:00 to 23:59 local time
pub fn is_full_day_range(range: &DateTimeRange, day: NaiveDate, timezone: Tz) -> bool {
    let start = range.start.with_timezone(&timezone).naive_local();
    let end = range.end.with_timezone(&timezone).naive_local();
    start.date() == day
        && end.date() == day
        && start.hour() == 0
        && start.minute() == 0
        && end.hour() == 23
        && end.minute() == 59
}

/// Local start of an activity on the selected day.
///
/// The real start wins over the asked slot. Activities without any time, with
/// a slot spanning the whole day or starting on another day are untimed.
pub fn activity_time(activity: &SiteActivity, day: NaiveDate, timezone: Tz) -> ActivityTime {
    let start = match (activity.real_start, activity.first_slot()) {
        (Some(real_start), _) => real_start,
        (None, Some(slot)) if is_full_day_range(slot, day, timezone) => {
            return ActivityTime::Untimed;
        }
        (None, Some(slot)) => slot.start,
        (None, None) => return ActivityTime::Untimed,
    };

    let local_start = start.with_timezone(&timezone).naive_local();
    if local_start.date() == day {
        ActivityTime::Timed(local_start)
    } else {
        ActivityTime::Untimed
    }
}

fn slot_seconds(slot_duration_minutes: u32) -> u32 {
    slot_duration_minutes.max(1) * 60
}

/// Index of the slot containing a local time, counted from midnight
fn slot_index(time: NaiveTime, slot_duration_minutes: u32) -> usize {
    (time.num_seconds_from_midnight() / slot_seconds(slot_duration_minutes)) as usize
}

fn slot_start(index: usize, slot_duration_minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(
        index as u32 * slot_seconds(slot_duration_minutes),
        0,
    )
    .unwrap_or_default()
}

/// Whether an activity belongs to a bucket. Bounds are `[start, start + slot)`.
pub fn is_in_bucket(
    activity: &SiteActivity,
    bucket: Bucket,
    day: NaiveDate,
    timezone: Tz,
    slot_duration_minutes: u32,
) -> bool {
    match (bucket, activity_time(activity, day, timezone)) {
        (Bucket::Untimed, ActivityTime::Untimed) => true,
        (Bucket::At(bucket_start), ActivityTime::Timed(start)) => {
            let seconds = start.time().num_seconds_from_midnight();
            let lower = bucket_start.num_seconds_from_midnight();
            seconds >= lower && seconds < lower + slot_seconds(slot_duration_minutes)
        }
        _ => false,
    }
}

/// Activities of the day belonging to one bucket, in input order
pub fn activities_in_bucket(
    activities: &[SiteActivity],
    bucket: Bucket,
    day: NaiveDate,
    timezone: Tz,
    slot_duration_minutes: u32,
) -> Vec<&SiteActivity> {
    activities
        .iter()
        .filter(|activity| is_in_bucket(activity, bucket, day, timezone, slot_duration_minutes))
        .collect()
}

/// One card of the day view. Activities of the same transport on the same site
/// and in the same slot share a card.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ScheduledCard {
    pub uids: Vec<String>,
    pub transport_uid: String,
    pub category: ActivityCategory,
    pub site_status: SiteStatus,
    pub label: &'static str,
    pub start: Option<NaiveDateTime>,
    #[serde(skip)]
    address: Option<Address>,
}

impl ScheduledCard {
    fn new(activity: &SiteActivity, site_status: SiteStatus, start: Option<NaiveDateTime>) -> Self {
        Self {
            uids: vec![activity.uid.clone()],
            transport_uid: activity.transport.uid.clone(),
            category: activity.category,
            site_status,
            label: site_status.label(),
            start,
            address: activity.address.clone(),
        }
    }

    fn accepts(&self, activity: &SiteActivity) -> bool {
        self.transport_uid == activity.transport.uid
            && same_location(self.address.as_ref(), activity.address.as_ref())
    }

    fn merge(&mut self, activity: &SiteActivity, site_status: SiteStatus, start: Option<NaiveDateTime>) {
        self.uids.push(activity.uid.clone());
        // the most urgent status is shown
        if site_status < self.site_status {
            self.site_status = site_status;
            self.label = site_status.label();
        }
        self.start = match (self.start, start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

/// Addresses match on primary key, or on exact coordinates when a key is missing
fn same_location(a: Option<&Address>, b: Option<&Address>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    match (a.pk, b.pk) {
        (Some(pk_a), Some(pk_b)) => pk_a == pk_b,
        _ => match (a.coordinates(), b.coordinates()) {
            (Some(coords_a), Some(coords_b)) => coords_a == coords_b,
            _ => false,
        },
    }
}

fn add_to_cards(
    cards: &mut Vec<ScheduledCard>,
    activity: &SiteActivity,
    site_status: SiteStatus,
    start: Option<NaiveDateTime>,
) {
    match cards.iter_mut().find(|card| card.accepts(activity)) {
        Some(card) => card.merge(activity, site_status, start),
        None => cards.push(ScheduledCard::new(activity, site_status, start)),
    }
}

fn sort_cards(cards: Vec<ScheduledCard>) -> Vec<ScheduledCard> {
    cards
        .into_iter()
        .sorted_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(a.site_status.cmp(&b.site_status))
                .then_with(|| a.uids.cmp(&b.uids))
        })
        .collect()
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SlotBucket {
    pub start: NaiveTime,
    pub cards: Vec<ScheduledCard>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HourRow {
    pub hour: u32,
    pub slots: Vec<SlotBucket>,
}

/// The site scheduler day view
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SiteSchedule {
    pub day: NaiveDate,
    pub timezone: Tz,
    pub slot_duration_minutes: u32,
    pub untimed: Vec<ScheduledCard>,
    pub rows: Vec<HourRow>,
    pub status_counts: BTreeMap<SiteStatus, usize>,
}

impl SiteSchedule {
    /// Distribute the activities of `day` over the untimed row and the slots
    pub fn build(activities: &[SiteActivity], day: NaiveDate, config: &SchedulerConfig) -> Self {
        let (slot_duration_minutes, slots_per_row) = match config.validate() {
            Ok(()) => (config.slot_duration_minutes(), config.slots_per_row as usize),
            Err(e) => {
                warn!("{}, using {} slots per row", e, DEFAULT_SLOTS_PER_ROW);
                (60 / DEFAULT_SLOTS_PER_ROW, DEFAULT_SLOTS_PER_ROW as usize)
            }
        };
        let mut untimed = Vec::new();
        let mut slots: Vec<Vec<ScheduledCard>> =
            vec![Vec::new(); HOURS_PER_DAY as usize * slots_per_row];
        let mut statuses = Vec::with_capacity(activities.len());

        for activity in activities {
            let site_status = site_status(activity, config.eta_tracking_enabled);
            statuses.push(site_status);
            match activity_time(activity, day, config.timezone) {
                ActivityTime::Untimed => add_to_cards(&mut untimed, activity, site_status, None),
                ActivityTime::Timed(start) => {
                    let index = slot_index(start.time(), slot_duration_minutes);
                    add_to_cards(&mut slots[index], activity, site_status, Some(start));
                }
            }
        }

        let mut slots = slots.into_iter().map(sort_cards).enumerate();
        let rows = (0..HOURS_PER_DAY)
            .map(|hour| HourRow {
                hour,
                slots: slots
                    .by_ref()
                    .take(slots_per_row)
                    .map(|(index, cards)| SlotBucket {
                        start: slot_start(index, slot_duration_minutes),
                        cards,
                    })
                    .collect(),
            })
            .collect();

        let schedule = Self {
            day,
            timezone: config.timezone,
            slot_duration_minutes,
            untimed: sort_cards(untimed),
            rows,
            status_counts: statuses.into_iter().counts().into_iter().collect(),
        };
        debug!(
            "Scheduled {} activities on {}: {} untimed",
            schedule.activity_count(),
            day,
            schedule.untimed.iter().map(|c| c.uids.len()).sum::<usize>()
        );
        schedule
    }

    /// Every bucket with its cards, the untimed row first
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[ScheduledCard])> {
        std::iter::once((Bucket::Untimed, self.untimed.as_slice())).chain(
            self.rows
                .iter()
                .flat_map(|row| row.slots.iter())
                .map(|slot| (Bucket::At(slot.start), slot.cards.as_slice())),
        )
    }

    /// Number of activities over all buckets
    pub fn activity_count(&self) -> usize {
        self.buckets()
            .flat_map(|(_, cards)| cards.iter())
            .map(|card| card.uids.len())
            .sum()
    }

    /// Cards of the slot containing a local time
    pub fn cards_at(&self, time: NaiveTime) -> &[ScheduledCard] {
        let index = slot_index(time, self.slot_duration_minutes);
        self.rows
            .iter()
            .flat_map(|row| row.slots.iter())
            .nth(index)
            .map(|slot| slot.cards.as_slice())
            .unwrap_or(&[])
    }
}
