// Trip indicators: distance, empty kilometers, driving time and duration of a day
//
// Every indicator is `None` as soon as one contributing activity lacks the
// estimate it needs, partial totals are never returned.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, Trip};

/// Continuous driving allowed before a break is mandatory, in minutes
pub const MAX_CONTINUOUS_DRIVING_MINUTES: i64 = 270;
/// Length of the mandatory break, in minutes
pub const MANDATORY_BREAK_MINUTES: i64 = 45;

const DRIVING_CYCLE_MINUTES: i64 = MAX_CONTINUOUS_DRIVING_MINUTES + MANDATORY_BREAK_MINUTES;

pub fn activity_duration(activity: &Activity) -> i64 {
    activity.timing.duration_minutes()
}

pub fn activity_start(activity: &Activity) -> DateTime<Utc> {
    activity.timing.start()
}

pub fn activity_end(activity: &Activity) -> Option<DateTime<Utc>> {
    activity.timing.end()
}

/// Sum of optional minutes, `None` when one is missing or the total overflows
fn checked_total(minutes: impl IntoIterator<Item = Option<i64>>) -> Option<i64> {
    minutes
        .into_iter()
        .try_fold(0i64, |total, minutes| total.checked_add(minutes?))
}

/// Activities followed by a leg, i.e. all but the last one
fn legs(activities: &[Activity]) -> &[Activity] {
    activities
        .split_last()
        .map(|(_, rest)| rest)
        .unwrap_or(&[])
}

/// Kilometers driven between the activities
pub fn total_distance(activities: &[Activity]) -> Option<f64> {
    legs(activities)
        .iter()
        .map(|activity| activity.estimated_distance_to_next_activity)
        .sum()
}

/// Kilometers driven without cargo
pub fn empty_distance(activities: &[Activity]) -> Option<f64> {
    legs(activities)
        .iter()
        .filter(|activity| activity.is_distance_to_next_activity_empty_km)
        .map(|activity| activity.estimated_distance_to_next_activity)
        .sum()
}

/// Driving time contained in `elapsed` minutes of driving and breaks: a 45 minute
/// break is taken after every 4h30 of driving.
pub fn real_driving_time(elapsed: i64) -> i64 {
    let elapsed = elapsed.max(0);
    (elapsed / DRIVING_CYCLE_MINUTES) * MAX_CONTINUOUS_DRIVING_MINUTES
        + (elapsed % DRIVING_CYCLE_MINUTES).min(MAX_CONTINUOUS_DRIVING_MINUTES)
}

/// Break time contained in `elapsed` minutes of driving and breaks
pub fn real_break_time(elapsed: i64) -> i64 {
    elapsed.max(0) - real_driving_time(elapsed)
}

/// Number of leading activities with a recorded real time range
fn real_segment_len(activities: &[Activity]) -> usize {
    activities
        .iter()
        .take_while(|activity| activity.timing.is_real())
        .count()
}

/// Minutes spent between the real activities: first to last real start, minus
/// the time spent on every activity before the last one
fn real_elapsed_between(real_activities: &[Activity]) -> i64 {
    let (Some(first), Some(last)) = (real_activities.first(), real_activities.last()) else {
        return 0;
    };
    let on_site: i64 = legs(real_activities).iter().map(activity_duration).sum();
    ((activity_start(last) - activity_start(first)).num_minutes() - on_site).max(0)
}

/// Activities whose leg is estimated: from the last real activity, or from the
/// start when nothing happened yet
fn simulated_segment(activities: &[Activity]) -> &[Activity] {
    &activities[real_segment_len(activities).saturating_sub(1)..]
}

/// Driving time of the trip in minutes.
///
/// The real part is deduced from the recorded times with the rest rule applied,
/// the simulated part sums the estimated driving times, which exclude breaks.
pub fn driving_time(activities: &[Activity]) -> Option<i64> {
    let real_len = real_segment_len(activities);
    let real = real_driving_time(real_elapsed_between(&activities[..real_len]));
    let simulated = checked_total(
        legs(simulated_segment(activities))
            .iter()
            .map(|activity| activity.estimated_driving_time_to_next_activity),
    );
    debug!(
        "Driving time: {} real activities, {} min real, {:?} min simulated",
        real_len, real, simulated
    );
    real.checked_add(simulated?)
}

/// Break time of the trip in minutes: breaks implied by the rest rule on the real
/// part plus the breaks placed by the simulation, `None` when the total overflows
pub fn break_time(activities: &[Activity]) -> Option<i64> {
    let real_len = real_segment_len(activities);
    let real = real_break_time(real_elapsed_between(&activities[..real_len]));
    let simulated = checked_total(
        legs(simulated_segment(activities))
            .iter()
            .map(|activity| Some(activity.simulated_break_before_next_activity)),
    );
    real.checked_add(simulated?)
}

/// Minutes from the start of the first activity to the end of the last one
pub fn day_duration(activities: &[Activity]) -> Option<i64> {
    let first = activities.first()?;
    let last = activities.last()?;
    Some((activity_end(last)? - activity_start(first)).num_minutes())
}

/// Format minutes as `4h05`, or `?` when unknown
pub fn format_minutes(minutes: Option<i64>) -> String {
    match minutes {
        Some(minutes) => {
            let sign = if minutes < 0 { "-" } else { "" };
            let minutes = minutes.abs();
            format!("{}{}h{:02}", sign, minutes / 60, minutes % 60)
        }
        None => "?".to_string(),
    }
}

/// Format kilometers rounded to the unit, or `?` when unknown
pub fn format_km(km: Option<f64>) -> String {
    match km {
        Some(km) => format!("{:.0} km", km),
        None => "?".to_string(),
    }
}

/// Indicators shown above the day simulation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DayIndicators {
    pub activity_count: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub empty_distance_km: Option<f64>,
    pub driving_time_minutes: Option<i64>,
    pub break_time_minutes: Option<i64>,
    pub duration_minutes: Option<i64>,
}

impl DayIndicators {
    pub fn from_activities(activities: &[Activity]) -> Self {
        Self {
            activity_count: activities.len(),
            start: activities.first().map(activity_start),
            end: activities.last().and_then(activity_end),
            distance_km: total_distance(activities),
            empty_distance_km: empty_distance(activities),
            driving_time_minutes: driving_time(activities),
            break_time_minutes: break_time(activities),
            duration_minutes: day_duration(activities),
        }
    }

    /// Indicators of a full day: the trips are chained in order
    pub fn from_trips(trips: &[Trip]) -> Self {
        let activities: Vec<Activity> = trips
            .iter()
            .flat_map(|trip| trip.activities.iter().cloned())
            .collect();
        Self::from_activities(&activities)
    }

    /// Share of the distance driven without cargo, between 0 and 1
    pub fn empty_km_ratio(&self) -> Option<f64> {
        let distance = self.distance_km?;
        let empty = self.empty_distance_km?;
        if distance > 0. {
            Some(empty / distance)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DayIndicators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} activities, distance {} (empty {}), driving {}, breaks {}, duration {}",
            self.activity_count,
            format_km(self.distance_km),
            format_km(self.empty_distance_km),
            format_minutes(self.driving_time_minutes),
            format_minutes(self.break_time_minutes),
            format_minutes(self.duration_minutes),
        )
    }
}
