// Core data structures for trip activities

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Kind of event an activity represents within a trip
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Loading,
    Unloading,
    /// Driver stops the vehicle for a break
    Breaking,
    /// Driver resumes after a break
    Resuming,
}

/// A closed time window, deserialized from ISO 8601 strings with any offset
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateTimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length of the window in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Postal address of a site, with optional geolocation
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Address {
    pub pk: Option<i64>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Address {
    /// Create an address that only carries coordinates
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    /// Latitude and longitude, only when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// When an activity happened or is expected to happen.
///
/// An activity either has a recorded real time range, or a simulated start and
/// duration computed by the trip simulation. The JSON shape is flat: the
/// presence of `real_datetime_range` selects the `Real` variant, and a record
/// carrying both shapes is rejected.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged, try_from = "TimingFields")]
pub enum ActivityTiming {
    Real {
        real_datetime_range: DateTimeRange,
    },
    Simulated {
        simulated_start: DateTime<Utc>,
        /// Minutes
        simulated_duration: i64,
    },
}

/// Flat timing keys of an activity record, before the shape is checked
#[derive(Deserialize)]
struct TimingFields {
    #[serde(default)]
    real_datetime_range: Option<DateTimeRange>,
    #[serde(default)]
    simulated_start: Option<DateTime<Utc>>,
    #[serde(default)]
    simulated_duration: Option<i64>,
}

impl TryFrom<TimingFields> for ActivityTiming {
    type Error = String;

    fn try_from(fields: TimingFields) -> Result<Self, Self::Error> {
        match (
            fields.real_datetime_range,
            fields.simulated_start,
            fields.simulated_duration,
        ) {
            (Some(real_datetime_range), None, None) => Ok(ActivityTiming::Real {
                real_datetime_range,
            }),
            (None, Some(simulated_start), Some(simulated_duration)) => {
                Ok(ActivityTiming::Simulated {
                    simulated_start,
                    simulated_duration,
                })
            }
            (Some(_), _, _) => {
                Err("activity has both a real time range and a simulated timing".to_string())
            }
            _ => Err(
                "activity needs either real_datetime_range or simulated_start and simulated_duration"
                    .to_string(),
            ),
        }
    }
}

impl ActivityTiming {
    pub fn is_real(&self) -> bool {
        matches!(self, ActivityTiming::Real { .. })
    }

    pub fn start(&self) -> DateTime<Utc> {
        match self {
            ActivityTiming::Real {
                real_datetime_range,
            } => real_datetime_range.start,
            ActivityTiming::Simulated {
                simulated_start, ..
            } => *simulated_start,
        }
    }

    /// End of the activity, `None` when the simulated duration overflows the
    /// representable dates
    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self {
            ActivityTiming::Real {
                real_datetime_range,
            } => Some(real_datetime_range.end),
            ActivityTiming::Simulated {
                simulated_start,
                simulated_duration,
            } => Duration::try_minutes(*simulated_duration)
                .and_then(|duration| simulated_start.checked_add_signed(duration)),
        }
    }

    /// Duration in minutes: real end minus real start, or the simulated duration verbatim
    pub fn duration_minutes(&self) -> i64 {
        match self {
            ActivityTiming::Real {
                real_datetime_range,
            } => real_datetime_range.duration_minutes(),
            ActivityTiming::Simulated {
                simulated_duration, ..
            } => *simulated_duration,
        }
    }
}

/// A single loading, unloading, break or resume event within a simulated trip
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub category: ActivityCategory,
    #[serde(default)]
    pub address: Option<Address>,
    /// Time window asked by the shipper
    #[serde(default)]
    pub scheduled_range: Option<DateTimeRange>,
    /// Booking slot on site
    #[serde(default)]
    pub slots_range: Option<DateTimeRange>,
    /// Kilometers to the next activity
    #[serde(default)]
    pub estimated_distance_to_next_activity: Option<f64>,
    /// Minutes of driving to the next activity, breaks excluded
    #[serde(default)]
    pub estimated_driving_time_to_next_activity: Option<i64>,
    /// Minutes of break the simulation placed before the next activity
    #[serde(default)]
    pub simulated_break_before_next_activity: i64,
    #[serde(default)]
    pub is_distance_to_next_activity_empty_km: bool,
    #[serde(flatten)]
    pub timing: ActivityTiming,
}

impl Activity {
    /// Create an activity with the given timing and no estimates
    pub fn new(category: ActivityCategory, timing: ActivityTiming) -> Self {
        Self {
            uid: None,
            category,
            address: None,
            scheduled_range: None,
            slots_range: None,
            estimated_distance_to_next_activity: None,
            estimated_driving_time_to_next_activity: None,
            simulated_break_before_next_activity: 0,
            is_distance_to_next_activity_empty_km: false,
            timing,
        }
    }

    /// Create an activity that already happened
    pub fn real(category: ActivityCategory, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(
            category,
            ActivityTiming::Real {
                real_datetime_range: DateTimeRange::new(start, end),
            },
        )
    }

    /// Create an activity placed by the trip simulation
    pub fn simulated(category: ActivityCategory, start: DateTime<Utc>, duration: i64) -> Self {
        Self::new(
            category,
            ActivityTiming::Simulated {
                simulated_start: start,
                simulated_duration: duration,
            },
        )
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Set the estimates for the leg towards the next activity
    pub fn with_next_leg(mut self, distance_km: f64, driving_time: i64, empty_km: bool) -> Self {
        self.estimated_distance_to_next_activity = Some(distance_km);
        self.estimated_driving_time_to_next_activity = Some(driving_time);
        self.is_distance_to_next_activity_empty_km = empty_km;
        self
    }

    pub fn with_break_before_next(mut self, minutes: i64) -> Self {
        self.simulated_break_before_next_activity = minutes;
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.address.as_ref()?.coordinates()
    }
}

/// Ordered sequence of activities for one vehicle and driver
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub activities: Vec<Activity>,
}

impl Trip {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            uid: None,
            activities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_real_timing_duration() {
        let activity = Activity::real(ActivityCategory::Loading, at(8, 0), at(8, 45));
        assert!(activity.timing.is_real());
        assert_eq!(activity.timing.duration_minutes(), 45);
        assert_eq!(activity.timing.end(), Some(at(8, 45)));
    }

    #[test]
    fn test_simulated_timing_end() {
        let activity = Activity::simulated(ActivityCategory::Unloading, at(10, 0), 90);
        assert!(!activity.timing.is_real());
        assert_eq!(activity.timing.duration_minutes(), 90);
        assert_eq!(activity.timing.end(), Some(at(11, 30)));
    }

    #[test]
    fn test_deserialize_real_activity() {
        let json = r#"{
            "category": "loading",
            "address": {"pk": 12, "latitude": 45.75, "longitude": 4.85},
            "estimated_distance_to_next_activity": 120.5,
            "estimated_driving_time_to_next_activity": 95,
            "real_datetime_range": {
                "start": "2024-05-02T10:00:00+02:00",
                "end": "2024-05-02T10:30:00+02:00"
            }
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.category, ActivityCategory::Loading);
        assert_eq!(activity.coordinates(), Some((45.75, 4.85)));
        assert_eq!(activity.estimated_driving_time_to_next_activity, Some(95));
        assert_eq!(activity.simulated_break_before_next_activity, 0);
        assert!(!activity.is_distance_to_next_activity_empty_km);
        assert_eq!(activity.timing.start(), at(8, 0));
        assert_eq!(activity.timing.duration_minutes(), 30);
    }

    #[test]
    fn test_deserialize_simulated_activity_with_null_real_range() {
        let json = r#"{
            "category": "breaking",
            "real_datetime_range": null,
            "simulated_start": "2024-05-02T12:00:00Z",
            "simulated_duration": 45
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(
            activity.timing,
            ActivityTiming::Simulated {
                simulated_start: at(12, 0),
                simulated_duration: 45,
            }
        );
    }

    #[test]
    fn test_deserialize_activity_without_timing_fails() {
        let json = r#"{"category": "loading"}"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());
    }

    #[test]
    fn test_deserialize_activity_with_both_timings_fails() {
        let json = r#"{
            "category": "unloading",
            "real_datetime_range": {
                "start": "2024-05-02T10:00:00Z",
                "end": "2024-05-02T10:30:00Z"
            },
            "simulated_start": "2024-05-02T11:00:00Z",
            "simulated_duration": 30
        }"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());
    }

    #[test]
    fn test_deserialize_simulated_activity_without_duration_fails() {
        let json = r#"{"category": "unloading", "simulated_start": "2024-05-02T11:00:00Z"}"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());
    }

    #[test]
    fn test_huge_simulated_duration_has_no_end() {
        let json = r#"{
            "category": "loading",
            "simulated_start": "2024-05-02T08:00:00Z",
            "simulated_duration": 9000000000000000
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.timing.start(), at(8, 0));
        assert_eq!(activity.timing.end(), None);

        let activity = Activity::simulated(ActivityCategory::Loading, at(8, 0), i64::MAX);
        assert_eq!(activity.timing.end(), None);
    }

    #[test]
    fn test_serialize_keeps_flat_shape() {
        let activity = Activity::simulated(ActivityCategory::Breaking, at(12, 0), 45);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["simulated_duration"], 45);
        assert!(value.get("real_datetime_range").is_none());

        let parsed: Activity = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, activity);
    }

    #[test]
    fn test_address_coordinates_require_both_values() {
        let address = Address {
            latitude: Some(48.85),
            ..Default::default()
        };
        assert_eq!(address.coordinates(), None);
        assert_eq!(Address::at(48.85, 2.35).coordinates(), Some((48.85, 2.35)));
    }
}
