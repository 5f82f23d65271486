// Integration tests for the day simulation indicators and map positions
// with a sample day of two trips: a real morning and a simulated afternoon

use std::path::Path;

use tripday::indicators::{DayIndicators, driving_time};
use tripday::loader::load_trips_json;
use tripday::positions::{deduplicate_positions, deduplicate_trip_positions};

const SAMPLE: &str = "samples/day_trips.json";

#[test]
fn test_sample_day_indicators() {
    let trips = load_trips_json(Path::new(SAMPLE)).unwrap();
    assert_eq!(trips.len(), 2);

    let indicators = DayIndicators::from_trips(&trips);
    assert_eq!(indicators.activity_count, 5);
    assert_eq!(indicators.distance_km, Some(575.));
    assert_eq!(indicators.empty_distance_km, Some(220.));
    // 5h15 between the two real starts minus 30 min on site: 4h30 driving and a break,
    // then 35 + 40 + 150 estimated minutes
    assert_eq!(indicators.driving_time_minutes, Some(270 + 225));
    assert_eq!(indicators.break_time_minutes, Some(45 + 45));
    assert_eq!(indicators.duration_minutes, Some(740));
    assert_eq!(
        indicators.to_string(),
        "5 activities, distance 575 km (empty 220 km), driving 8h15, breaks 1h30, duration 12h20"
    );
}

#[test]
fn test_sample_trip_alone() {
    let trips = load_trips_json(Path::new(SAMPLE)).unwrap();
    let afternoon = &trips[1].activities;
    assert_eq!(driving_time(afternoon), Some(150));
    // the last activity of the morning has no successor in its own trip
    assert_eq!(DayIndicators::from_activities(&trips[0].activities).distance_km, Some(350.));
}

#[test]
fn test_missing_estimate_makes_indicators_unknown() {
    let mut trips = load_trips_json(Path::new(SAMPLE)).unwrap();
    trips[1].activities[0].estimated_driving_time_to_next_activity = None;
    trips[1].activities[0].estimated_distance_to_next_activity = None;

    let indicators = DayIndicators::from_trips(&trips);
    assert_eq!(indicators.driving_time_minutes, None);
    assert_eq!(indicators.distance_km, None);
    assert_eq!(indicators.empty_distance_km, None);
    assert_eq!(indicators.duration_minutes, Some(740));
    assert!(indicators.to_string().contains("driving ?"));
}

#[test]
fn test_sample_positions() {
    let trips = load_trips_json(Path::new(SAMPLE)).unwrap();

    let morning = deduplicate_positions(&trips[0].activities);
    assert_eq!(morning.len(), 3);

    let positions = deduplicate_trip_positions(&trips);
    assert_eq!(positions.len(), 3);
    assert_eq!(positions[0].activity_index, (0, 0));
    assert_eq!(positions[0].activities_on_same_location, vec![(1, 1)]);
    assert_eq!(positions[1].activity_index, (0, 1));
    assert_eq!(positions[1].activities_on_same_location, vec![(1, 0)]);
    assert!(positions[2].activities_on_same_location.is_empty());
}

#[test]
fn test_out_of_range_estimates_never_panic() {
    let mut trips = load_trips_json(Path::new(SAMPLE)).unwrap();
    let afternoon = &mut trips[1].activities;
    let last = afternoon.len() - 1;
    afternoon[last].timing = tripday::ActivityTiming::Simulated {
        simulated_start: afternoon[last].timing.start(),
        simulated_duration: 9_000_000_000_000_000,
    };
    afternoon[0].estimated_driving_time_to_next_activity = Some(i64::MAX);

    let indicators = DayIndicators::from_trips(&trips);
    assert_eq!(indicators.end, None);
    assert_eq!(indicators.duration_minutes, None);
    assert_eq!(indicators.driving_time_minutes, None);
    assert_eq!(indicators.distance_km, Some(575.));
}
