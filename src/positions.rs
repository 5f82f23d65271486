// Map markers for the activities of a trip
//
// Activities at the same point share a marker. Points are compared with exact
// floating point equality, two reads of the same address that differ by any
// amount produce two markers.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, Trip};

/// A marker on the map
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Position<I> {
    pub latitude: f64,
    pub longitude: f64,
    /// First activity at this point
    pub activity_index: I,
    /// Later activities at the same point
    pub activities_on_same_location: Vec<I>,
}

impl<I> Position<I> {
    fn is_at(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude == latitude && self.longitude == longitude
    }

    /// Number of activities sharing this marker
    pub fn activity_count(&self) -> usize {
        1 + self.activities_on_same_location.len()
    }
}

fn deduplicate<I>(located: impl Iterator<Item = (I, (f64, f64))>) -> Vec<Position<I>> {
    let mut positions: Vec<Position<I>> = Vec::new();
    for (index, (latitude, longitude)) in located {
        match positions
            .iter_mut()
            .find(|position| position.is_at(latitude, longitude))
        {
            Some(position) => position.activities_on_same_location.push(index),
            None => positions.push(Position {
                latitude,
                longitude,
                activity_index: index,
                activities_on_same_location: Vec::new(),
            }),
        }
    }
    positions
}

/// Markers of a trip in first occurrence order, activities without coordinates are skipped
pub fn deduplicate_positions(activities: &[Activity]) -> Vec<Position<usize>> {
    let positions = deduplicate(
        activities
            .iter()
            .enumerate()
            .filter_map(|(index, activity)| Some((index, activity.coordinates()?))),
    );
    debug!(
        "{} activities on {} positions",
        activities.len(),
        positions.len()
    );
    positions
}

/// Markers of several trips, activities are indexed as `(trip index, activity index)`
pub fn deduplicate_trip_positions(trips: &[Trip]) -> Vec<Position<(usize, usize)>> {
    deduplicate(trips.iter().enumerate().flat_map(|(trip_index, trip)| {
        trip.activities
            .iter()
            .enumerate()
            .filter_map(move |(index, activity)| {
                Some(((trip_index, index), activity.coordinates()?))
            })
    }))
}
