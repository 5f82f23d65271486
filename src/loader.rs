use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::activity::{Activity, SiteActivity, Trip};
use crate::errors::TripdayError;

/// A trips file holds either a list of trips or the activities of a single trip
#[derive(Deserialize)]
#[serde(untagged)]
enum TripsFile {
    Trips(Vec<Trip>),
    Activities(Vec<Activity>),
}

fn ensure_file(source_file: &Path) -> Result<(), TripdayError> {
    if !source_file.is_file() {
        return Err(TripdayError::InvalidInputFile {
            path: format!("{:?}", source_file),
        });
    }
    Ok(())
}

fn open(source_file: &Path) -> Result<BufReader<File>, TripdayError> {
    ensure_file(source_file)?;
    let file = File::open(source_file).map_err(|e| TripdayError::InputReadError { source: e })?;
    Ok(BufReader::new(file))
}

pub fn load_trips_json(source_file: &Path) -> Result<Vec<Trip>, TripdayError> {
    let trips = match serde_json::from_reader(open(source_file)?)
        .map_err(|e| TripdayError::InputParseError { source: e })?
    {
        TripsFile::Trips(trips) => trips,
        TripsFile::Activities(activities) => vec![Trip::new(activities)],
    };
    info!(
        "Loaded {:?}, found {} trips with a total of {} activities",
        source_file,
        trips.len(),
        trips.iter().map(|t| t.activities.len()).sum::<usize>()
    );
    Ok(trips)
}

/// Load site activities from a JSON array (`.json`) or one activity per line
pub fn load_site_activities(source_file: &Path) -> Result<Vec<SiteActivity>, TripdayError> {
    let is_json_array = source_file
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let activities: Vec<SiteActivity> = if is_json_array {
        serde_json::from_reader(open(source_file)?)
            .map_err(|e| TripdayError::InputParseError { source: e })?
    } else {
        ensure_file(source_file)?;
        serde_jsonlines::json_lines(source_file)
            .map_err(|e| TripdayError::InputReadError { source: e })?
            .collect::<Result<Vec<SiteActivity>, std::io::Error>>()
            .map_err(|e| TripdayError::InputReadError { source: e })?
    };
    info!(
        "Loaded {:?}, found {} site activities",
        source_file,
        activities.len()
    );
    Ok(activities)
}
