use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::TripdayError;
use crate::scheduler::{Bucket, ScheduledCard, SiteSchedule};

/// One line of a schedule export
#[derive(Serialize, Debug)]
pub struct ScheduleLine<'a> {
    pub day: NaiveDate,
    /// `untimed` or the local start of the slot, `HH:MM`
    pub bucket: String,
    pub cards: &'a [ScheduledCard],
}

fn bucket_name(bucket: Bucket) -> String {
    match bucket {
        Bucket::Untimed => "untimed".to_string(),
        Bucket::At(start) => start.format("%H:%M").to_string(),
    }
}

/// Lines of the non empty buckets, untimed first
pub fn schedule_lines(schedule: &SiteSchedule) -> Vec<ScheduleLine<'_>> {
    schedule
        .buckets()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(bucket, cards)| ScheduleLine {
            day: schedule.day,
            bucket: bucket_name(bucket),
            cards,
        })
        .collect()
}

/// Write the schedule as JSON Lines, one line per non empty bucket
pub fn write_schedule(file: &Path, schedule: &SiteSchedule) -> Result<(), TripdayError> {
    serde_jsonlines::write_json_lines(file, schedule_lines(schedule))
        .map_err(|e| TripdayError::WriterError { source: e })
}
