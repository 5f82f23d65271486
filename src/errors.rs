// Error types for tripday

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TripdayError {
    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Scheduler settings validation
    #[snafu(display("Invalid slots per row: {value}, must be a divisor of 60"))]
    InvalidSlotsPerRow { value: u32 },
    #[snafu(display("Unknown timezone: {name}"))]
    InvalidTimezone { name: String },
    #[snafu(display("Invalid date: {value}, expected YYYY-MM-DD"))]
    InvalidDate { value: String },

    // Input loading errors
    #[snafu(display("Invalid input file: {path}"))]
    InvalidInputFile { path: String },
    #[snafu(display("Error reading input file"))]
    InputReadError { source: io::Error },
    #[snafu(display("Error parsing input file"))]
    InputParseError { source: serde_json::Error },

    // Output errors
    #[snafu(display("Error writing output file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing output"))]
    OutputSerializeError { source: serde_json::Error },
}
