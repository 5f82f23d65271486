use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;

use tripday::config::{SchedulerConfig, parse_timezone};
use tripday::indicators::DayIndicators;
use tripday::scheduler::SiteSchedule;
use tripday::{TripdayError, loader, positions, writer};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Distance, empty km, driving time and duration of a day of trips
    Indicators {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Map markers of the activities, co-located activities share a marker
    Positions {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Site scheduler day view
    Schedule {
        #[arg(short, long)]
        input: PathBuf,

        /// Selected day, YYYY-MM-DD
        #[arg(short, long)]
        date: String,

        /// IANA timezone of the site, overrides the saved config
        #[arg(short, long)]
        timezone: Option<String>,

        #[arg(short, long)]
        slots_per_row: Option<u32>,

        /// Show punctuality from ETA tracking
        #[arg(long)]
        eta: Option<bool>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or update the saved scheduler config
    Config {
        #[arg(short, long)]
        timezone: Option<String>,

        #[arg(short, long)]
        slots_per_row: Option<u32>,

        #[arg(long)]
        eta: Option<bool>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TripdayError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| TripdayError::OutputSerializeError { source: e })?;
    println!("{}", json);
    Ok(())
}

fn load_config() -> SchedulerConfig {
    match SchedulerConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => SchedulerConfig::default(),
        Err(e) => {
            warn!("Could not load saved config, using defaults: {}", e);
            SchedulerConfig::default()
        }
    }
}

fn apply_overrides(
    mut config: SchedulerConfig,
    timezone: &Option<String>,
    slots_per_row: Option<u32>,
    eta: Option<bool>,
) -> Result<SchedulerConfig, TripdayError> {
    if let Some(timezone) = timezone {
        config.timezone = parse_timezone(timezone)?;
    }
    if let Some(slots_per_row) = slots_per_row {
        config.slots_per_row = slots_per_row;
    }
    if let Some(eta) = eta {
        config.eta_tracking_enabled = eta;
    }
    config.validate()?;
    Ok(config)
}

fn show_indicators(input: &Path) -> Result<(), TripdayError> {
    let trips = loader::load_trips_json(input)?;
    let indicators = DayIndicators::from_trips(&trips);
    info!("{}", indicators);
    print_json(&indicators)
}

fn show_positions(input: &Path) -> Result<(), TripdayError> {
    let trips = loader::load_trips_json(input)?;
    let positions = positions::deduplicate_trip_positions(&trips);
    info!("{} positions", positions.len());
    print_json(&positions)
}

fn show_schedule(
    input: &Path,
    date: &str,
    config: SchedulerConfig,
    output: Option<&Path>,
) -> Result<(), TripdayError> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        TripdayError::InvalidDate {
            value: date.to_string(),
        }
    })?;
    let activities = loader::load_site_activities(input)?;
    let schedule = SiteSchedule::build(&activities, day, &config);

    for line in writer::schedule_lines(&schedule) {
        for card in line.cards {
            println!(
                "{:>7}  {:<13}  {:<9}  {} ({})",
                line.bucket,
                card.label,
                format!("{:?}", card.category).to_lowercase(),
                card.uids.join(", "),
                card.transport_uid
            );
        }
    }
    for (status, count) in &schedule.status_counts {
        info!("{}: {}", status, count);
    }

    if let Some(output_file) = output {
        writer::write_schedule(output_file, &schedule)?;
        info!("Schedule written to {:?}", output_file);
    }
    Ok(())
}

fn update_config(
    timezone: &Option<String>,
    slots_per_row: Option<u32>,
    eta: Option<bool>,
) -> Result<(), TripdayError> {
    let updated = apply_overrides(load_config(), timezone, slots_per_row, eta)?;
    if timezone.is_some() || slots_per_row.is_some() || eta.is_some() {
        updated.save()?;
        info!("Config saved to {:?}", SchedulerConfig::default_path()?);
    }
    print_json(&updated)
}

fn run(cli: &Args) -> Result<(), TripdayError> {
    match &cli.command {
        Commands::Indicators { input } => show_indicators(input),
        Commands::Positions { input } => show_positions(input),
        Commands::Schedule {
            input,
            date,
            timezone,
            slots_per_row,
            eta,
            output,
        } => {
            let config = apply_overrides(load_config(), timezone, *slots_per_row, *eta)?;
            show_schedule(input, date, config, output.as_deref())
        }
        Commands::Config {
            timezone,
            slots_per_row,
            eta,
        } => update_config(timezone, *slots_per_row, *eta),
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
