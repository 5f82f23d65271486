use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::TripdayError;

const CONFIG_DIR_NAME: &str = "tripday";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_SLOTS_PER_ROW: u32 = 2;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Paris;

/// Settings of the site scheduler day view
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Timezone of the site, used to localize every activity time
    pub timezone: Tz,
    /// Number of slots an hour row is split into
    pub slots_per_row: u32,
    /// Whether punctuality from ETA tracking is shown
    pub eta_tracking_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            slots_per_row: DEFAULT_SLOTS_PER_ROW,
            eta_tracking_enabled: false,
        }
    }
}

impl SchedulerConfig {
    /// Default location of the config file in the user config directory
    pub fn default_path() -> Result<PathBuf, TripdayError> {
        Ok(dirs::config_dir()
            .ok_or(TripdayError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config from the user config directory, `None` when it was never saved
    pub fn from_local_file() -> Result<Option<Self>, TripdayError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_path(config_path: &Path) -> Result<Self, TripdayError> {
        debug!("Loading scheduler config from {:?}", config_path);
        let file = std::fs::File::open(config_path)
            .map_err(|e| TripdayError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| TripdayError::ConfigSerializeError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), TripdayError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), TripdayError> {
        self.validate()?;
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TripdayError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| TripdayError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TripdayError::ConfigSerializeError { source: e })
    }

    /// Slots must split an hour into whole minutes
    pub fn validate(&self) -> Result<(), TripdayError> {
        if self.slots_per_row == 0 || self.slots_per_row > 60 || 60 % self.slots_per_row != 0 {
            return Err(TripdayError::InvalidSlotsPerRow {
                value: self.slots_per_row,
            });
        }
        Ok(())
    }

    /// Duration of one slot in minutes
    pub fn slot_duration_minutes(&self) -> u32 {
        60 / self.slots_per_row.max(1)
    }
}

/// Parse an IANA timezone name such as `Europe/Paris`
pub fn parse_timezone(name: &str) -> Result<Tz, TripdayError> {
    name.parse::<Tz>()
        .map_err(|_| TripdayError::InvalidTimezone {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone, chrono_tz::Europe::Paris);
        assert_eq!(config.slot_duration_minutes(), 30);
        assert!(!config.eta_tracking_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_slots_per_row_validation() {
        for slots_per_row in [1, 2, 3, 4, 6, 12, 60] {
            let config = SchedulerConfig {
                slots_per_row,
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{slots_per_row} should be valid");
        }
        for slots_per_row in [0, 7, 45, 120] {
            let config = SchedulerConfig {
                slots_per_row,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(TripdayError::InvalidSlotsPerRow { value }) if value == slots_per_row
            ));
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = SchedulerConfig {
            timezone: chrono_tz::America::New_York,
            slots_per_row: 4,
            eta_tracking_enabled: true,
        };
        config.save_to(&path).unwrap();

        let loaded = SchedulerConfig::from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"slots_per_row": 4}"#).unwrap();

        let loaded = SchedulerConfig::from_path(&path).unwrap();
        assert_eq!(loaded.slots_per_row, 4);
        assert_eq!(loaded.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_load_rejects_invalid_slots() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"slots_per_row": 7}"#).unwrap();
        assert!(SchedulerConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(TripdayError::InvalidTimezone { .. })
        ));
    }
}
