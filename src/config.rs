use crate::error::ReportError;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Everything one report run needs. Loaded from a JSON file, every field optional:
///
/// ```json
/// { "sensor_id": "Deck", "lookback_hours": 240, "database_path": "/var/databases/Weather.db" }
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub(crate) sensor_id: String,
    /// Size of the window, counted back from now
    pub(crate) lookback_hours: u32,
    pub(crate) database_path: PathBuf,
    /// Compare against local wall-clock time instead of UTC
    pub(crate) local_time: bool,

    /// Overrides the machine's network name in the page title
    pub(crate) host_name: Option<String>,
    pub(crate) chart_title: String,
    pub(crate) primary_label: String,
    pub(crate) secondary_label: String,

    pub(crate) web_server_ip: String,
    pub(crate) web_server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sensor_id: "Deck".to_string(),
            lookback_hours: 10 * 24,
            database_path: PathBuf::from("/var/databases/Weather.db"),
            local_time: false,
            host_name: None,
            chart_title: "Outside Temp and Humidity History".to_string(),
            primary_label: "Temp (°C)".to_string(),
            secondary_label: "RH (%)".to_string(),
            web_server_ip: "127.0.0.1".to_string(),
            web_server_port: 3030,
        }
    }
}

impl Config {
    /// Reads the config file at `path`. When `required` is false a missing
    /// file yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self, ReportError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound && !required => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ReportError::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ReportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The sensor id is bound as a query parameter, but an empty one or a
    /// zero-hour window can never match anything and points at a typo.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.sensor_id.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "sensor_id must not be empty".to_string(),
            ));
        }
        if self.lookback_hours == 0 {
            return Err(ReportError::InvalidConfig(
                "lookback_hours must be a positive number of hours".to_string(),
            ));
        }
        Ok(())
    }

    pub fn host_name(&self) -> String {
        if let Some(name) = &self.host_name {
            return name.clone();
        }
        match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                warn!("Unable to determine host name: {}", e);
                "localhost".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_station_layout() {
        let config = Config::default();
        assert_eq!(config.sensor_id, "Deck");
        assert_eq!(config.lookback_hours, 240);
        assert_eq!(config.database_path, PathBuf::from("/var/databases/Weather.db"));
        assert!(!config.local_time);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json"), false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config.json"), true).unwrap_err();
        assert!(matches!(err, ReportError::ConfigFile { .. }));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sensor_id": "Office", "lookback_hours": 12}}"#).unwrap();

        let config = Config::load(file.path(), true).unwrap();
        assert_eq!(config.sensor_id, "Office");
        assert_eq!(config.lookback_hours, 12);
        assert_eq!(config.web_server_port, 3030);
        assert_eq!(config.chart_title, Config::default().chart_title);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "sensor_id = Deck").unwrap();

        let err = Config::load(file.path(), true).unwrap_err();
        assert!(matches!(err, ReportError::ConfigParse { .. }));
    }

    #[test]
    fn validate_rejects_blank_sensor_and_zero_window() {
        let blank = Config {
            sensor_id: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(blank.validate(), Err(ReportError::InvalidConfig(_))));

        let zero = Config {
            lookback_hours: 0,
            ..Config::default()
        };
        assert!(matches!(zero.validate(), Err(ReportError::InvalidConfig(_))));
    }

    #[test]
    fn configured_host_name_wins() {
        let config = Config {
            host_name: Some("pi-weather".to_string()),
            ..Config::default()
        };
        assert_eq!(config.host_name(), "pi-weather");
    }
}
