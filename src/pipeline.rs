use crate::config::Config;
use crate::error::ReportError;
use crate::fetch::WindowedSeriesFetcher;
use crate::model::SensorReading;
use crate::report::{assemble, Document, PageContext};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fmt;

pub const NO_DATA_NOTICE: &str = "No data found";

/// What one run produces: the page, or a notice when the window is empty.
#[derive(Debug)]
pub enum Outcome {
    Report(Document),
    NoData,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Report(document) => write!(f, "{}", document),
            Outcome::NoData => writeln!(f, "{}", NO_DATA_NOTICE),
        }
    }
}

impl PageContext {
    pub fn from_config(config: &Config) -> Self {
        PageContext {
            host_name: config.host_name(),
            chart_title: config.chart_title.clone(),
            primary_label: config.primary_label.clone(),
            secondary_label: config.secondary_label.clone(),
        }
    }
}

/// Fetches the configured window and turns it into an [`Outcome`].
pub fn generate(config: &Config, now: DateTime<Utc>) -> Result<Outcome, ReportError> {
    config.validate()?;

    let readings = WindowedSeriesFetcher::new(config).fetch(
        &config.sensor_id,
        config.lookback_hours,
        now,
    )?;

    build(&readings, &PageContext::from_config(config))
}

pub fn build(readings: &[SensorReading], page: &PageContext) -> Result<Outcome, ReportError> {
    if readings.is_empty() {
        warn!("No readings in the window");
        return Ok(Outcome::NoData);
    }

    let document = assemble(readings, page)?;
    info!(
        "Assembled report with {} points. {}",
        document.series.len(),
        document.summary
    );
    Ok(Outcome::Report(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::{insert_row, setup_database};
    use chrono::TimeZone;
    use rusqlite::Connection;
    use std::path::Path;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 20, 12, 0, 0).unwrap()
    }

    fn config_for(path: &Path) -> Config {
        Config {
            database_path: path.to_path_buf(),
            lookback_hours: 24,
            host_name: Some("station".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn empty_window_prints_notice_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Weather.db");
        {
            let conn = Connection::open(&path).unwrap();
            setup_database(&conn);
            insert_row(&conn, "2025-04-01 08:00:00", "Deck", 20.0, 50.0);
        }

        let outcome = generate(&config_for(&path), now()).unwrap();
        assert!(matches!(outcome, Outcome::NoData));
        assert_eq!(outcome.to_string(), "No data found\n");
    }

    #[test]
    fn empty_readings_never_reach_assembly() {
        let page = PageContext {
            host_name: "station".to_string(),
            chart_title: String::new(),
            primary_label: String::new(),
            secondary_label: String::new(),
        };
        assert!(matches!(build(&[], &page), Ok(Outcome::NoData)));
    }

    #[test]
    fn deck_row_produces_expected_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Weather.db");
        {
            let conn = Connection::open(&path).unwrap();
            setup_database(&conn);
            conn.execute(
                "INSERT INTO SensorData VALUES ('2025-04-19 15:40:27', 'Deck', 25.0, 0.0, 0.0, 1010.0, 79.0)",
                [],
            )
            .unwrap();
        }

        let document = match generate(&config_for(&path), now()).unwrap() {
            Outcome::Report(document) => document,
            Outcome::NoData => panic!("expected a report"),
        };
        assert_eq!(document.summary.timestamp, "2025-04-19 15:40:27");
        assert_eq!(document.summary.sensor_id, "Deck");
        assert_eq!(document.summary.temp_f, 77.0);
        assert_eq!(document.summary.rh, 0.0);
        assert_eq!(
            document.summary.to_string(),
            "Current conditions at 2025-04-19 15:40:27 for sensor 'Deck': 77.0°F, 0%"
        );
        assert!(document.to_string().starts_with("<html>"));
    }

    #[test]
    fn malformed_row_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Weather.db");
        {
            let conn = Connection::open(&path).unwrap();
            setup_database(&conn);
            insert_row(&conn, "2025-04-20 08:00:00", "Deck", 20.0, 50.0);
            conn.execute(
                "INSERT INTO SensorData VALUES ('2025-04-20 09:00:00', 'Deck', 'broken', 0.0, 50.0, 1010.0, 79.0)",
                [],
            )
            .unwrap();
        }

        let err = generate(&config_for(&path), now()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedReading { .. }));
    }

    #[test]
    fn nan_and_infinite_text_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Weather.db");
        {
            let conn = Connection::open(&path).unwrap();
            setup_database(&conn);
            conn.execute(
                "INSERT INTO SensorData VALUES ('2025-04-20 09:00:00', 'Deck', 'NaN', 0.0, 'inf', 1010.0, 79.0)",
                [],
            )
            .unwrap();
        }

        let err = generate(&config_for(&path), now()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedReading { column: "temp1", .. }));
    }

    #[test]
    fn missing_database_aborts_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(&config_for(&dir.path().join("nope.db")), now()).unwrap_err();
        assert!(matches!(err, ReportError::StorageUnavailable { .. }));
    }

    #[test]
    fn invalid_config_is_rejected_before_touching_storage() {
        let config = Config {
            sensor_id: String::new(),
            database_path: "/nonexistent/Weather.db".into(),
            ..Config::default()
        };
        assert!(matches!(
            generate(&config, now()),
            Err(ReportError::InvalidConfig(_))
        ));
    }
}
