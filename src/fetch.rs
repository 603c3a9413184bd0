use crate::config::Config;
use crate::conn::open_read_only;
use crate::error::ReportError;
use crate::model::SensorReading;
use chrono::{DateTime, Duration, Local, Utc};
use log::{debug, info};
use rusqlite::Connection;
use std::path::PathBuf;

/// Same layout as `date_time` values written by the data logger.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const WINDOW_QUERY: &str = "
    SELECT date_time, sensorID, temp1, temp2, rh, press, light
    FROM SensorData
    WHERE date_time > ?1 AND sensorID = ?2
    ORDER BY date_time ASC, rowid ASC
";

/// Reads one sensor's rows for a trailing window of hours.
pub struct WindowedSeriesFetcher {
    database_path: PathBuf,
    local_time: bool,
}

impl WindowedSeriesFetcher {
    pub fn new(config: &Config) -> Self {
        WindowedSeriesFetcher {
            database_path: config.database_path.clone(),
            local_time: config.local_time,
        }
    }

    /// Opens the database, reads every row of `sensor_id` newer than
    /// `now - lookback_hours` in timestamp order and closes it again.
    /// An empty result means the sensor reported nothing in the window.
    pub fn fetch(
        &self,
        sensor_id: &str,
        lookback_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, ReportError> {
        let since = window_start(now, lookback_hours, self.local_time);
        info!(
            "Fetching readings for sensor '{}' since {} from {}",
            sensor_id,
            since,
            self.database_path.display()
        );

        let conn = open_read_only(&self.database_path)?;
        let readings = fetch_window(&conn, sensor_id, &since)?;
        drop(conn);

        debug!("Fetched {} readings", readings.len());
        Ok(readings)
    }
}

/// Lower, exclusive bound of the window as a `date_time` string.
pub fn window_start(now: DateTime<Utc>, lookback_hours: u32, local_time: bool) -> String {
    let wall_clock = if local_time {
        now.with_timezone(&Local).naive_local()
    } else {
        now.naive_utc()
    };

    // Out of chrono's range: an empty bound keeps every row.
    wall_clock
        .checked_sub_signed(Duration::hours(i64::from(lookback_hours)))
        .map(|start| start.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn fetch_window(
    conn: &Connection,
    sensor_id: &str,
    since: &str,
) -> Result<Vec<SensorReading>, ReportError> {
    let context = "querying SensorData";

    let mut stmt = conn
        .prepare(WINDOW_QUERY)
        .map_err(|e| ReportError::storage(context, e))?;
    let mut rows = stmt
        .query((since, sensor_id))
        .map_err(|e| ReportError::storage(context, e))?;

    let mut readings = Vec::new();
    while let Some(row) = rows.next().map_err(|e| ReportError::storage(context, e))? {
        readings.push(SensorReading::from_row(row)?);
    }

    Ok(readings)
}
