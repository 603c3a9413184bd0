use crate::error::ReportError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the weather database for reading. The file must already exist,
/// the report never creates or writes to it.
pub fn open_read_only(database_path: &Path) -> Result<Connection, ReportError> {
    let context = || format!("opening {}", database_path.display());

    let conn = Connection::open_with_flags(
        database_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ReportError::storage(context(), e))?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| ReportError::storage(context(), e))?;

    Ok(conn)
}

/// Creates the `SensorData` table the way the data logger does.
#[cfg(test)]
pub(crate) fn setup_database(conn: &Connection) {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS SensorData (
            date_time TEXT,
            sensorID TEXT,
            temp1 REAL,
            temp2 REAL,
            rh REAL,
            press REAL,
            light REAL
        )",
        [],
    )
    .expect("Failed to create SensorData table");
}

#[cfg(test)]
pub(crate) fn insert_row(
    conn: &Connection,
    date_time: &str,
    sensor_id: &str,
    temp1: f64,
    rh: f64,
) {
    conn.execute(
        "INSERT INTO SensorData (date_time, sensorID, temp1, temp2, rh, press, light)
         VALUES (?1, ?2, ?3, 0.0, ?4, 1010.0, 79.0)",
        (date_time, sensor_id, temp1, rh),
    )
    .expect("Failed to insert into SensorData table");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_read_only(&dir.path().join("Weather.db")).unwrap_err();
        assert!(matches!(err, ReportError::StorageUnavailable { .. }));
        assert!(!dir.path().join("Weather.db").exists());
    }

    #[test]
    fn read_only_connection_refuses_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Weather.db");
        setup_database(&Connection::open(&path).unwrap());

        let conn = open_read_only(&path).unwrap();
        let result = conn.execute("DELETE FROM SensorData", []);
        assert!(result.is_err());
    }
}
