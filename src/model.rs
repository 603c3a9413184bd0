use crate::error::ReportError;
use rusqlite::types::ValueRef;
use rusqlite::Row;

/// One row of the `SensorData` table, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub(crate) date_time: String,
    pub(crate) sensor_id: String,
    /// Temperature in °C
    pub(crate) temp1: f64,
    pub(crate) temp2: Option<f64>,
    /// Relative humidity in %
    pub(crate) rh: f64,
    pub(crate) press: Option<f64>,
    pub(crate) light: Option<f64>,
}

const COLUMNS: [&str; 7] = [
    "date_time", "sensorID", "temp1", "temp2", "rh", "press", "light",
];

impl SensorReading {
    /// Maps a row selected as `date_time, sensorID, temp1, temp2, rh, press, light`.
    ///
    /// Only the fields the report uses are strict. `temp2`, `press` and `light`
    /// become `None` when they don't hold a number.
    pub fn from_row(row: &Row) -> Result<Self, ReportError> {
        let mut values = Vec::with_capacity(COLUMNS.len());
        for idx in 0..COLUMNS.len() {
            let value = row
                .get_ref(idx)
                .map_err(|e| ReportError::storage("reading SensorData row", e))?;
            values.push(value);
        }

        let malformed = |idx: usize, reason: String| ReportError::MalformedReading {
            row: raw_row(&values),
            column: COLUMNS[idx],
            reason,
        };

        let text = |idx: usize| match values[idx] {
            ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|_| malformed(idx, "not valid UTF-8".to_string())),
            other => Err(malformed(
                idx,
                format!("expected text, found {}", other.data_type()),
            )),
        };

        let number = |idx: usize| {
            as_number(values[idx]).ok_or_else(|| {
                malformed(
                    idx,
                    format!("expected a number, found {}", values[idx].data_type()),
                )
            })
        };

        Ok(SensorReading {
            date_time: text(0)?,
            sensor_id: text(1)?,
            temp1: number(2)?,
            temp2: as_number(values[3]),
            rh: number(4)?,
            press: as_number(values[5]),
            light: as_number(values[6]),
        })
    }
}

/// `NaN` and `inf` parse as `f64` but are never a sensor value.
fn as_number(value: ValueRef) -> Option<f64> {
    let number = match value {
        ValueRef::Real(v) => Some(v),
        ValueRef::Integer(v) => Some(v as f64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    };
    number.filter(|v| v.is_finite())
}

/// Renders the row the way `sqlite3` prints it, for error messages.
fn raw_row(values: &[ValueRef]) -> String {
    values
        .iter()
        .map(|value| match value {
            ValueRef::Null => "NULL".to_string(),
            ValueRef::Integer(v) => v.to_string(),
            ValueRef::Real(v) => v.to_string(),
            ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            ValueRef::Blob(bytes) => format!("<{} byte blob>", bytes.len()),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
