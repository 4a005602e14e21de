//! Flight log CSV adapter.
//!
//! Recorded logs come from several exporters. The timestamp is read from a
//! `UTC` column when present, otherwise from the first column, and may be
//! unix seconds, unix milliseconds or a date-time string. Position is either
//! a combined `"lat,lon"` column or separate latitude/longitude columns.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::io::{Read, Write};
use std::path::Path;
use taxi_core::schema::{self, ColumnMatcher, HeaderRule};
use taxi_core::{Result, TaxiError, TrackSample};

const FLIGHT_TABLE: &str = "flight log";
const UNKNOWN_CALLSIGN: &str = "UNKNOWN";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Samples of one flight log.
#[derive(Debug, Clone, Default)]
pub struct FlightLog {
    pub samples: Vec<TrackSample>,
    /// Rows dropped because the record or its timestamp did not parse
    pub dropped_rows: usize,
}

enum PositionColumns {
    Combined(usize),
    Split { lat: usize, lon: usize },
}

fn utc_column() -> ColumnMatcher {
    ColumnMatcher::new("utc", vec![HeaderRule::Contains("utc")])
}

fn position_column() -> ColumnMatcher {
    ColumnMatcher::new("position", vec![HeaderRule::Contains("position")])
}

fn altitude_column() -> ColumnMatcher {
    ColumnMatcher::new("altitude", vec![HeaderRule::Contains("alt")])
}

fn callsign_column() -> ColumnMatcher {
    ColumnMatcher::new("callsign", vec![HeaderRule::Contains("call")])
}

/// Parse a timestamp as exported by the flight loggers.
///
/// Ten digits are unix seconds, thirteen digits unix milliseconds; anything
/// else must be RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let all_digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());

    if all_digits && raw.len() == 10 {
        return Utc.timestamp_opt(raw.parse().ok()?, 0).single();
    }
    if all_digits && raw.len() == 13 {
        return Utc.timestamp_millis_opt(raw.parse().ok()?).single();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn parse_coordinate(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

pub fn read_flight_log<R: Read>(reader: R) -> Result<FlightLog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let headers: Vec<&str> = headers.iter().collect();

    let time_col = utc_column().find(&headers).unwrap_or(0);
    let position = match position_column().find(&headers) {
        Some(col) => PositionColumns::Combined(col),
        None => PositionColumns::Split {
            lat: schema::latitude_column().require(FLIGHT_TABLE, &headers)?,
            lon: schema::longitude_column().require(FLIGHT_TABLE, &headers)?,
        },
    };
    let alt_col = altitude_column().find(&headers);
    let call_col = callsign_column().find(&headers);

    let mut log = FlightLog::default();
    for (row, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("Dropping flight log row {}: {}", row, err);
                log.dropped_rows += 1;
                continue;
            }
        };
        let field = |col: usize| record.get(col).unwrap_or("");

        let Some(timestamp) = parse_timestamp(field(time_col)) else {
            log.dropped_rows += 1;
            continue;
        };

        let (lat, lon) = match position {
            PositionColumns::Combined(col) => {
                let mut parts = field(col).split(',');
                (
                    parse_coordinate(parts.next().unwrap_or("")),
                    parse_coordinate(parts.next().unwrap_or("")),
                )
            }
            PositionColumns::Split { lat, lon } => {
                (parse_coordinate(field(lat)), parse_coordinate(field(lon)))
            }
        };

        let altitude = alt_col
            .and_then(|col| field(col).parse::<f64>().ok())
            .filter(|alt| alt.is_finite())
            .unwrap_or(0.0);

        let callsign = call_col
            .map(|col| field(col).to_string())
            .filter(|call| !call.is_empty())
            .unwrap_or_else(|| UNKNOWN_CALLSIGN.to_string());

        log.samples.push(TrackSample {
            timestamp,
            lat,
            lon,
            altitude,
            callsign: Some(callsign),
        });
    }

    if log.dropped_rows > 0 {
        tracing::warn!(
            "Dropped {} flight log row(s) with unreadable timestamps",
            log.dropped_rows
        );
    }
    Ok(log)
}

pub fn read_flight_log_from_path(path: impl AsRef<Path>) -> Result<FlightLog> {
    read_flight_log(std::fs::File::open(path)?)
}

/// Write samples in the exporter layout: millisecond timestamps and a
/// combined position column.
pub fn write_flight_log<W: Write>(writer: W, samples: &[TrackSample]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Timestamp", "Callsign", "Position", "Altitude"])?;
    for sample in samples {
        csv_writer.write_record([
            sample.timestamp.timestamp_millis().to_string(),
            sample
                .callsign
                .clone()
                .unwrap_or_else(|| UNKNOWN_CALLSIGN.to_string()),
            format!("{:.7},{:.7}", sample.lat, sample.lon),
            format!("{:.1}", sample.altitude),
        ])?;
    }
    csv_writer.flush().map_err(TaxiError::from)?;
    Ok(())
}
