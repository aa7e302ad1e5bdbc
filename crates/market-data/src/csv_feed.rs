// In crates/market-data/src/csv_feed.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::Kline;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Error, Result};

/// One CSV row before parsing. Prices stay as text so they convert to
/// `Decimal` without passing through `f64`.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "timestamp", alias = "open_time", alias = "date", alias = "time")]
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

/// Streams klines from a headered CSV file.
///
/// Expected columns: `datetime` (or `timestamp` / `open_time` / `date` /
/// `time`), `open`, `high`, `low`, `close` and an optional `volume`.
pub struct CsvFeed<R> {
    rows: csv::DeserializeRecordsIntoIter<R, RawRow>,
    line: u64,
}

impl CsvFeed<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvFeed<R> {
    pub fn from_reader(reader: R) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self { rows, line: 1 }
    }

    fn parse(&self, row: RawRow) -> Result<Kline> {
        let price = |field: &'static str, value: &str| {
            Decimal::from_str(value).map_err(|_| Error::Price {
                line: self.line,
                field,
                value: value.to_string(),
            })
        };

        let kline = Kline {
            open_time: parse_timestamp(&row.datetime).ok_or_else(|| Error::Timestamp {
                line: self.line,
                value: row.datetime.clone(),
            })?,
            open: price("open", &row.open)?,
            high: price("high", &row.high)?,
            low: price("low", &row.low)?,
            close: price("close", &row.close)?,
            volume: match row.volume.as_deref() {
                None | Some("") => Decimal::ZERO,
                Some(v) => price("volume", v)?,
            },
        };
        kline.validate()?;
        Ok(kline)
    }
}

impl<R: Read> Iterator for CsvFeed<R> {
    type Item = Result<Kline>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.line += 1;
        Some(row.map_err(Error::from).and_then(|row| self.parse(row)))
    }
}

/// Parses a bar timestamp into epoch milliseconds.
///
/// Accepts integer epochs (13+ digits are milliseconds, shorter are seconds),
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`
/// (midnight UTC). Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        let n: i64 = value.parse().ok()?;
        return Some(if value.len() >= 13 { n } else { n.checked_mul(1000)? });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
