// In crates/market-data/src/lib.rs

//! Sequential price-bar sources.
//!
//! A feed is any `Iterator<Item = Result<Kline>>`. Feeds are lazy and cannot
//! be restarted; wrap them in [`ordered`] to enforce strictly increasing bar
//! timestamps.

use core_types::Kline;

pub mod csv_feed;
pub mod error;

pub use csv_feed::CsvFeed;
pub use error::{Error, Result};

/// Iterator adapter that stops with `Error::OutOfOrder` on the first bar whose
/// timestamp does not strictly follow the previous one.
#[derive(Debug)]
pub struct Ordered<I> {
    inner: I,
    last_open_time: Option<i64>,
    failed: bool,
}

pub fn ordered<I>(feed: I) -> Ordered<I::IntoIter>
where
    I: IntoIterator<Item = Result<Kline>>,
{
    Ordered {
        inner: feed.into_iter(),
        last_open_time: None,
        failed: false,
    }
}

impl<I> Iterator for Ordered<I>
where
    I: Iterator<Item = Result<Kline>>,
{
    type Item = Result<Kline>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        let checked = item.and_then(|bar| match self.last_open_time {
            Some(previous) if bar.open_time <= previous => Err(Error::OutOfOrder {
                previous,
                current: bar.open_time,
            }),
            _ => {
                self.last_open_time = Some(bar.open_time);
                Ok(bar)
            }
        });
        self.failed = checked.is_err();
        Some(checked)
    }
}

/// Reads an entire CSV file into memory, validating order.
pub fn load_csv(path: impl AsRef<std::path::Path>) -> Result<Vec<Kline>> {
    let path = path.as_ref();
    let bars = ordered(CsvFeed::open(path)?).collect::<Result<Vec<_>>>()?;
    tracing::info!(path = %path.display(), bars = bars.len(), "Loaded price history.");
    Ok(bars)
}
