//! Bar feed loading.
//!
//! Reads OHLC bars from CSV and prepends the synthetic lead-in the
//! trend lines need to warm up before the first real bar.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use hullgear_core::domain::Bar;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read bar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse bar file: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid timestamp {timestamp}")]
    BadTimestamp { row: usize, timestamp: i64 },

    #[error("row {row}: bar at {time} is not after the previous bar")]
    OutOfOrder { row: usize, time: DateTime<Utc> },

    #[error("row {row}: non-finite or inconsistent OHLC values")]
    BadValues { row: usize },

    #[error("feed has {len} bars, need at least {min}")]
    TooShort { len: usize, min: usize },
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Loads bars from a CSV file with a `time,open,high,low,close` header.
/// Timestamps are unix seconds and must be strictly increasing.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, FeedError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();

    for (i, record) in reader.deserialize().enumerate() {
        let record: BarRecord = record?;
        let row = i + 1;

        let time = Utc
            .timestamp_opt(record.time, 0)
            .single()
            .ok_or(FeedError::BadTimestamp {
                row,
                timestamp: record.time,
            })?;

        let bar = Bar {
            time,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
        };
        if !bar.is_sane() {
            return Err(FeedError::BadValues { row });
        }
        if let Some(prev) = bars.last() {
            let prev: &Bar = prev;
            if bar.time <= prev.time {
                return Err(FeedError::OutOfOrder { row, time: bar.time });
            }
        }
        bars.push(bar);
    }

    Ok(bars)
}

/// Prepends `count` copies of the first bar, spaced at the feed's own
/// interval, so that indicator warmup burns through synthetic history
/// instead of real bars.
///
/// Needs at least two bars to infer the interval.
pub fn prepend_lead_in(bars: &[Bar], count: usize) -> Result<Vec<Bar>, FeedError> {
    if count == 0 {
        return Ok(bars.to_vec());
    }
    if bars.len() < 2 {
        return Err(FeedError::TooShort {
            len: bars.len(),
            min: 2,
        });
    }

    let interval = bars[1].time - bars[0].time;
    let first = bars[0];

    // step backwards one interval at a time; no count-sized multiply
    let mut lead = Vec::with_capacity(count);
    let mut time = first.time;
    for _ in 0..count {
        time = time - interval;
        let mut clone = first;
        clone.time = time;
        lead.push(clone);
    }
    lead.reverse();

    let mut out = lead;
    out.reserve(bars.len());
    out.extend_from_slice(bars);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bar(minute: i64, price: f64) -> Bar {
        Bar {
            time: Utc.timestamp_opt(1_662_714_600 + minute * 60, 0).unwrap(),
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_a_well_formed_file() {
        let file = write_csv(
            "time,open,high,low,close\n\
             1662714600,10.0,11.0,9.0,10.5\n\
             1662714660,10.5,12.0,10.0,11.5\n",
        );
        let bars = load_bars_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].time - bars[0].time, chrono::Duration::seconds(60));
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let file = write_csv(
            "time,open,high,low,close\n\
             1662714660,10.0,10.0,10.0,10.0\n\
             1662714600,10.0,10.0,10.0,10.0\n",
        );
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(FeedError::OutOfOrder { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_inconsistent_ohlc() {
        // high below low
        let file = write_csv(
            "time,open,high,low,close\n\
             1662714600,10.0,9.0,11.0,10.0\n",
        );
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(FeedError::BadValues { row: 1 })
        ));
    }

    #[test]
    fn lead_in_clones_the_first_bar_at_the_feed_interval() {
        let bars = vec![bar(0, 10.0), bar(1, 11.0), bar(2, 12.0)];
        let padded = prepend_lead_in(&bars, 24).unwrap();
        assert_eq!(padded.len(), 27);
        assert_eq!(padded[24..], bars[..]);

        for w in padded.windows(2) {
            assert_eq!(w[1].time - w[0].time, chrono::Duration::seconds(60));
        }
        for lead in &padded[..24] {
            assert_eq!(lead.close, 10.0);
        }
    }

    #[test]
    fn lead_in_spacing_holds_for_large_counts() {
        let bars = vec![bar(0, 10.0), bar(1, 11.0)];
        let count = 100_000;
        let padded = prepend_lead_in(&bars, count).unwrap();
        assert_eq!(padded.len(), count + 2);
        assert_eq!(
            padded[0].time,
            bars[0].time - chrono::Duration::seconds(60 * count as i64)
        );
        assert_eq!(
            padded[count - 1].time,
            bars[0].time - chrono::Duration::seconds(60)
        );
    }

    #[test]
    fn zero_lead_in_is_identity() {
        let bars = vec![bar(0, 10.0), bar(1, 11.0)];
        assert_eq!(prepend_lead_in(&bars, 0).unwrap(), bars);
    }

    #[test]
    fn lead_in_needs_two_bars() {
        let bars = vec![bar(0, 10.0)];
        assert!(matches!(
            prepend_lead_in(&bars, 24),
            Err(FeedError::TooShort { len: 1, min: 2 })
        ));
    }
}
