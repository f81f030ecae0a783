//! Kp geomagnetic index series in WDC format.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::time::{add_seconds, format_time, from_ymdh, SimTime};

/// Seconds between consecutive Kp values.
const KP_INTERVAL_SECONDS: f64 = 3.0 * 3600.0;

/// Errors that can occur while loading or querying a Kp series.
#[derive(Error, Debug)]
pub enum KpError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },
    #[error("No Kp data at or before {0}")]
    NoCoverage(String),
    #[error("Kp series is empty")]
    Empty,
}

/// A single Kp value and the start of its three-hour interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpEntry {
    pub time: SimTime,
    pub kp: f64,
}

impl KpEntry {
    pub fn new(time: SimTime, kp: f64) -> Self {
        Self { time, kp }
    }
}

/// Time-ordered Kp values.
#[derive(Debug, Clone, PartialEq)]
pub struct KpSeries {
    entries: Vec<KpEntry>,
}

impl KpSeries {
    /// Creates a series, ordering entries by time.
    pub fn new(mut entries: Vec<KpEntry>) -> Result<Self, KpError> {
        if entries.is_empty() {
            return Err(KpError::Empty);
        }
        entries.sort_by_key(|e| e.time);
        Ok(Self { entries })
    }

    /// Loads and concatenates WDC files in the order given.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, KpError> {
        let mut entries = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let file = File::open(path).map_err(|source| KpError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let parsed = parse_wdc(BufReader::new(file), &path.display().to_string())?;
            debug!(file = %path.display(), entries = parsed.len(), "loaded Kp file");
            entries.extend(parsed);
        }
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KpEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[KpEntry] {
        &self.entries
    }

    /// First entry (the series is never empty).
    pub fn first(&self) -> &KpEntry {
        &self.entries[0]
    }

    /// Last entry (the series is never empty).
    pub fn last(&self) -> &KpEntry {
        &self.entries[self.entries.len() - 1]
    }

    /// Largest Kp value in the series.
    pub fn max_kp(&self) -> f64 {
        self.entries.iter().map(|e| e.kp).fold(f64::MIN, f64::max)
    }

    /// Index of the last entry whose time is at or before `time`.
    pub fn find(&self, time: SimTime) -> Result<usize, KpError> {
        let count = self.entries.partition_point(|e| e.time <= time);
        if count == 0 {
            return Err(KpError::NoCoverage(format_time(time)));
        }
        Ok(count - 1)
    }
}

/// Parses WDC-format Kp lines.
///
/// Columns 1-6 hold `YYMMDD` (years below 50 are 20YY), columns 13-28 hold
/// eight two-digit Kp values in tenths for 00, 03, ..., 21 UT.
pub fn parse_wdc<R: BufRead>(reader: R, source: &str) -> Result<Vec<KpEntry>, KpError> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| KpError::Parse {
            file: source.to_string(),
            line: line_no,
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let parse_err = |message: String| KpError::Parse {
            file: source.to_string(),
            line: line_no,
            message,
        };
        let field = |range: std::ops::Range<usize>| -> Result<u32, KpError> {
            let text = line
                .get(range.clone())
                .ok_or_else(|| parse_err(format!("line too short for columns {:?}", range)))?;
            text.trim()
                .parse::<u32>()
                .map_err(|_| parse_err(format!("invalid number '{}'", text)))
        };

        let yy = field(0..2)? as i32;
        let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
        let month = field(2..4)?;
        let day = field(4..6)?;
        let day_start = from_ymdh(year, month, day, 0)
            .ok_or_else(|| parse_err(format!("invalid date {}-{}-{}", year, month, day)))?;

        for i in 0..8 {
            let start = 12 + 2 * i;
            let value = field(start..start + 2)?;
            let time = add_seconds(day_start, KP_INTERVAL_SECONDS * i as f64);
            entries.push(KpEntry::new(time, value as f64 / 10.0));
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_epoch_seconds;
    use std::io::Write;
    use tempfile::tempdir;

    const WDC: &str = "\
010331227815 7 3 7 3 3 0 7 3 33 4 0.00--9
010401227816 3 7101320232730123 6 0.00--9
";

    fn series(times: &[f64]) -> KpSeries {
        KpSeries::new(
            times
                .iter()
                .enumerate()
                .map(|(i, &t)| KpEntry::new(from_epoch_seconds(t), i as f64))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_wdc_lines() {
        let entries = parse_wdc(WDC.as_bytes(), "test").unwrap();
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[0].time, from_ymdh(2001, 3, 31, 0).unwrap());
        assert_eq!(entries[0].kp, 0.7);
        assert_eq!(entries[1].time, from_ymdh(2001, 3, 31, 3).unwrap());
        assert_eq!(entries[15].time, from_ymdh(2001, 4, 1, 21).unwrap());
        assert_eq!(entries[15].kp, 3.0);
    }

    #[test]
    fn test_parse_rejects_short_line() {
        let err = parse_wdc("0103312278".as_bytes(), "short.kp").unwrap_err();
        match err {
            KpError::Parse { file, line, .. } => {
                assert_eq!(file, "short.kp");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_returns_entry_at_or_before() {
        let s = series(&[0.0, 10800.0, 21600.0]);
        assert_eq!(s.find(from_epoch_seconds(0.0)).unwrap(), 0);
        assert_eq!(s.find(from_epoch_seconds(10799.0)).unwrap(), 0);
        assert_eq!(s.find(from_epoch_seconds(10800.0)).unwrap(), 1);
        assert_eq!(s.find(from_epoch_seconds(1e6)).unwrap(), 2);
    }

    #[test]
    fn test_find_before_coverage_fails() {
        let s = series(&[100.0, 200.0]);
        assert!(matches!(
            s.find(from_epoch_seconds(50.0)),
            Err(KpError::NoCoverage(_))
        ));
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(KpSeries::new(Vec::new()), Err(KpError::Empty)));
    }

    #[test]
    fn test_from_files_concatenates() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.kp");
        let b = dir.path().join("b.kp");
        let mut lines = WDC.lines();
        writeln!(File::create(&a).unwrap(), "{}", lines.next().unwrap()).unwrap();
        writeln!(File::create(&b).unwrap(), "{}", lines.next().unwrap()).unwrap();

        let s = KpSeries::from_files(&[a, b]).unwrap();
        assert_eq!(s.len(), 16);
        assert_eq!(s.first().time, from_ymdh(2001, 3, 31, 0).unwrap());
        assert_eq!(s.last().time, from_ymdh(2001, 4, 1, 21).unwrap());
        assert_eq!(s.max_kp(), 3.0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = KpSeries::from_files(&["/nonexistent/kp.dat"]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kp.dat"));
    }
}
