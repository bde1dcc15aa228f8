use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use ytrack_types::{SeriesKey, WindowKind, YtrackError};

use super::{SeriesStore, write_atomic};
use crate::frame::{ColumnRegistry, DAY_COLUMN, Row, Series, TIME_COLUMN, Value};
use crate::timeseries::infer::estimate_step_seconds;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
const CLOCK_FORMAT: &str = "%H:%M";

/// One CSV table per series in a directory, named by
/// [`SeriesKey::file_name`].
///
/// Columns are `datetime(UTC)`, `day`, the window's derived columns
/// (`start`/`end` for hourly series, `time unit` otherwise), then the
/// dynamic columns in schema order. Derived columns are recomputed on write.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Store rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the tables.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the table for `key`.
    #[must_use]
    pub fn path_for(&self, key: &SeriesKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

fn leading_columns(window: WindowKind) -> Vec<&'static str> {
    let mut cols = vec![TIME_COLUMN, DAY_COLUMN];
    cols.extend_from_slice(window.derived_columns());
    cols
}

fn derived_cells(window: WindowKind, index: usize, row: &Row, step: TimeDelta) -> Vec<String> {
    match window {
        WindowKind::Hourly => vec![
            row.ts.format(CLOCK_FORMAT).to_string(),
            (row.ts + step).format(CLOCK_FORMAT).to_string(),
        ],
        _ => vec![index.to_string()],
    }
}

fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, TS_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn read_table(path: &Path, key: &SeriesKey) -> Result<Series, YtrackError> {
    let corrupt = |msg: String| YtrackError::corrupt(path, msg);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| YtrackError::io(path, e))?;

    let header = reader.headers().map_err(|e| corrupt(e.to_string()))?.clone();
    let leading = leading_columns(key.window);
    let got: Vec<&str> = header.iter().take(leading.len()).collect();
    if got != leading {
        return Err(corrupt(format!(
            "expected leading columns {leading:?}, found {got:?}"
        )));
    }
    let dynamic: Vec<&str> = header.iter().skip(leading.len()).collect();
    let mut seen = HashSet::new();
    if let Some(dup) = dynamic.iter().find(|c| !seen.insert(**c)) {
        return Err(corrupt(format!("duplicate column {dup:?}")));
    }
    let columns = ColumnRegistry::from_names(dynamic.iter().copied());

    let mut rows: Vec<Row> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| corrupt(e.to_string()))?;
        let raw_ts = record.get(0).unwrap_or_default();
        let ts = parse_ts(raw_ts)
            .ok_or_else(|| corrupt(format!("row {}: bad timestamp {raw_ts:?}", i + 1)))?;
        if let Some(prev) = rows.last() {
            if ts <= prev.ts {
                return Err(corrupt(format!(
                    "row {}: {ts} does not follow {}",
                    i + 1,
                    prev.ts
                )));
            }
        }
        let cells = record
            .iter()
            .skip(leading.len())
            .map(Value::parse_cell)
            .collect();
        rows.push(Row { ts, cells });
    }

    let stamps: Vec<DateTime<Utc>> = rows.iter().map(|r| r.ts).collect();
    let granularity = estimate_step_seconds(&stamps)
        .map_or_else(|| TimeDelta::hours(1), TimeDelta::seconds);
    let mut series = Series {
        key: key.clone(),
        granularity,
        columns,
        rows,
    };
    series.pad_rows();
    Ok(series)
}

fn write_table<W: io::Write>(out: W, series: &Series, path: &Path) -> Result<(), YtrackError> {
    let to_io = |e: csv::Error| YtrackError::io(path, e);
    let mut w = csv::Writer::from_writer(out);
    let mut header: Vec<&str> = leading_columns(series.key.window);
    header.extend(series.columns.names());
    w.write_record(&header).map_err(to_io)?;

    let width = series.columns.len();
    for (i, row) in series.rows.iter().enumerate() {
        let mut record = vec![row.ts.format(TS_FORMAT).to_string(), row.weekday()];
        record.extend(derived_cells(series.key.window, i, row, series.granularity));
        record.extend((0..width).map(|c| {
            row.cells
                .get(c)
                .and_then(Option::as_ref)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
        w.write_record(&record).map_err(to_io)?;
    }
    w.flush().map_err(|e| YtrackError::io(path, e))
}

impl SeriesStore for CsvStore {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "ytrack::store::load", skip(self), fields(key = %key))
    )]
    fn load(&self, key: &SeriesKey) -> Result<Option<Series>, YtrackError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        read_table(&path, key).map(Some)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ytrack::store::store",
            skip(self, series),
            fields(key = %series.key, rows = series.len())
        )
    )]
    fn store(&self, series: &Series) -> Result<(), YtrackError> {
        let path = self.path_for(&series.key);
        write_atomic(&path, |file| write_table(file, series, &path))?;
        #[cfg(feature = "tracing")]
        tracing::info!(path = %path.display(), rows = series.len(), "written series");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl io::Write for Refusing {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_name_the_full_table_path() {
        let key = SeriesKey::hourly_channel("UCfull");
        let mut series = Series::new(key, TimeDelta::hours(1));
        series.columns.intern("views");
        let path = Path::new("/var/lib/ytrack/data/Hourly_UCfull.csv");
        let err = write_table(Refusing, &series, path).unwrap_err();
        match err {
            YtrackError::Io { path: reported, msg } => {
                assert_eq!(reported, path.display().to_string());
                assert!(msg.contains("disk full"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
