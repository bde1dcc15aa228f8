use chrono::{DateTime, Utc};
use ytrack_types::{MergeReport, YtrackError};

use super::infer::ensure_ascending;
use crate::frame::{Row, Series};

fn timestamps(rows: &[Row]) -> Vec<DateTime<Utc>> {
    rows.iter().map(|r| r.ts).collect()
}

fn ensure_same_key(persisted: &Series, incoming: &Series) -> Result<(), YtrackError> {
    if persisted.key != incoming.key {
        return Err(YtrackError::identity_mismatch(&persisted.key, &incoming.key));
    }
    Ok(())
}

fn create(mut incoming: Series) -> (Series, MergeReport) {
    let report = if incoming.is_empty() {
        MergeReport::default()
    } else {
        MergeReport {
            created: true,
            appended: incoming.len(),
            new_columns: incoming.columns.names().map(str::to_string).collect(),
            ..MergeReport::default()
        }
    };
    incoming.pad_rows();
    (incoming, report)
}

/// Merge freshly parsed rows into a persisted series.
///
/// - No persisted series: the incoming rows become the series.
/// - Empty incoming: the persisted series is returned unchanged.
/// - Gap (`incoming[0] > last + granularity`): placeholder rows marked
///   missing fill every skipped step before the incoming rows.
/// - Otherwise incoming rows at or before the last persisted timestamp are
///   dropped as duplicates.
///
/// The schema is the order-stable union of both sides: persisted columns keep
/// their positions and unseen columns are appended. When every incoming row
/// is a duplicate, `persisted` is returned untouched, including its schema.
///
/// # Errors
/// - `UnsortedInput` if incoming rows are not strictly ascending.
/// - `IdentityMismatch` if the two sides have different keys or granularities.
pub fn reconcile(
    persisted: Option<Series>,
    incoming: Series,
) -> Result<(Series, MergeReport), YtrackError> {
    ensure_ascending(&timestamps(&incoming.rows))?;
    let Some(mut merged) = persisted else {
        return Ok(create(incoming));
    };
    ensure_same_key(&merged, &incoming)?;
    if merged.granularity != incoming.granularity {
        return Err(YtrackError::identity_mismatch(
            format!("{} every {}s", merged.key, merged.granularity.num_seconds()),
            format!("{} every {}s", incoming.key, incoming.granularity.num_seconds()),
        ));
    }
    if incoming.is_empty() {
        return Ok((merged, MergeReport::default()));
    }

    let step = merged.granularity;
    let last = merged.last_ts();
    let gap_from = last.filter(|l| incoming.rows.first().is_some_and(|r| r.ts > *l + step));
    let skipped = match (last, gap_from) {
        (Some(l), None) => incoming.rows.iter().take_while(|r| r.ts <= l).count(),
        _ => 0,
    };
    if gap_from.is_none() && skipped == incoming.len() {
        let report = MergeReport {
            skipped,
            ..MergeReport::default()
        };
        return Ok((merged, report));
    }

    let (remap, new_columns) = merged.columns.absorb(&incoming.columns);
    let width = merged.columns.len();
    let mut report = MergeReport {
        new_columns,
        skipped,
        ..MergeReport::default()
    };
    if let (Some(last), Some(first)) = (gap_from, incoming.rows.first().map(|r| r.ts)) {
        let mut ts = last + step;
        while ts < first {
            let placeholder = merged.placeholder_row(ts);
            merged.rows.push(placeholder);
            report.placeholders += 1;
            ts += step;
        }
    }
    for row in incoming.rows.into_iter().skip(skipped) {
        merged.rows.push(row.remapped(&remap, width));
        report.appended += 1;
    }
    merged.pad_rows();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        key = %merged.key,
        appended = report.appended,
        placeholders = report.placeholders,
        skipped = report.skipped,
        "reconciled series"
    );
    Ok((merged, report))
}

/// Replace a persisted series with a complete newer window.
///
/// Used for windows that are served whole on every scrape. Persisted column
/// order is kept and new columns are appended. An incoming window shorter
/// than what is persisted is refused as a no-op, as is one identical to it.
/// Granularity may differ: the window coarsens as the video ages.
///
/// # Errors
/// - `UnsortedInput` if incoming rows are not strictly ascending.
/// - `IdentityMismatch` if the keys differ.
pub fn replace(
    persisted: Option<Series>,
    incoming: Series,
) -> Result<(Series, MergeReport), YtrackError> {
    ensure_ascending(&timestamps(&incoming.rows))?;
    let Some(prior) = persisted else {
        return Ok(create(incoming));
    };
    ensure_same_key(&prior, &incoming)?;
    if incoming.len() < prior.len() {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            key = %prior.key,
            persisted = prior.len(),
            incoming = incoming.len(),
            "incoming window is shorter than persisted; keeping persisted rows"
        );
        let report = MergeReport {
            skipped: incoming.len(),
            ..MergeReport::default()
        };
        return Ok((prior, report));
    }

    let mut columns = prior.columns.clone();
    let (remap, new_columns) = columns.absorb(&incoming.columns);
    let width = columns.len();
    let rows: Vec<Row> = incoming
        .rows
        .into_iter()
        .map(|r| r.remapped(&remap, width))
        .collect();

    let mut padded_prior = prior.rows.clone();
    for r in &mut padded_prior {
        r.pad_to(width);
    }
    if new_columns.is_empty() && rows == padded_prior && incoming.granularity == prior.granularity {
        let report = MergeReport {
            skipped: rows.len(),
            ..MergeReport::default()
        };
        return Ok((prior, report));
    }

    let last = prior.last_ts();
    let report = MergeReport {
        appended: rows
            .iter()
            .filter(|r| last.is_none_or(|l| r.ts > l))
            .count(),
        new_columns,
        replaced: true,
        ..MergeReport::default()
    };
    let replaced = Series {
        key: prior.key,
        granularity: incoming.granularity,
        columns,
        rows,
    };
    Ok((replaced, report))
}

/// Reconcile or replace depending on the series window.
///
/// # Errors
/// See [`reconcile`] and [`replace`].
pub fn merge_series(
    persisted: Option<Series>,
    incoming: Series,
) -> Result<(Series, MergeReport), YtrackError> {
    if incoming.key.window.replaces_history() {
        replace(persisted, incoming)
    } else {
        reconcile(persisted, incoming)
    }
}
