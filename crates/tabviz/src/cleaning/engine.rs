//! Cleaning engine that applies a policy to a copy of a dataset.

use log::{debug, info};

use crate::dataset::{Column, ColumnKind, Dataset, Value, parse_datetime, parse_number};
use crate::error::{Result, TabvizError};
use crate::profile::NumericStatistics;
use crate::profile::stats::{quantile_sorted, sorted};

use super::policy::{CleaningPolicy, MissingPolicy, OutlierPolicy};
use super::summary::{CleaningResult, CleaningSummary};

/// Engine for applying cleaning policies.
pub struct Cleaner;

impl Cleaner {
    /// Create a new cleaner.
    pub fn new() -> Self {
        Self
    }

    /// Apply a policy and return the cleansed copy; the input is never modified.
    ///
    /// Outliers are detected on the input and removed first, then the
    /// missing-value policy runs on the remaining rows.
    pub fn apply(&self, dataset: &Dataset, policy: &CleaningPolicy) -> Result<CleaningResult> {
        let targets = resolve_targets(dataset, policy)?;
        validate_outlier_policy(&policy.outliers)?;
        let constants = match &policy.missing {
            MissingPolicy::FillConstant { value } => Some(parse_constants(dataset, &targets, value)?),
            _ => None,
        };

        let mut summary = CleaningSummary::new(dataset.row_count());

        let keep = self.outlier_rows(dataset, &targets, &policy.outliers, &mut summary);
        let mut columns = dataset.select_rows(&keep).into_columns();
        summary.rows_dropped_outliers = dataset.row_count() - keep.len();

        match &policy.missing {
            MissingPolicy::Keep => {}
            MissingPolicy::DropRows => {
                let before = columns.first().map(Column::len).unwrap_or(0);
                let rows: Vec<usize> = (0..before)
                    .filter(|&row| {
                        targets
                            .iter()
                            .all(|&idx| !columns[idx].values[row].is_missing())
                    })
                    .collect();
                for &idx in &targets {
                    let dropped = columns[idx].missing_count();
                    summary.add_change(&columns[idx].name, "missing values dropped", dropped);
                }
                columns = Dataset::new(columns)?.select_rows(&rows).into_columns();
                summary.rows_dropped_missing = before - rows.len();
            }
            MissingPolicy::FillMean | MissingPolicy::FillMedian => {
                for &idx in &targets {
                    let column = &mut columns[idx];
                    if !column.kind.is_numeric() {
                        summary.skip(&column.name);
                        continue;
                    }
                    let Some(fill) = central_value(column, &policy.missing) else {
                        if column.missing_count() > 0 {
                            summary.skip(&column.name);
                        }
                        continue;
                    };
                    let filled = fill_missing(column, &Value::Number(fill));
                    summary.values_filled += filled;
                    summary.add_change(&column.name, policy.missing.description(), filled);
                }
            }
            MissingPolicy::FillConstant { .. } => {
                for (&idx, value) in targets.iter().zip(constants.unwrap_or_default()) {
                    let column = &mut columns[idx];
                    let filled = fill_missing(column, &value);
                    summary.values_filled += filled;
                    summary.add_change(&column.name, policy.missing.description(), filled);
                }
            }
        }

        let dataset = Dataset::new(columns)?;
        summary.rows_after = dataset.row_count();

        info!(
            "Cleaned dataset: {} -> {} rows ({} dropped for outliers, {} for missing values, {} values filled)",
            summary.rows_before,
            summary.rows_after,
            summary.rows_dropped_outliers,
            summary.rows_dropped_missing,
            summary.values_filled
        );

        Ok(CleaningResult { dataset, summary })
    }

    /// Row indices that survive outlier removal, in source order.
    fn outlier_rows(
        &self,
        dataset: &Dataset,
        targets: &[usize],
        policy: &OutlierPolicy,
        summary: &mut CleaningSummary,
    ) -> Vec<usize> {
        let mut flagged = vec![false; dataset.row_count()];

        if *policy != OutlierPolicy::None {
            for &idx in targets {
                let column = &dataset.columns()[idx];
                if !column.kind.is_numeric() {
                    continue;
                }
                let Some(stats) = NumericStatistics::from_values(&column.present_numbers()) else {
                    continue;
                };

                let mut count = 0;
                for (row, value) in column.values.iter().enumerate() {
                    let Some(v) = value.as_number() else {
                        continue;
                    };
                    let outlier = match policy {
                        OutlierPolicy::None => false,
                        OutlierPolicy::ZScore { threshold } => stats.z_score(v).abs() > *threshold,
                        OutlierPolicy::Iqr { multiplier } => stats.is_outlier_iqr(v, *multiplier),
                    };
                    if outlier {
                        flagged[row] = true;
                        count += 1;
                    }
                }
                debug!("Column '{}': {} outliers", column.name, count);
                summary.add_change(&column.name, policy.description(), count);
            }
        }

        flagged
            .iter()
            .enumerate()
            .filter(|(_, f)| !**f)
            .map(|(row, _)| row)
            .collect()
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of the targeted columns, in dataset order.
fn resolve_targets(dataset: &Dataset, policy: &CleaningPolicy) -> Result<Vec<usize>> {
    match &policy.columns {
        None => Ok((0..dataset.column_count()).collect()),
        Some(names) => {
            let mut targets = Vec::with_capacity(names.len());
            for name in names {
                let idx = dataset
                    .column_index(name)
                    .ok_or_else(|| TabvizError::InvalidPolicy {
                        column: name.clone(),
                        reason: "no such column".to_string(),
                    })?;
                if !targets.contains(&idx) {
                    targets.push(idx);
                }
            }
            targets.sort_unstable();
            Ok(targets)
        }
    }
}

fn validate_outlier_policy(policy: &OutlierPolicy) -> Result<()> {
    let (name, value) = match policy {
        OutlierPolicy::None => return Ok(()),
        OutlierPolicy::ZScore { threshold } => ("z-score threshold", *threshold),
        OutlierPolicy::Iqr { multiplier } => ("IQR multiplier", *multiplier),
    };
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TabvizError::InvalidPolicy {
            column: "*".to_string(),
            reason: format!("{} must be a positive number, got {}", name, value),
        })
    }
}

/// Parse the fill constant once per targeted column, following the column kind.
fn parse_constants(dataset: &Dataset, targets: &[usize], raw: &str) -> Result<Vec<Value>> {
    targets
        .iter()
        .map(|&idx| {
            let column = &dataset.columns()[idx];
            let parsed = match column.kind {
                ColumnKind::Numeric => parse_number(raw).map(Value::Number),
                ColumnKind::DateTime => parse_datetime(raw).map(Value::DateTime),
                ColumnKind::Categorical | ColumnKind::Text => Some(Value::Text(raw.to_string())),
            };
            parsed.ok_or_else(|| TabvizError::InvalidPolicy {
                column: column.name.clone(),
                reason: format!("'{}' is not a valid {} value", raw, column.kind),
            })
        })
        .collect()
}

fn central_value(column: &Column, policy: &MissingPolicy) -> Option<f64> {
    let values = column.present_numbers();
    match policy {
        MissingPolicy::FillMean => NumericStatistics::from_values(&values).map(|s| s.mean),
        MissingPolicy::FillMedian if !values.is_empty() => {
            Some(quantile_sorted(&sorted(&values), 0.5))
        }
        _ => None,
    }
}

fn fill_missing(column: &mut Column, fill: &Value) -> usize {
    let mut filled = 0;
    for value in column.values.iter_mut().filter(|v| v.is_missing()) {
        *value = fill.clone();
        filled += 1;
    }
    filled
}
