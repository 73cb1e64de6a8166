//! Property-based tests for loading, profiling, cleaning and rendering.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p tabviz --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p tabviz --test property_tests
//! ```

use std::io::Write;

use proptest::prelude::*;

use tabviz::chart::{ChartKind, ChartSpecBuilder};
use tabviz::dataset::{Column, Dataset};
use tabviz::profile::stats::{quantile_sorted, sorted};
use tabviz::render::scale::{BinPolicy, histogram, nice_ticks};
use tabviz::render::{ExportOptions, RenderConfig, render};
use tabviz::{CleaningPolicy, MissingPolicy, OutlierPolicy, Profiler, Tabviz};

// =============================================================================
// Test Strategies
// =============================================================================

/// Numeric cells with roughly one in five missing.
fn numeric_cells(len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -1.0e6..1.0e6f64), len)
}

/// Two equal-length numeric columns.
fn numeric_dataset() -> impl Strategy<Value = Dataset> {
    (1usize..60).prop_flat_map(|len| {
        (numeric_cells(len), numeric_cells(len)).prop_map(|(a, b)| {
            Dataset::new(vec![Column::numeric("a", a), Column::numeric("b", b)])
                .expect("equal-length columns")
        })
    })
}

/// Arbitrary delimited-looking text.
fn delimited_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9,;\t\"\n .-]{0,400}",
        prop::collection::vec("[a-z0-9.]{0,8}(,[a-z0-9.]{0,8}){0,4}", 0..20)
            .prop_map(|lines| lines.join("\n")),
    ]
}

// =============================================================================
// Loader
// =============================================================================

proptest! {
    #[test]
    fn loader_never_panics_on_text(content in delimited_text()) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let _ = Tabviz::new().load(file.path());
    }

    #[test]
    fn loader_never_panics_on_bytes(bytes in prop::collection::vec(any::<u8>(), 0..400)) {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        let _ = Tabviz::new().load(file.path());
    }

    #[test]
    fn loaded_columns_have_equal_length(content in delimited_text()) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        if let Ok((data, source)) = Tabviz::new().load(file.path()) {
            prop_assert_eq!(source.row_count, data.row_count());
            for column in data.columns() {
                prop_assert_eq!(column.len(), data.row_count());
            }
        }
    }
}

// =============================================================================
// Profiling
// =============================================================================

proptest! {
    #[test]
    fn profile_mean_matches_direct_sum(data in numeric_dataset()) {
        let profile = Profiler::new().profile(&data);
        let values = data.column("a").unwrap().present_numbers();
        let stats = &profile.column("a").unwrap().numeric;

        if values.is_empty() {
            prop_assert!(stats.is_none());
        } else {
            let stats = stats.as_ref().unwrap();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            prop_assert!((stats.mean - mean).abs() <= 1e-6 * mean.abs().max(1.0));
            prop_assert!(stats.min <= stats.q1 && stats.q1 <= stats.median);
            prop_assert!(stats.median <= stats.q3 && stats.q3 <= stats.max);
        }
    }

    #[test]
    fn correlations_are_bounded(data in numeric_dataset()) {
        let profile = Profiler::new().profile(&data);
        for row in &profile.correlation.values {
            for r in row.iter().flatten() {
                prop_assert!((-1.0..=1.0).contains(r));
            }
        }
    }

    #[test]
    fn quantiles_are_monotone(values in prop::collection::vec(-1.0e3..1.0e3f64, 1..50)) {
        let s = sorted(&values);
        let mut last = f64::NEG_INFINITY;
        for q in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let v = quantile_sorted(&s, q);
            prop_assert!(v >= last);
            last = v;
        }
    }
}

// =============================================================================
// Cleaning
// =============================================================================

proptest! {
    #[test]
    fn drop_missing_rows_never_grows(data in numeric_dataset()) {
        let policy = CleaningPolicy::new(MissingPolicy::DropRows, OutlierPolicy::None)
            .with_columns(["a"]);
        let result = Tabviz::new().clean(&data, &policy).unwrap();

        prop_assert!(result.dataset.row_count() <= data.row_count());
        prop_assert_eq!(result.dataset.column("a").unwrap().missing_count(), 0);
        prop_assert_eq!(result.summary.rows_after, result.dataset.row_count());
        prop_assert_eq!(result.dataset.column_names(), data.column_names());
    }

    #[test]
    fn fill_mean_keeps_row_count(data in numeric_dataset()) {
        let policy = CleaningPolicy::new(MissingPolicy::FillMean, OutlierPolicy::None);
        let result = Tabviz::new().clean(&data, &policy).unwrap();
        prop_assert_eq!(result.dataset.row_count(), data.row_count());
    }

    #[test]
    fn outlier_removal_never_grows(data in numeric_dataset(), k in 0.5..3.0f64) {
        let policy = CleaningPolicy::new(MissingPolicy::Keep, OutlierPolicy::Iqr { multiplier: k });
        let result = Tabviz::new().clean(&data, &policy).unwrap();
        prop_assert!(result.dataset.row_count() <= data.row_count());
        prop_assert_eq!(
            result.summary.rows_before - result.summary.rows_dropped_outliers,
            result.dataset.row_count()
        );
    }
}

// =============================================================================
// Scales and rendering
// =============================================================================

proptest! {
    #[test]
    fn ticks_stay_inside_domain(lo in -1.0e6..1.0e6f64, span in 1.0e-3..1.0e6f64) {
        let hi = lo + span;
        let ticks = nice_ticks(lo, hi, 6);
        for pair in ticks.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        let tolerance = span * 1e-9 + lo.abs().max(hi.abs()) * 1e-12;
        for t in ticks {
            prop_assert!(t >= lo - tolerance && t <= hi + tolerance);
        }
    }

    #[test]
    fn histogram_counts_every_value(values in prop::collection::vec(-1.0e3..1.0e3f64, 1..200)) {
        let bins = BinPolicy::Sturges.bin_count(values.len());
        let total: usize = histogram(&values, bins).iter().map(|b| b.count).sum();
        prop_assert_eq!(total, values.len());
    }

    #[test]
    fn scatter_render_is_deterministic(data in numeric_dataset()) {
        let complete = data
            .column("a")
            .unwrap()
            .values
            .iter()
            .zip(&data.column("b").unwrap().values)
            .filter(|(a, b)| !a.is_missing() && !b.is_missing())
            .count();

        let request = ChartSpecBuilder::new(ChartKind::Scatter)
            .x("a")
            .y("b")
            .build(&data)
            .unwrap();
        let config = RenderConfig::default();

        match render(&request, &data, &config) {
            Ok(first) => {
                let second = render(&request, &data, &config).unwrap();
                prop_assert_eq!(first.point_count(), complete);
                let options = ExportOptions::default();
                prop_assert_eq!(first.to_svg(&options).unwrap(), second.to_svg(&options).unwrap());
                prop_assert_eq!(first, second);
            }
            Err(_) => prop_assert_eq!(complete, 0),
        }
    }
}
