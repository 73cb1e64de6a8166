//! Scales, ticks, binning, and kernel density estimation.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::dataset::format_number;
use crate::profile::stats::{quantile_sorted, sample_std, sorted};

/// Maps a continuous data interval onto a logical-unit interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    /// A scale over `domain`; a zero-width domain is widened around its value.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut lo, mut hi) = domain;
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        if hi < lo {
            std::mem::swap(&mut lo, &mut hi);
        }
        if hi - lo == 0.0 {
            let pad = if lo == 0.0 { 0.5 } else { lo.abs() * 0.1 };
            lo -= pad;
            hi += pad;
        }
        Self {
            domain: (lo, hi),
            range,
        }
    }

    /// Domain of `values` with a fractional margin on each side.
    pub fn padded(values: impl IntoIterator<Item = f64>, margin: f64, range: (f64, f64)) -> Self {
        let (lo, hi) = extent(values).unwrap_or((0.0, 1.0));
        let pad = (hi - lo) * margin;
        Self::new((lo - pad, hi + pad), range)
    }

    /// Widen the domain so it contains `value`.
    pub fn including(self, value: f64) -> Self {
        Self::new(
            (self.domain.0.min(value), self.domain.1.max(value)),
            self.range,
        )
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick positions inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Evenly spaced bands for categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    pub categories: Vec<String>,
    pub range: (f64, f64),
    /// Fraction of each band left empty.
    pub padding: f64,
}

impl BandScale {
    pub fn new(categories: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self {
            categories,
            range,
            padding: padding.clamp(0.0, 0.9),
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn step(&self) -> f64 {
        (self.range.1 - self.range.0) / self.categories.len().max(1) as f64
    }

    /// Width of the drawn part of a band.
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start of the drawn part of band `index`.
    pub fn start(&self, index: usize) -> f64 {
        self.range.0 + self.step() * index as f64 + self.step() * self.padding / 2.0
    }

    pub fn center(&self, index: usize) -> f64 {
        self.range.0 + self.step() * (index as f64 + 0.5)
    }

    /// Position of a fractional category coordinate.
    pub fn map(&self, position: f64) -> f64 {
        self.range.0 + self.step() * (position + 0.5)
    }
}

/// Min and max of the finite values.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Tick step of 1, 2 or 5 times a power of ten giving roughly `count` ticks.
pub fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of a nice step lying within `[lo, hi]`.
pub fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    let step = nice_step(hi - lo, count);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    let decimals = (-step.log10().floor()).max(0.0) as i32;
    let snap = 10f64.powi(decimals);
    (first..=last)
        .map(|i| (i as f64 * step * snap).round() / snap)
        .collect()
}

/// Tick label for a numeric axis value.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1e6 || (value != 0.0 && value.abs() < 1e-3) {
        format!("{:.1e}", value)
    } else if value.fract() == 0.0 {
        format_number(value)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Tick label for a datetime axis value (seconds since the Unix epoch).
pub fn format_time_tick(seconds: f64, span: f64) -> String {
    let Some(dt) = DateTime::from_timestamp(seconds.round() as i64, 0) else {
        return format_tick(seconds);
    };
    let format = if span < 2.0 * 86_400.0 {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    dt.naive_utc().format(format).to_string()
}

/// Upper limit on bins per axis; larger requests are clamped.
pub const MAX_BINS: usize = 1_000;

/// How many bins a histogram uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinPolicy {
    /// `ceil(log2 n) + 1` bins.
    #[default]
    Sturges,
    Fixed(usize),
}

impl BinPolicy {
    /// Number of bins for `n` values, between 1 and [`MAX_BINS`].
    pub fn bin_count(&self, n: usize) -> usize {
        let k = match self {
            BinPolicy::Sturges => {
                if n <= 1 {
                    1
                } else {
                    (n as f64).log2().ceil() as usize + 1
                }
            }
            BinPolicy::Fixed(k) => *k,
        };
        k.clamp(1, MAX_BINS)
    }
}

/// One histogram bin, `[start, end)` except the last, which is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width edges spanning `[lo, hi]`; a zero-width span is widened.
pub fn bin_edges(lo: f64, hi: f64, bins: usize) -> (f64, f64) {
    if hi > lo {
        (lo, (hi - lo) / bins as f64)
    } else {
        (lo - 0.5, 1.0 / bins as f64)
    }
}

/// Bin index of `value` given the first edge and bin width.
pub fn bin_index(value: f64, start: f64, width: f64, bins: usize) -> usize {
    let idx = ((value - start) / width).floor();
    if idx < 0.0 { 0 } else { (idx as usize).min(bins - 1) }
}

/// Count values into `bins` equal-width bins over their range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    match extent(values.iter().copied()) {
        Some(range) => histogram_over(values, range, bins),
        None => Vec::new(),
    }
}

/// Count values into `bins` equal-width bins spanning `range`.
///
/// Values outside the range land in the first or last bin.
pub fn histogram_over(values: &[f64], range: (f64, f64), bins: usize) -> Vec<Bin> {
    let bins = bins.max(1);
    let (start, width) = bin_edges(range.0, range.1, bins);

    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        counts[bin_index(v, start, width, bins)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: start + width * i as f64,
            end: start + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Silverman's rule-of-thumb bandwidth.
///
/// Falls back to a unit-scale bandwidth when the values have no spread.
pub fn silverman_bandwidth(values: &[f64]) -> f64 {
    let n = values.len();
    let std = sample_std(values).unwrap_or(0.0);
    let s = sorted(values);
    let iqr = if n > 0 {
        (quantile_sorted(&s, 0.75) - quantile_sorted(&s, 0.25)) / 1.34
    } else {
        0.0
    };

    let spread = match (std > 0.0, iqr > 0.0) {
        (true, true) => std.min(iqr),
        (true, false) => std,
        (false, true) => iqr,
        (false, false) => {
            let center = s.first().copied().unwrap_or(0.0).abs();
            return if center > 0.0 { center * 0.1 } else { 1.0 };
        }
    };
    0.9 * spread * (n as f64).powf(-0.2)
}

/// Gaussian kernel density estimate evaluated at each grid point.
pub fn kde(values: &[f64], bandwidth: f64, grid: &[f64]) -> Vec<f64> {
    if values.is_empty() || bandwidth <= 0.0 {
        return vec![0.0; grid.len()];
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|&x| {
            values
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect()
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_map() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(scale.map(0.0), 100.0);
        assert_eq!(scale.map(10.0), 0.0);
        assert_eq!(scale.map(5.0), 50.0);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 1.0));
        assert!(scale.domain.0 < 3.0 && scale.domain.1 > 3.0);
        assert!((scale.map(3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.05, 0.95, 8), vec![0.2, 0.4, 0.6, 0.8]);
    }

    #[test]
    fn test_sturges() {
        assert_eq!(BinPolicy::Sturges.bin_count(1), 1);
        assert_eq!(BinPolicy::Sturges.bin_count(8), 4);
        assert_eq!(BinPolicy::Sturges.bin_count(100), 8);
        assert_eq!(BinPolicy::Fixed(0).bin_count(100), 1);
        assert_eq!(BinPolicy::Fixed(100_000).bin_count(10), MAX_BINS);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 10.0];
        let bins = histogram(&values, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[2].count, 1);
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[2].end, 10.0);
    }

    #[test]
    fn test_histogram_over_shared_range() {
        let bins = histogram_over(&[0.5, 1.5], (0.0, 10.0), 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 10.0);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].width(), 2.0);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = histogram(&[5.0, 5.0], 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [1.0, 2.0, 2.0, 3.0, 7.0];
        let h = silverman_bandwidth(&values);
        assert!(h > 0.0);
        let grid = linspace(-20.0, 30.0, 2001);
        let density = kde(&values, h, &grid);
        let dx = grid[1] - grid[0];
        let area: f64 = density.iter().sum::<f64>() * dx;
        assert!((area - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_scale() {
        let band = BandScale::new(vec!["a".into(), "b".into()], (0.0, 100.0), 0.2);
        assert_eq!(band.center(0), 25.0);
        assert_eq!(band.center(1), 75.0);
        assert!((band.bandwidth() - 40.0).abs() < 1e-12);
        assert!((band.start(0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(2_500_000.0), "2.5e6");
    }
}
