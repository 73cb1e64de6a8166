//! Numeric summary statistics.

use serde::{Deserialize, Serialize};

// Welford's online algorithm for computing mean and variance in a single pass.

/// Streaming statistics accumulator using Welford's algorithm.
#[derive(Debug, Clone)]
pub struct StreamingStats {
    count: usize,
    mean: f64,
    m2: f64, // Sum of squared differences from mean
    min: f64,
    max: f64,
    sum: f64,
}

impl StreamingStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }

    /// Add a value using Welford's online algorithm.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample variance (n - 1 denominator); undefined below two values.
    pub fn variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    /// Sample standard deviation.
    pub fn std(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

impl Default for StreamingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f64> for StreamingStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
    /// Sample variance; `None` with fewer than two values.
    pub variance: Option<f64>,
    pub std: Option<f64>,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericStatistics {
    /// Summarize a slice of finite values; `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut stats = StreamingStats::new();
        stats.extend(values.iter().copied());

        let sorted = sorted(values);
        Some(Self {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            sum: stats.sum,
            variance: stats.variance(),
            std: stats.std(),
            median: quantile_sorted(&sorted, 0.5),
            q1: quantile_sorted(&sorted, 0.25),
            q3: quantile_sorted(&sorted, 0.75),
        })
    }

    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Lower and upper IQR fences.
    pub fn iqr_bounds(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }

    /// Check if a value is an outlier using the IQR method.
    pub fn is_outlier_iqr(&self, value: f64, multiplier: f64) -> bool {
        let (lower, upper) = self.iqr_bounds(multiplier);
        value < lower || value > upper
    }

    /// Calculate the z-score for a value (0 when the spread is zero or undefined).
    pub fn z_score(&self, value: f64) -> f64 {
        match self.std {
            Some(std) if std > 0.0 => (value - self.mean) / std,
            _ => 0.0,
        }
    }
}

/// Sort a copy of the values in ascending order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Linearly interpolated quantile of already sorted values, `q` in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Sample standard deviation of a slice.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let mut stats = StreamingStats::new();
    stats.extend(values.iter().copied());
    stats.std()
}

/// Average ranks (1-based); ties share the mean of their positions.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_welford_matches_two_pass() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = NumericStatistics::from_values(&values).unwrap();

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

        assert!(approx(stats.mean, 5.0));
        assert!(approx(stats.variance.unwrap(), var));
        assert!(approx(stats.sum, 40.0));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_quantiles_interpolate() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let stats = NumericStatistics::from_values(&values).unwrap();
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.q1, 1.75));
        assert!(approx(stats.q3, 3.25));
    }

    #[test]
    fn test_single_value() {
        let stats = NumericStatistics::from_values(&[3.0]).unwrap();
        assert_eq!(stats.variance, None);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.z_score(10.0), 0.0);
        assert!(NumericStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn test_iqr_outlier() {
        let stats = NumericStatistics::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert!(stats.is_outlier_iqr(100.0, 1.5));
        assert!(!stats.is_outlier_iqr(3.0, 1.5));
    }

    #[test]
    fn test_ranks_with_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }
}
