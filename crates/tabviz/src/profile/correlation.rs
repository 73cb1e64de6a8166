//! Pairwise correlation over numeric columns.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

use super::stats::ranks;

/// Correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

impl std::str::FromStr for CorrelationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            _ => Err(format!("Unknown correlation method: {}", s)),
        }
    }
}

/// Square correlation matrix; undefined cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Upper-triangle pairs whose absolute coefficient exceeds `threshold`.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<StrongCorrelation> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(r) = self.values[i][j] {
                    if r.abs() > threshold {
                        pairs.push(StrongCorrelation {
                            first: self.columns[i].clone(),
                            second: self.columns[j].clone(),
                            coefficient: r,
                        });
                    }
                }
            }
        }
        pairs
    }
}

/// A pair of columns with a large absolute correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrongCorrelation {
    pub first: String,
    pub second: String,
    pub coefficient: f64,
}

/// Compute the correlation matrix of every numeric column.
pub fn correlation_matrix(dataset: &Dataset, method: CorrelationMethod) -> CorrelationMatrix {
    let columns: Vec<_> = dataset
        .columns()
        .iter()
        .filter(|c| c.kind.is_numeric())
        .collect();
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| c.values.iter().map(|v| v.as_number()).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pairwise(&series[i], &series[j], method);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        method,
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

/// Coefficient over the rows where both values are present.
pub fn pairwise(a: &[Option<f64>], b: &[Option<f64>], method: CorrelationMethod) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if xs.len() < 2 {
        return None;
    }

    match method {
        CorrelationMethod::Pearson => pearson(&xs, &ys),
        CorrelationMethod::Spearman => pearson(&ranks(&xs), &ranks(&ys)),
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    // A rounded mean leaves a tiny non-zero variance on constant input.
    if is_constant(xs) || is_constant(ys) {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}
