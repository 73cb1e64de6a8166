//! Declarative cleaning rules.

use serde::{Deserialize, Serialize};

/// What to do with missing cells in the targeted columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Leave missing cells alone.
    #[default]
    Keep,
    /// Drop every row with a missing cell in a targeted column.
    #[serde(rename = "drop-missing-rows")]
    DropRows,
    /// Replace missing numeric cells with the column mean.
    FillMean,
    /// Replace missing numeric cells with the column median.
    FillMedian,
    /// Replace missing cells with a constant parsed into the column's kind.
    FillConstant { value: String },
}

impl MissingPolicy {
    pub fn description(&self) -> String {
        match self {
            MissingPolicy::Keep => "keep missing values".to_string(),
            MissingPolicy::DropRows => "drop rows with missing values".to_string(),
            MissingPolicy::FillMean => "fill missing values with the mean".to_string(),
            MissingPolicy::FillMedian => "fill missing values with the median".to_string(),
            MissingPolicy::FillConstant { value } => {
                format!("fill missing values with '{}'", value)
            }
        }
    }
}

/// How to detect outliers in targeted numeric columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum OutlierPolicy {
    #[default]
    None,
    /// Values whose absolute z-score exceeds `threshold`.
    ZScore { threshold: f64 },
    /// Values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
    Iqr { multiplier: f64 },
}

impl OutlierPolicy {
    pub fn description(&self) -> String {
        match self {
            OutlierPolicy::None => "keep outliers".to_string(),
            OutlierPolicy::ZScore { threshold } => {
                format!("drop rows with |z| > {}", threshold)
            }
            OutlierPolicy::Iqr { multiplier } => {
                format!("drop rows outside {} x IQR", multiplier)
            }
        }
    }
}

/// A full cleaning request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningPolicy {
    pub missing: MissingPolicy,
    pub outliers: OutlierPolicy,
    /// Columns the policy applies to (None = all columns).
    pub columns: Option<Vec<String>>,
}

impl CleaningPolicy {
    pub fn new(missing: MissingPolicy, outliers: OutlierPolicy) -> Self {
        Self {
            missing,
            outliers,
            columns: None,
        }
    }

    /// Restrict the policy to the named columns.
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_json() {
        let json = r#"{
            "missing": {"method": "fill-constant", "value": "0"},
            "outliers": {"method": "iqr", "multiplier": 1.5},
            "columns": ["revenue"]
        }"#;
        let policy: CleaningPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy.missing,
            MissingPolicy::FillConstant {
                value: "0".to_string()
            }
        );
        assert_eq!(policy.outliers, OutlierPolicy::Iqr { multiplier: 1.5 });
        assert_eq!(policy.columns, Some(vec!["revenue".to_string()]));
    }

    #[test]
    fn test_defaults() {
        let policy: CleaningPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, CleaningPolicy::default());
        assert_eq!(policy.missing, MissingPolicy::Keep);

        let drop: MissingPolicy = serde_json::from_str(r#"{"method": "drop-missing-rows"}"#).unwrap();
        assert_eq!(drop, MissingPolicy::DropRows);
    }
}
