// src/extractors/records.rs
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A time period on a section's axis: a fiscal year, or a month label such as `Sep-23`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Period {
    Year(i32),
    Label(String),
}

impl Period {
    /// Chronological key; month labels are parsed back from their `%b-%y` form.
    /// Labels that do not parse sort after everything else.
    fn chrono_key(&self) -> (i32, u32) {
        match self {
            Period::Year(y) => (*y, 0),
            Period::Label(label) => NaiveDate::parse_from_str(&format!("01-{}", label), "%d-%b-%y")
                .map(|d| (d.year(), d.month()))
                .unwrap_or((i32::MAX, u32::MAX)),
        }
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chrono_key()
            .cmp(&other.chrono_key())
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(y) => write!(f, "{}", y),
            Period::Label(label) => f.write_str(label),
        }
    }
}

/// Period labels in source column order (not necessarily chronological).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeAxis {
    periods: Vec<Period>,
}

impl TimeAxis {
    pub fn new(periods: Vec<Period>) -> Self {
        Self { periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }
}

/// One (metric, period, value) triple of a long-format table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub metric: String,
    pub period: Period,
    pub value: f64,
}

impl LongRecord {
    pub fn new(metric: impl Into<String>, period: Period, value: f64) -> Self {
        Self {
            metric: metric.into(),
            period,
            value,
        }
    }
}
