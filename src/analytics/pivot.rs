// src/analytics/pivot.rs
use crate::extractors::records::{LongRecord, Period};
use std::collections::{BTreeMap, BTreeSet};

/// Metric x period view of a long table. Periods are kept in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    cells: BTreeMap<String, BTreeMap<Period, f64>>,
}

impl WideTable {
    /// Pivots long records to wide form. When a (metric, period) pair repeats,
    /// the first value wins and later ones are dropped.
    pub fn pivot(records: &[LongRecord]) -> Self {
        let mut cells: BTreeMap<String, BTreeMap<Period, f64>> = BTreeMap::new();
        let mut duplicates = 0usize;

        for record in records {
            let series = cells.entry(record.metric.clone()).or_default();
            if series.contains_key(&record.period) {
                duplicates += 1;
                continue;
            }
            series.insert(record.period.clone(), record.value);
        }

        if duplicates > 0 {
            tracing::warn!("Pivot kept the first of {} duplicate metric/period values", duplicates);
        }
        Self { cells }
    }

    pub fn value(&self, metric: &str, period: &Period) -> Option<f64> {
        self.cells.get(metric).and_then(|s| s.get(period)).copied()
    }

    /// All values of one metric, oldest period first.
    pub fn series(&self, metric: &str) -> Option<&BTreeMap<Period, f64>> {
        self.cells.get(metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Union of all periods, in chronological order.
    pub fn periods(&self) -> Vec<Period> {
        let all: BTreeSet<&Period> = self.cells.values().flat_map(|s| s.keys()).collect();
        all.into_iter().cloned().collect()
    }

    /// Back to long form; only populated cells are emitted.
    pub fn melt(&self) -> Vec<LongRecord> {
        self.cells
            .iter()
            .flat_map(|(metric, series)| {
                series
                    .iter()
                    .map(move |(period, value)| LongRecord::new(metric.clone(), period.clone(), *value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(r: &LongRecord) -> (String, String, u64) {
        (r.metric.clone(), r.period.to_string(), r.value.to_bits())
    }

    #[test]
    fn pivot_then_melt_preserves_triples() {
        let records = vec![
            LongRecord::new("Sales", Period::Year(2023), 120.0),
            LongRecord::new("Sales", Period::Year(2022), 100.0),
            LongRecord::new("Net profit", Period::Year(2023), 20.0),
            LongRecord::new("Interest", Period::Year(2021), -3.5),
        ];
        let wide = WideTable::pivot(&records);
        let melted = wide.melt();

        let mut expected: Vec<_> = records.iter().map(key).collect();
        let mut actual: Vec<_> = melted.iter().map(key).collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);

        // Pivoting the melted table again is a fixed point
        assert_eq!(WideTable::pivot(&melted), wide);
    }

    #[test]
    fn duplicate_pairs_keep_first_value() {
        let records = vec![
            LongRecord::new("Other Income", Period::Year(2023), 7.0),
            LongRecord::new("Other Income", Period::Year(2023), 9.0),
        ];
        let wide = WideTable::pivot(&records);
        assert_eq!(wide.value("Other Income", &Period::Year(2023)), Some(7.0));
        assert_eq!(wide.melt().len(), 1);
    }

    #[test]
    fn periods_are_sorted_union() {
        let records = vec![
            LongRecord::new("A", Period::Year(2024), 1.0),
            LongRecord::new("B", Period::Year(2020), 1.0),
            LongRecord::new("A", Period::Year(2022), 1.0),
        ];
        let wide = WideTable::pivot(&records);
        assert_eq!(
            wide.periods(),
            vec![Period::Year(2020), Period::Year(2022), Period::Year(2024)]
        );
        assert_eq!(wide.metrics().collect::<Vec<_>>(), ["A", "B"]);
    }
}
