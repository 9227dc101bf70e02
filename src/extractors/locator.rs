// src/extractors/locator.rs
use crate::extractors::section::SectionKind;
use crate::utils::error::ExtractError;
use crate::workbook::models::Grid;
use serde::Serialize;
use std::collections::BTreeMap;

/// Row index of each section sentinel that was found. Absent keys are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    starts: BTreeMap<SectionKind, usize>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: SectionKind) -> Option<usize> {
        self.starts.get(&kind).copied()
    }

    /// Records a start row, returning the row it replaced.
    pub fn insert(&mut self, kind: SectionKind, row: usize) -> Option<usize> {
        self.starts.insert(kind, row)
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.starts.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Entries in canonical section order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, usize)> + '_ {
        self.starts.iter().map(|(kind, row)| (*kind, *row))
    }
}

/// Scans the first column once and records the row of every sentinel label.
/// A repeated sentinel resolves to its last occurrence.
pub fn locate(grid: &Grid) -> SectionMap {
    let mut sections = SectionMap::new();

    for row in 0..grid.height() {
        let label = grid.cell(row, 0).normalized();
        if label.is_empty() {
            continue;
        }
        if let Some(kind) = SectionKind::from_sentinel(&label) {
            if let Some(previous) = sections.insert(kind, row) {
                tracing::warn!(
                    "Duplicate '{}' sentinel at row {} (previous at row {}); using the later one",
                    kind.spec().sentinel,
                    row,
                    previous
                );
            } else {
                tracing::debug!("Found {} sentinel at row {}", kind, row);
            }
        }
    }

    let missing: Vec<SectionKind> = SectionKind::ALL
        .into_iter()
        .filter(|kind| !sections.contains(*kind))
        .collect();
    if !missing.is_empty() {
        tracing::warn!("Sections without a sentinel: {:?}", missing);
    }
    tracing::info!("Located {} of {} sections", sections.len(), SectionKind::ALL.len());

    sections
}

/// Checks that the present sentinels appear in canonical order.
/// Opt-in: extraction itself tolerates disorder (the affected block comes out empty).
pub fn validate_order(sections: &SectionMap) -> Result<(), ExtractError> {
    let present: Vec<(SectionKind, usize)> = sections.iter().collect();
    for pair in present.windows(2) {
        let (before, before_row) = pair[0];
        let (after, after_row) = pair[1];
        if before_row >= after_row {
            return Err(ExtractError::SectionOrder {
                before,
                before_row,
                after,
                after_row,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_grid() -> Grid {
        Grid::from_text_rows(vec![
            vec!["META"],
            vec!["  profit & loss "],
            vec!["Sales", "1"],
            vec!["QUARTERS"],
            vec!["BALANCE SHEET"],
            vec!["Cash Flow:"],
        ])
    }

    #[test]
    fn locates_all_sentinels() {
        let sections = locate(&canonical_grid());
        assert_eq!(sections.get(SectionKind::ProfitLoss), Some(1));
        assert_eq!(sections.get(SectionKind::Quarters), Some(3));
        assert_eq!(sections.get(SectionKind::BalanceSheet), Some(4));
        assert_eq!(sections.get(SectionKind::CashFlow), Some(5));
        assert!(validate_order(&sections).is_ok());
    }

    #[test]
    fn missing_sentinel_leaves_key_absent() {
        let grid = Grid::from_text_rows(vec![vec!["PROFIT & LOSS"], vec!["QUARTERS"]]);
        let sections = locate(&grid);
        assert_eq!(sections.len(), 2);
        assert!(!sections.contains(SectionKind::CashFlow));
        assert!(!sections.contains(SectionKind::BalanceSheet));
    }

    #[test]
    fn duplicate_sentinel_last_wins() {
        let grid = Grid::from_text_rows(vec![
            vec!["BALANCE SHEET"],
            vec!["Report Date", "2022-03-31"],
            vec!["Reserves", "1"],
            vec!["BALANCE SHEET"],
            vec!["Report Date", "2023-03-31"],
            vec!["Reserves", "2"],
        ]);
        let sections = locate(&grid);
        assert_eq!(sections.get(SectionKind::BalanceSheet), Some(3));

        let bs = crate::extractors::section::SectionExtractor::new(&grid, &sections)
            .extract(SectionKind::BalanceSheet)
            .unwrap();
        assert_eq!(bs.start_row, 3);
        assert_eq!(bs.records.len(), 1);
        assert_eq!(bs.records[0].value, 2.0);
    }

    #[test]
    fn near_miss_labels_are_ignored() {
        let grid = Grid::from_text_rows(vec![vec!["CASH FLOW"], vec!["Balance Sheet Items"]]);
        assert!(locate(&grid).is_empty());
    }

    #[test]
    fn order_validation_flags_swapped_sections() {
        let mut sections = SectionMap::new();
        sections.insert(SectionKind::ProfitLoss, 10);
        sections.insert(SectionKind::Quarters, 4);
        sections.insert(SectionKind::CashFlow, 20);
        let err = validate_order(&sections).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::SectionOrder {
                before: SectionKind::ProfitLoss,
                after: SectionKind::Quarters,
                ..
            }
        ));
    }

    #[test]
    fn section_map_serializes_by_key() {
        let sections = locate(&canonical_grid());
        let json = serde_json::to_string(&sections).unwrap();
        assert_eq!(json, r#"{"pl":1,"quarters":3,"balance_sheet":4,"cash_flow":5}"#);
    }
}
