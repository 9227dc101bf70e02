// src/extractors/batch.rs
use crate::extractors::locator::SectionMap;
use crate::extractors::section::{ExtractedSection, SectionExtractor, SectionKind};
use crate::utils::error::{AppError, ExtractError};
use crate::workbook::models::Grid;
use std::sync::Arc;

/// Result of extracting one section. Failures stay local to their section.
#[derive(Debug)]
pub struct SectionOutcome {
    pub kind: SectionKind,
    pub result: Result<ExtractedSection, ExtractError>,
}

/// Extracts the requested sections concurrently on the blocking pool.
/// Outcomes come back in the order of `kinds`.
pub async fn extract_all(
    grid: Arc<Grid>,
    sections: Arc<SectionMap>,
    kinds: &[SectionKind],
) -> Result<Vec<SectionOutcome>, AppError> {
    let handles: Vec<_> = kinds
        .iter()
        .map(|&kind| {
            let grid = Arc::clone(&grid);
            let sections = Arc::clone(&sections);
            let handle = tokio::task::spawn_blocking(move || {
                SectionExtractor::new(&grid, &sections).extract(kind)
            });
            (kind, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (kind, handle) in handles {
        let result = handle
            .await
            .map_err(|e| AppError::Processing(format!("{} extraction task failed: {}", kind, e)))?;
        outcomes.push(SectionOutcome { kind, result });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::locator::locate;

    #[test]
    fn failures_do_not_block_other_sections() {
        let grid = Grid::from_text_rows(vec![
            vec!["PROFIT & LOSS"],
            vec!["Report Date", "2022-03-31"],
            vec!["Sales", "100"],
            vec!["QUARTERS"],
            vec!["Report Date", "2023-09-30"],
            vec!["Sales", "25"],
        ]);
        let sections = locate(&grid);
        let kinds = SectionKind::ALL;

        let outcomes = tokio_test::block_on(async {
            extract_all(Arc::new(grid), Arc::new(sections), &kinds).await
        })
        .unwrap();

        let order: Vec<SectionKind> = outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(order, kinds);
        assert_eq!(outcomes[0].result.as_ref().unwrap().records.len(), 1);
        assert!(matches!(
            outcomes[1].result,
            Err(ExtractError::MissingBoundary { boundary: SectionKind::BalanceSheet, .. })
        ));
        assert!(matches!(outcomes[2].result, Err(ExtractError::MissingSection(SectionKind::BalanceSheet))));
        assert!(matches!(outcomes[3].result, Err(ExtractError::MissingSection(SectionKind::CashFlow))));
    }
}
