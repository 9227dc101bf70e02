pub mod pivot;
pub mod ratios;

use crate::extractors::records::LongRecord;
use pivot::WideTable;
use ratios::{GrowthSummary, ProfitLossRatios, ReturnRatios};
use serde::Serialize;

/// Derived figures for one Data Sheet. Parts whose inputs are missing stay empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    pub profit_loss: Vec<ProfitLossRatios>,
    pub returns: Vec<ReturnRatios>,
    pub growth: GrowthSummary,
}

/// Builds the report from whichever of the P&L and Balance Sheet tables were extracted.
pub fn build_report(pl: Option<&[LongRecord]>, bs: Option<&[LongRecord]>) -> AnalyticsReport {
    let mut report = AnalyticsReport::default();

    let Some(pl) = pl else {
        tracing::warn!("No Profit & Loss records; skipping analytics");
        return report;
    };
    let pl_wide = WideTable::pivot(pl);
    report.profit_loss = ratios::profit_loss_ratios(&pl_wide);
    report.growth = ratios::growth_summary(&pl_wide);

    match bs {
        Some(bs) => report.returns = ratios::return_ratios(&pl_wide, &WideTable::pivot(bs)),
        None => tracing::warn!("No Balance Sheet records; skipping ROE/ROA"),
    }

    tracing::info!(
        "Computed analytics for {} years ({} with return ratios)",
        report.profit_loss.len(),
        report.returns.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::records::Period;

    #[test]
    fn report_without_balance_sheet_has_no_returns() {
        let pl = vec![
            LongRecord::new("Sales", Period::Year(2022), 100.0),
            LongRecord::new("Net profit", Period::Year(2022), 8.0),
        ];
        let report = build_report(Some(&pl), None);
        assert_eq!(report.profit_loss.len(), 1);
        assert_eq!(report.profit_loss[0].net_profit_margin_pct, Some(8.0));
        assert!(report.returns.is_empty());
    }

    #[test]
    fn report_without_profit_loss_is_empty() {
        let report = build_report(None, Some(&[]));
        assert!(report.profit_loss.is_empty());
        assert_eq!(report.growth, GrowthSummary::default());
    }
}
