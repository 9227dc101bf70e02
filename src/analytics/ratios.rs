// src/analytics/ratios.rs
use crate::analytics::pivot::WideTable;
use crate::extractors::records::Period;
use serde::Serialize;

// Metric names as they appear in the Data Sheet.
pub const SALES: &str = "Sales";
pub const NET_PROFIT: &str = "Net profit";
pub const PROFIT_BEFORE_TAX: &str = "Profit before tax";
pub const INTEREST: &str = "Interest";
pub const EQUITY_SHARE_CAPITAL: &str = "Equity Share Capital";
pub const RESERVES: &str = "Reserves";
pub const TOTAL_ASSETS: &str = "Total Assets";
pub const OPERATING_EXPENSES: [&str; 4] = [
    "Other Mfr. Exp",
    "Employee Cost",
    "Selling and admin",
    "Other Expenses",
];

/// Yearly profitability, growth and coverage figures from the P&L.
/// Percentages and the coverage multiple are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitLossRatios {
    pub year: i32,
    pub revenue_growth_pct: Option<f64>,
    pub net_profit_growth_pct: Option<f64>,
    pub net_profit_margin_pct: Option<f64>,
    pub pretax_margin_pct: Option<f64>,
    pub cost_to_income_pct: Option<f64>,
    pub interest_coverage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRatios {
    pub year: i32,
    pub equity: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub sales_cagr_3y: Option<f64>,
    pub sales_cagr_5y: Option<f64>,
    pub profit_cagr_3y: Option<f64>,
    pub profit_cagr_5y: Option<f64>,
}

fn years(table: &WideTable) -> Vec<i32> {
    table
        .periods()
        .into_iter()
        .filter_map(|p| match p {
            Period::Year(y) => Some(y),
            Period::Label(_) => None,
        })
        .collect()
}

fn at(table: &WideTable, metric: &str, year: i32) -> Option<f64> {
    table.value(metric, &Period::Year(year))
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change against the closest earlier year that has a value.
fn growth_pct(table: &WideTable, metric: &str, year: i32) -> Option<f64> {
    let series = table.series(metric)?;
    let current = *series.get(&Period::Year(year))?;
    let previous = series
        .range(..Period::Year(year))
        .next_back()
        .map(|(_, v)| *v);
    ratio(Some(current - previous?), previous).map(|g| g * 100.0)
}

pub fn profit_loss_ratios(pl: &WideTable) -> Vec<ProfitLossRatios> {
    years(pl)
        .into_iter()
        .map(|year| {
            let sales = at(pl, SALES, year);
            let pbt = at(pl, PROFIT_BEFORE_TAX, year);
            let interest = at(pl, INTEREST, year);
            let operating_expenses = OPERATING_EXPENSES
                .iter()
                .map(|m| at(pl, m, year))
                .sum::<Option<f64>>();
            let ebit = pbt.zip(interest).map(|(p, i)| p + i);

            ProfitLossRatios {
                year,
                revenue_growth_pct: growth_pct(pl, SALES, year).map(round2),
                net_profit_growth_pct: growth_pct(pl, NET_PROFIT, year).map(round2),
                net_profit_margin_pct: ratio(at(pl, NET_PROFIT, year), sales).map(|r| round2(r * 100.0)),
                pretax_margin_pct: ratio(pbt, sales).map(|r| round2(r * 100.0)),
                cost_to_income_pct: ratio(operating_expenses, sales).map(|r| round2(r * 100.0)),
                interest_coverage: ratio(ebit, interest).map(round2),
            }
        })
        .collect()
}

/// ROE and ROA for every year present in either statement.
pub fn return_ratios(pl: &WideTable, bs: &WideTable) -> Vec<ReturnRatios> {
    let mut all_years = years(pl);
    all_years.extend(years(bs));
    all_years.sort_unstable();
    all_years.dedup();

    all_years
        .into_iter()
        .map(|year| {
            let net_profit = at(pl, NET_PROFIT, year);
            let equity = at(bs, EQUITY_SHARE_CAPITAL, year)
                .zip(at(bs, RESERVES, year))
                .map(|(capital, reserves)| capital + reserves);
            ReturnRatios {
                year,
                equity,
                roe: ratio(net_profit, equity),
                roa: ratio(net_profit, at(bs, TOTAL_ASSETS, year)),
            }
        })
        .collect()
}

/// Compound annual growth over the last `years` intervals of a chronological series.
pub fn cagr(values: &[f64], years: usize) -> Option<f64> {
    if years == 0 || values.len() < years + 1 {
        return None;
    }
    let start = values[values.len() - years - 1];
    let end = values[values.len() - 1];
    if start <= 0.0 {
        return None;
    }
    Some((end / start).powf(1.0 / years as f64) - 1.0)
}

fn metric_cagr(pl: &WideTable, metric: &str, years: usize) -> Option<f64> {
    let values: Vec<f64> = pl.series(metric)?.values().copied().collect();
    cagr(&values, years)
}

pub fn growth_summary(pl: &WideTable) -> GrowthSummary {
    GrowthSummary {
        sales_cagr_3y: metric_cagr(pl, SALES, 3),
        sales_cagr_5y: metric_cagr(pl, SALES, 5),
        profit_cagr_3y: metric_cagr(pl, NET_PROFIT, 3),
        profit_cagr_5y: metric_cagr(pl, NET_PROFIT, 5),
    }
}
