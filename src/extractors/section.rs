// src/extractors/section.rs

// --- Imports ---
use crate::extractors::locator::SectionMap;
use crate::extractors::records::{LongRecord, Period, TimeAxis};
use crate::utils::error::ExtractError;
use crate::workbook::models::{Cell, Grid};
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

// --- Constants ---
// Label of the in-section row carrying the period dates.
const HEADER_LABEL: &str = "REPORT DATE";
// Text a blank label cell takes after float serialization in some exports.
const BLANK_METRIC_PLACEHOLDER: &str = "nan";
const QUARTER_LABEL_FORMAT: &str = "%b-%y";
// Whole numbers in this range in a header row are fiscal years, not date serials.
const BARE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2200;

// --- Section Configuration ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    #[serde(rename = "pl")]
    #[value(name = "pl")]
    ProfitLoss,
    Quarters,
    BalanceSheet,
    CashFlow,
}

/// How the header row's label cell is compared against `REPORT DATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    Exact,
    Contains,
}

impl HeaderMatch {
    pub fn matches(self, normalized: &str) -> bool {
        match self {
            HeaderMatch::Exact => normalized == HEADER_LABEL,
            HeaderMatch::Contains => normalized.contains(HEADER_LABEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodGranularity {
    Year,
    MonthLabel,
}

impl PeriodGranularity {
    pub fn project(self, date: NaiveDateTime) -> Period {
        match self {
            PeriodGranularity::Year => Period::Year(date.year()),
            PeriodGranularity::MonthLabel => Period::Label(date.format(QUARTER_LABEL_FORMAT).to_string()),
        }
    }

    /// Column name used for the period in tabular output.
    pub fn column_name(self) -> &'static str {
        match self {
            PeriodGranularity::Year => "year",
            PeriodGranularity::MonthLabel => "period",
        }
    }
}

/// Where a section's block stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBoundary {
    /// The next section's sentinel must exist.
    Required(SectionKind),
    /// Stop at the next section's sentinel if present, else at the end of the sheet.
    Optional(SectionKind),
    ToEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub sentinel: &'static str,
    pub end: EndBoundary,
    pub header_match: HeaderMatch,
    pub granularity: PeriodGranularity,
}

impl SectionKind {
    /// Canonical order of the sections in a well-formed sheet.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::ProfitLoss,
        SectionKind::Quarters,
        SectionKind::BalanceSheet,
        SectionKind::CashFlow,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::ProfitLoss => "pl",
            SectionKind::Quarters => "quarters",
            SectionKind::BalanceSheet => "balance_sheet",
            SectionKind::CashFlow => "cash_flow",
        }
    }

    pub fn spec(self) -> SectionSpec {
        match self {
            SectionKind::ProfitLoss => SectionSpec {
                sentinel: "PROFIT & LOSS",
                end: EndBoundary::Required(SectionKind::Quarters),
                header_match: HeaderMatch::Contains,
                granularity: PeriodGranularity::Year,
            },
            SectionKind::Quarters => SectionSpec {
                sentinel: "QUARTERS",
                end: EndBoundary::Required(SectionKind::BalanceSheet),
                header_match: HeaderMatch::Exact,
                granularity: PeriodGranularity::MonthLabel,
            },
            SectionKind::BalanceSheet => SectionSpec {
                sentinel: "BALANCE SHEET",
                end: EndBoundary::Optional(SectionKind::CashFlow),
                header_match: HeaderMatch::Exact,
                granularity: PeriodGranularity::Year,
            },
            SectionKind::CashFlow => SectionSpec {
                sentinel: "CASH FLOW:",
                end: EndBoundary::ToEnd,
                header_match: HeaderMatch::Contains,
                granularity: PeriodGranularity::Year,
            },
        }
    }

    /// Section whose sentinel equals the given normalized label, if any.
    pub fn from_sentinel(normalized: &str) -> Option<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.spec().sentinel == normalized)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::ProfitLoss => "Profit & Loss",
            SectionKind::Quarters => "Quarters",
            SectionKind::BalanceSheet => "Balance Sheet",
            SectionKind::CashFlow => "Cash Flow",
        };
        f.write_str(name)
    }
}

// --- Data Structures ---
#[derive(Debug, Clone)]
pub struct ExtractedSection {
    pub kind: SectionKind,
    pub start_row: usize,     // Row of the sentinel label
    pub block: Range<usize>,  // Rows owned by the section, sentinel excluded
    pub header_row: usize,    // The "Report Date" row
    pub time_axis: TimeAxis,
    pub records: Vec<LongRecord>,
}

// --- Extraction Steps ---

/// Rows owned by `kind`: from just after its sentinel up to (not including) the
/// next section's sentinel, or to the end of the grid.
/// Out-of-order sentinels yield an empty range rather than an error.
pub fn section_block(
    kind: SectionKind,
    sections: &SectionMap,
    grid_height: usize,
) -> Result<Range<usize>, ExtractError> {
    let start = sections.get(kind).ok_or(ExtractError::MissingSection(kind))?;

    let end = match kind.spec().end {
        EndBoundary::Required(next) => sections.get(next).ok_or(ExtractError::MissingBoundary {
            section: kind,
            boundary: next,
        })?,
        EndBoundary::Optional(next) => sections.get(next).unwrap_or(grid_height),
        EndBoundary::ToEnd => grid_height,
    };

    let first = start + 1;
    let end = end.min(grid_height);
    if end < first {
        tracing::warn!(
            "{} block is empty: sentinel at row {} but boundary at row {}",
            kind,
            start,
            end
        );
        return Ok(first..first);
    }
    Ok(first..end)
}

/// First row in `block` whose label cell matches the header label.
pub fn find_header_row(grid: &Grid, block: Range<usize>, mode: HeaderMatch) -> Option<usize> {
    block
        .into_iter()
        .find(|&row| mode.matches(&grid.cell(row, 0).normalized()))
}

/// Reads the header row's cells from column 1 onward. Every non-empty cell must be a date,
/// or a bare year in annual sections; the number of such cells fixes how many value
/// columns are read below the header.
pub fn derive_time_axis(
    grid: &Grid,
    kind: SectionKind,
    header_row: usize,
) -> Result<TimeAxis, ExtractError> {
    let granularity = kind.spec().granularity;
    let mut periods = Vec::new();

    for (column, cell) in grid.row(header_row).iter().enumerate().skip(1) {
        if cell.is_empty() {
            continue;
        }
        let invalid = || ExtractError::InvalidPeriod {
            section: kind,
            row: header_row,
            column,
            value: cell.as_text().unwrap_or_default(),
        };

        // A bare year only names an annual period; quarters need a full date.
        if let Some(year) = bare_year(cell) {
            match granularity {
                PeriodGranularity::Year => periods.push(Period::Year(year)),
                PeriodGranularity::MonthLabel => return Err(invalid()),
            }
            continue;
        }

        let date = cell.as_date().ok_or_else(invalid)?;
        periods.push(granularity.project(date));
    }

    Ok(TimeAxis::new(periods))
}

fn bare_year(cell: &Cell) -> Option<i32> {
    let year = match cell {
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e6 => *n as i32,
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse().ok()?
        }
        _ => return None,
    };
    BARE_YEAR_RANGE.contains(&year).then_some(year)
}

/// Reshapes the metric rows in `rows` from wide to long. Rows without a usable
/// metric name and cells that are not finite numbers are dropped.
pub fn melt_rows(grid: &Grid, rows: Range<usize>, axis: &TimeAxis) -> Vec<LongRecord> {
    let mut records = Vec::new();
    let mut dropped_cells = 0usize;

    for row in rows {
        let metric = match grid.cell(row, 0).as_text() {
            Some(text) => text.trim().to_string(),
            None => continue,
        };
        if metric.is_empty() || metric == BLANK_METRIC_PLACEHOLDER {
            tracing::trace!("Skipping row {}: no metric name", row);
            continue;
        }

        for (offset, period) in axis.periods().iter().enumerate() {
            match grid.cell(row, offset + 1).as_number() {
                Some(value) => records.push(LongRecord::new(metric.clone(), period.clone(), value)),
                None => dropped_cells += 1,
            }
        }
    }

    if dropped_cells > 0 {
        tracing::debug!("Dropped {} blank or non-numeric value cells", dropped_cells);
    }
    records
}

// --- Main Extractor Structure ---
/// Extracts statement sections from one grid using a shared section map.
pub struct SectionExtractor<'a> {
    grid: &'a Grid,
    sections: &'a SectionMap,
}

impl<'a> SectionExtractor<'a> {
    pub fn new(grid: &'a Grid, sections: &'a SectionMap) -> Self {
        Self { grid, sections }
    }

    /// Runs the full pipeline for one section: bound, find header, derive periods, melt.
    pub fn extract(&self, kind: SectionKind) -> Result<ExtractedSection, ExtractError> {
        let spec = kind.spec();
        tracing::info!("Extracting {} section", kind);

        let block = section_block(kind, self.sections, self.grid.height())?;
        tracing::debug!("{} block spans rows {:?}", kind, block);

        let header_row = find_header_row(self.grid, block.clone(), spec.header_match)
            .ok_or(ExtractError::HeaderNotFound(kind))?;
        tracing::debug!("{} header row at {}", kind, header_row);

        let time_axis = derive_time_axis(self.grid, kind, header_row)?;
        tracing::debug!("{} time axis: {:?}", kind, time_axis.periods());
        if time_axis.is_empty() {
            tracing::warn!("{} header row {} has no period cells", kind, header_row);
        }

        let records = melt_rows(self.grid, (header_row + 1)..block.end, &time_axis);
        tracing::info!(
            "Extracted {} records across {} periods from {}",
            records.len(),
            time_axis.len(),
            kind
        );

        Ok(ExtractedSection {
            kind,
            start_row: block.start - 1,
            block,
            header_row,
            time_axis,
            records,
        })
    }
}
