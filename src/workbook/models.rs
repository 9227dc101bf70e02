// src/workbook/models.rs
use chrono::{Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Plain digits, western (1,234,567) or lakh (12,34,567) grouping, optional decimals and exponent.
static NUMERIC_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(?:(?:\d{1,3}(?:(?:,\d{3})+|(?:,\d{2})+,\d{3})|\d+)(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$",
    )
    .expect("Failed to compile NUMERIC_TEXT_RE")
});

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d-%b-%Y", "%b %d, %Y"];

// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// A single worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// Builds a text cell, collapsing blank text to `Empty`.
    pub fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text rendering of the cell; `None` only for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(render_number(*n)),
            Cell::Date(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Trimmed, upper-cased text used for label matching.
    pub fn normalized(&self) -> String {
        self.as_text()
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default()
    }

    /// Finite numeric value, if the cell holds one or numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_numeric_text(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(dt) => Some(*dt),
            Cell::Text(s) => parse_date_text(s),
            Cell::Number(n) => excel_serial_to_datetime(*n),
            Cell::Empty => None,
        }
    }
}

fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if !NUMERIC_TEXT_RE.is_match(trimmed) {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub(crate) fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts an Excel 1900-system serial (days since 1899-12-30) to a datetime.
/// Only for plain numeric cells; workbook date cells carry their own epoch and go
/// through calamine's `as_datetime`.
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let days = serial.floor() as u64;
    let secs = ((serial - serial.floor()) * 86_400.0).round() as i64;

    // Serials below 61 predate Excel's phantom 1900-02-29. Serial 60 (the phantom day
    // itself) lands on 1900-03-01, same as serial 61.
    let base = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let date = base.checked_add_days(Days::new(days))?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(chrono::Duration::seconds(secs))
}

/// The fully materialized worksheet, possibly ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor from string rows; blank strings become `Empty`.
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| Cell::text(c.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at `(row, col)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn numeric_coercion_accepts_separators_and_whitespace() {
        assert_eq!(Cell::text(" 1,234.5 ").as_number(), Some(1234.5));
        assert_eq!(Cell::text("12,34,567").as_number(), Some(1_234_567.0));
        assert_eq!(Cell::text("-42").as_number(), Some(-42.0));
        assert_eq!(Cell::text("1e3").as_number(), Some(1000.0));
        assert_eq!(Cell::Number(3.5).as_number(), Some(3.5));
    }

    #[test]
    fn numeric_coercion_fails_softly() {
        for raw in ["-", "--", "—", "n/a", "nan", "inf", "1,2", "12abc", "."] {
            assert_eq!(Cell::text(raw).as_number(), None, "{raw:?} should not coerce");
        }
        assert_eq!(Cell::Number(f64::NAN).as_number(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Date(date(2023, 3, 31)).as_number(), None);
        assert_eq!(Cell::text("1e400").as_number(), None);
    }

    #[test]
    fn date_coercion_handles_text_and_serials() {
        assert_eq!(Cell::text("2023-09-30").as_date(), Some(date(2023, 9, 30)));
        assert_eq!(Cell::text("2023-03-31 00:00:00").as_date(), Some(date(2023, 3, 31)));
        assert_eq!(Cell::text("31/03/2022").as_date(), Some(date(2022, 3, 31)));
        assert_eq!(Cell::Number(45016.0).as_date(), Some(date(2023, 3, 31)));
        assert_eq!(Cell::Number(1.0).as_date(), Some(date(1900, 1, 1)));
        assert_eq!(Cell::text("Report Date").as_date(), None);
        assert_eq!(Cell::Number(-5.0).as_date(), None);
    }

    #[test]
    fn phantom_leap_day_serial_folds_into_march() {
        assert_eq!(Cell::Number(59.0).as_date(), Some(date(1900, 2, 28)));
        assert_eq!(Cell::Number(60.0).as_date(), Some(date(1900, 3, 1)));
        assert_eq!(Cell::Number(61.0).as_date(), Some(date(1900, 3, 1)));
    }

    #[test]
    fn text_rendering_and_normalization() {
        assert_eq!(Cell::Number(2023.0).as_text().as_deref(), Some("2023"));
        assert_eq!(Cell::Number(1.25).as_text().as_deref(), Some("1.25"));
        assert_eq!(Cell::text("  Profit & Loss ").normalized(), "PROFIT & LOSS");
        assert_eq!(Cell::Empty.normalized(), "");
        assert!(Cell::text("   ").is_empty());
    }

    #[test]
    fn grid_reads_out_of_range_as_empty() {
        let grid = Grid::from_text_rows(vec![vec!["a", "1"], vec!["b"]]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.cell(1, 1), &Cell::Empty);
        assert_eq!(grid.cell(9, 0), &Cell::Empty);
        assert!(grid.row(5).is_empty());
    }
}
