// src/workbook/reader.rs
use crate::utils::error::WorkbookError;
use crate::workbook::models::{parse_date_text, Cell, Grid};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Sheet name used by the aggregator's export.
pub const DEFAULT_SHEET_NAME: &str = "Data Sheet";

/// Loads one worksheet into a `Grid`. Dispatches on the file extension.
/// Blocking; call from `spawn_blocking` in async contexts.
pub fn load_grid(path: &Path, sheet_name: &str) -> Result<Grid, WorkbookError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook_sheet(path, sheet_name),
        _ => Err(WorkbookError::UnsupportedFormat(ext)),
    }
}

fn load_workbook_sheet(path: &Path, sheet_name: &str) -> Result<Grid, WorkbookError> {
    tracing::info!("Opening workbook: {}", path.display());
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        tracing::error!("Sheet '{}' not found. Available: {:?}", sheet_name, sheet_names);
        return Err(WorkbookError::SheetNotFound {
            requested: sheet_name.to_string(),
            available: sheet_names,
        });
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let grid = range_to_grid(&range);
    tracing::info!(
        "Loaded sheet '{}' ({} rows x {} columns)",
        sheet_name,
        grid.height(),
        grid.width()
    );
    Ok(grid)
}

/// Converts a calamine range into a grid, keeping absolute row/column positions
/// so that a range not anchored at A1 still lines up with the sheet.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }
    Grid::new(rows)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // as_datetime reads the workbook's 1900/1904 epoch flag
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => parse_date_text(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::text(s)),
        Data::DurationIso(s) => Cell::text(s),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

fn load_csv(path: &Path) -> Result<Grid, WorkbookError> {
    tracing::info!("Reading CSV export: {}", path.display());
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)?;
    let grid = read_csv_records(&mut reader)?;
    tracing::info!("Loaded CSV ({} rows x {} columns)", grid.height(), grid.width());
    Ok(grid)
}

fn read_csv_records<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Grid, WorkbookError> {
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(Grid::new(rows))
}
