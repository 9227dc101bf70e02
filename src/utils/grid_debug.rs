// src/utils/grid_debug.rs
use crate::extractors::locator::SectionMap;
use crate::extractors::section::{HeaderMatch, SectionKind};
use crate::utils::error::AppError;
use crate::workbook::models::Grid;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Renders the grid's label column with section and header markers, one line per row.
/// Any row whose label would pass the loose header test is tagged, whichever section owns it.
pub fn render_label_column(grid: &Grid, sections: &SectionMap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} rows x {} columns", grid.height(), grid.width());

    for row in 0..grid.height() {
        let cell = grid.cell(row, 0);
        let label = cell.as_text().unwrap_or_default();
        let normalized = cell.normalized();

        let marker = match SectionKind::from_sentinel(&normalized) {
            Some(kind) if sections.get(kind) == Some(row) => format!("[START {}]", kind.key()),
            Some(kind) => format!("[SHADOWED {}]", kind.key()),
            None if HeaderMatch::Contains.matches(&normalized) => "[HEADER]".to_string(),
            None => String::new(),
        };
        let populated = grid.row(row).iter().filter(|c| !c.is_empty()).count();

        let _ = writeln!(out, "{:>5} | {:<22} | {:>3} cells | {}", row, marker, populated, label.trim());
    }
    out
}

/// Writes the annotated label column to `filename`.
pub fn save_grid_debug(grid: &Grid, sections: &SectionMap, filename: &Path) -> Result<(), AppError> {
    fs::write(filename, render_label_column(grid, sections))?;
    tracing::info!("Saved grid debug dump to {}", filename.display());
    Ok(())
}
