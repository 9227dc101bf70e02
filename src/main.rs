// src/main.rs
mod analytics;
mod extractors;
mod storage;
mod utils;
mod workbook;

use clap::Parser;
use extractors::section::SectionKind;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{OutputFormat, SectionSummary, StorageManager};
use utils::AppError;

/// Command Line Interface for the Data Sheet extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Spreadsheet export (.xlsx, .xlsm, .xlsb, .xls, .ods) or a CSV of the Data Sheet
    #[arg(short, long)]
    input: PathBuf,

    /// Worksheet holding the stacked statements
    #[arg(short, long, default_value = workbook::reader::DEFAULT_SHEET_NAME)]
    sheet: String,

    /// Output directory for extracted tables
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Sections to extract (repeatable; default: all)
    #[arg(long = "section", value_enum)]
    sections: Vec<SectionKind>,

    /// File format for the long tables
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Fail when section sentinels are not in canonical order
    #[arg(long)]
    strict_order: bool,

    /// Skip ratio and CAGR computation
    #[arg(long)]
    no_analytics: bool,

    /// Debug mode - write an annotated dump of the label column and log at debug level
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    let kinds: Vec<SectionKind> = if args.sections.is_empty() {
        SectionKind::ALL.to_vec()
    } else {
        args.sections.clone()
    };

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Load the sheet off the async runtime
    let input = args.input.clone();
    let sheet = args.sheet.clone();
    let grid = tokio::task::spawn_blocking(move || workbook::reader::load_grid(&input, &sheet))
        .await
        .map_err(|e| AppError::Processing(format!("Workbook loading task failed: {}", e)))??;

    if grid.width() == 0 {
        return Err(AppError::Config(format!(
            "Sheet '{}' in {} has no cells",
            args.sheet,
            args.input.display()
        )));
    }

    // 5. Locate sections
    let sections = extractors::locator::locate(&grid);
    storage.save_section_map(&sections)?;

    if args.debug {
        let debug_path = storage.base_dir().join("grid_labels.txt");
        if let Err(e) = utils::grid_debug::save_grid_debug(&grid, &sections, &debug_path) {
            tracing::warn!("Failed to create grid debug dump: {}", e);
        }
    }

    match extractors::locator::validate_order(&sections) {
        Ok(()) => {}
        Err(e) if args.strict_order => return Err(e.into()),
        Err(e) => tracing::warn!("{}; affected sections may come out empty", e),
    }

    // 6. Extract the requested sections
    let outcomes =
        extractors::batch::extract_all(Arc::new(grid), Arc::new(sections), &kinds).await?;

    let mut success_count = 0;
    let mut failure_count = 0;
    let mut pl_records = None;
    let mut bs_records = None;

    for outcome in outcomes {
        let section = match outcome.result {
            Ok(section) => section,
            Err(e) => {
                tracing::error!("Failed to extract {} section: {}", outcome.kind, e);
                failure_count += 1;
                continue;
            }
        };
        success_count += 1;

        match storage.save_records(section.kind, &section.records, args.format) {
            Ok(path) => tracing::info!("Saved {} table to: {}", section.kind, path.display()),
            Err(e) => tracing::error!("Failed to save {} table: {}", section.kind, e),
        }

        let summary = SectionSummary::from_records(&section.records);
        match storage.save_section_metadata(section.kind, &summary) {
            Ok(path) => tracing::info!("Saved {} metadata to: {}", section.kind, path.display()),
            Err(e) => tracing::error!("Failed to save {} metadata: {}", section.kind, e),
        }

        match section.kind {
            SectionKind::ProfitLoss => pl_records = Some(section.records),
            SectionKind::BalanceSheet => bs_records = Some(section.records),
            _ => {}
        }
    }

    // 7. Downstream analytics
    if !args.no_analytics && pl_records.is_some() {
        let report = analytics::build_report(pl_records.as_deref(), bs_records.as_deref());
        if let Err(e) = storage.save_analytics(&report) {
            tracing::error!("Failed to save analytics: {}", e);
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any of the {} requested sections",
            failure_count
        )));
    }

    Ok(())
}
