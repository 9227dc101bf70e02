// src/utils/error.rs
#![allow(dead_code)]
use crate::extractors::section::SectionKind;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to read workbook: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Failed to read CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet '{requested}' not found (available: {available:?})")]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("Unsupported input format: '.{0}'")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0} section not found (no sentinel row)")]
    MissingSection(SectionKind),

    #[error("Could not determine where {section} ends ({boundary} sentinel missing)")]
    MissingBoundary {
        section: SectionKind,
        boundary: SectionKind,
    },

    #[error("Report Date row not found inside {0} section")]
    HeaderNotFound(SectionKind),

    #[error("{section}: header cell at row {row}, column {column} is not a date: '{value}'")]
    InvalidPeriod {
        section: SectionKind,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Sections out of order: {before} (row {before_row}) must precede {after} (row {after_row})")]
    SectionOrder {
        before: SectionKind,
        before_row: usize,
        after: SectionKind,
        after_row: usize,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Workbook loading failed: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
