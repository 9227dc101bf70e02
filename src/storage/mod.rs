// src/storage/mod.rs
use crate::analytics::AnalyticsReport;
use crate::extractors::locator::SectionMap;
use crate::extractors::records::{LongRecord, Period};
use crate::extractors::section::SectionKind;
use crate::utils::error::StorageError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File format for extracted long tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Shape of one extracted table, as reported in its metadata file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub record_count: usize,
    pub periods: Vec<Period>, // distinct, chronological
    pub metric_count: usize,  // distinct metric names
}

impl SectionSummary {
    pub fn from_records(records: &[LongRecord]) -> Self {
        let periods: BTreeSet<&Period> = records.iter().map(|r| &r.period).collect();
        let metrics: BTreeSet<&str> = records.iter().map(|r| r.metric.as_str()).collect();
        Self {
            record_count: records.len(),
            periods: periods.into_iter().cloned().collect(),
            metric_count: metrics.len(),
        }
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes a section's long table as `<key>.csv` or `<key>.json`.
    pub fn save_records(
        &self,
        kind: SectionKind,
        records: &[LongRecord],
        format: OutputFormat,
    ) -> Result<PathBuf, StorageError> {
        let path = match format {
            OutputFormat::Csv => {
                let path = self.base_dir.join(format!("{}.csv", kind.key()));
                let mut writer = csv::Writer::from_path(&path)?;
                writer.write_record(["metric", kind.spec().granularity.column_name(), "value"])?;
                for record in records {
                    let period = record.period.to_string();
                    let value = record.value.to_string();
                    writer.write_record([record.metric.as_str(), period.as_str(), value.as_str()])?;
                }
                writer.flush()?;
                path
            }
            OutputFormat::Json => {
                let path = self.base_dir.join(format!("{}.json", kind.key()));
                self.write_json(&path, records)?;
                path
            }
        };

        tracing::info!("Saved {} {} records to {}", records.len(), kind, path.display());
        Ok(path)
    }

    /// Saves metadata about the section in JSON format
    pub fn save_section_metadata(
        &self,
        kind: SectionKind,
        summary: &SectionSummary,
    ) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(format!("{}_meta.json", kind.key()));

        let metadata = serde_json::json!({
            "section": kind.key(),
            "section_name": kind.to_string(),
            "record_count": summary.record_count,
            "periods": summary.periods,
            "metric_count": summary.metric_count,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        self.write_json(&path, &metadata)?;

        tracing::info!("Saved metadata to {}", path.display());
        Ok(path)
    }

    /// Saves the detected sentinel rows as `sections.json`.
    pub fn save_section_map(&self, sections: &SectionMap) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join("sections.json");
        self.write_json(&path, sections)?;
        tracing::info!("Saved section map to {}", path.display());
        Ok(path)
    }

    pub fn save_analytics(&self, report: &AnalyticsReport) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join("analytics.json");
        self.write_json(&path, report)?;
        tracing::info!("Saved analytics to {}", path.display());
        Ok(path)
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(path, body)?;
        Ok(())
    }
}
