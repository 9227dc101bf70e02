pub mod batch;
pub mod locator;
pub mod records;
pub mod section;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use batch::{extract_all, SectionOutcome};
#[allow(unused_imports)]
pub use locator::{locate, validate_order, SectionMap};
#[allow(unused_imports)]
pub use records::{LongRecord, Period, TimeAxis};
#[allow(unused_imports)]
pub use section::{ExtractedSection, SectionExtractor, SectionKind};
