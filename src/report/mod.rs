//! Report assembly and text renditions

pub mod types;
pub mod generator;
pub mod formatters;

pub use types::{DatasetSummary, SurveyReport};
pub use generator::ReportGenerator;
pub use formatters::{JsonFormatter, MarkdownFormatter};
