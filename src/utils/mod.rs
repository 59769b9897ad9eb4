//! Utility modules for survey analysis
//!
//! Shared functionality used across the aggregators:
//! - Normalization: raw answers to typed derived values
//! - Keyword matching: free-text flags and categories
//! - Answer counting: multi-answer tallies and indicator counts
//! - Statistics: descriptive statistics and hypothesis tests
//! - Frame helpers: validated access to the survey DataFrame

pub mod normalization;
pub mod keyword_matcher;
pub mod answer_counter;
pub mod stats;
pub mod frame_helpers;

// Re-export commonly used types
pub use keyword_matcher::{FlagMatcher, KeywordCategorizer, KeywordMatcher, RecordFlags};
pub use answer_counter::{count_flags, count_listed_answers, most_common, percentage};
pub use stats::{Correlation, TestResult};
