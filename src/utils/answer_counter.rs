//! Answer Counter Utility
//!
//! Tallies the items of comma-separated multi-answer fields (pesticide names,
//! container disposal methods) across respondents, and counts set indicators
//! for groups of multi-select columns.

use crate::record::CleanedRecord;
use crate::schema::SurveyField;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Count every comma-separated item of a text field across records
///
/// Items are trimmed and lower-cased; empty items are skipped. An item
/// repeated within one answer is counted each time it appears.
pub fn count_listed_answers(records: &[CleanedRecord], field: SurveyField) -> FxHashMap<String, usize> {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();

    for record in records {
        let Some(text) = record.raw.text(field) else {
            continue;
        };
        for item in text.to_lowercase().split(',') {
            let item = item.trim();
            if !item.is_empty() {
                *counts.entry(item.to_string()).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// Most frequent items, ties broken alphabetically
pub fn most_common(counts: &FxHashMap<String, usize>, limit: Option<usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    sorted
}

/// Number of records with each indicator set, keyed by report name
pub fn count_flags(records: &[CleanedRecord], fields: &[(SurveyField, &str)]) -> BTreeMap<String, usize> {
    fields
        .iter()
        .map(|(field, name)| {
            let count = records.iter().filter(|r| r.raw.is_set(*field)).count();
            (name.to_string(), count)
        })
        .collect()
}

/// Records whose text answer equals `expected` (case-insensitive)
pub fn count_equal(records: &[CleanedRecord], field: SurveyField, expected: &str) -> usize {
    records.iter().filter(|r| r.raw.get(field).eq_text(expected)).count()
}

/// Percentage of `count` in `total`, 0 for an empty denominator
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::test_support::cleaned;

    #[test]
    fn test_count_listed_answers() {
        let records = vec![
            cleaned(&[(SurveyField::PesticidesUsed, "Glyphosate, Propanil")]),
            cleaned(&[(SurveyField::PesticidesUsed, "glyphosate,, ")]),
            cleaned(&[]),
        ];

        let counts = count_listed_answers(&records, SurveyField::PesticidesUsed);

        assert_eq!(counts.get("glyphosate"), Some(&2));
        assert_eq!(counts.get("propanil"), Some(&1));
        assert_eq!(counts.len(), 2);

        let top = most_common(&counts, Some(1));
        assert_eq!(top, vec![("glyphosate".to_string(), 2)]);
    }

    #[test]
    fn test_count_flags_and_percentage() {
        let records = vec![
            cleaned(&[(SurveyField::SourceRain, "1"), (SurveyField::SourceBorehole, "0")]),
            cleaned(&[(SurveyField::SourceRain, "1")]),
        ];

        let counts = count_flags(
            &records,
            &[(SurveyField::SourceRain, "pluie"), (SurveyField::SourceBorehole, "Forage")],
        );

        assert_eq!(counts["pluie"], 2);
        assert_eq!(counts["Forage"], 0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
