use std::fmt;

use serde::{Serialize, Serializer};
use store::{ProductRef, StoreError};
use thiserror::Error;
use uuid::Uuid;

/// Which token space products are compared in.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Group lines by their normalized raw text.
    #[default]
    Raw,
    /// Resolve each line against the synonym rules and group by canonical
    /// ingredient; lines no rule matches stay distinct as unmapped entries.
    Canonical,
}

impl CompareMode {
    /// Parse a client-supplied mode string. Surrounding whitespace and case
    /// are forgiven; unknown values are a validation failure.
    pub fn parse(value: &str) -> Result<Self, CompareError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(CompareMode::Raw),
            "canonical" => Ok(CompareMode::Canonical),
            _ => Err(CompareError::Validation(
                "mode must be one of: raw, canonical".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareMode::Raw => "raw",
            CompareMode::Canonical => "canonical",
        }
    }
}

/// Parameters for one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareRequest {
    /// Product ids or slugs; at least two must resolve to distinct products.
    pub product_tokens: Vec<String>,
    pub mode: CompareMode,
    /// Include trace-level lines in the compared token sets.
    pub include_trace: bool,
    /// Include "may contain" cross-contamination lines.
    pub include_may_contain: bool,
}

/// Identity of one aggregated ingredient in a comparison.
///
/// Serialized as a string: canonical ingredients as their hyphenated UUID,
/// unmapped lines as `unmapped:` plus the normalized text, and raw-mode
/// lines as the normalized text itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonKey {
    /// A resolved canonical ingredient.
    Canonical(Uuid),
    /// A line no rule matched, keyed by its normalized text.
    Unmapped(String),
    /// Raw-mode grouping by normalized text.
    Raw(String),
}

impl fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonKey::Canonical(id) => write!(f, "{id}"),
            ComparisonKey::Unmapped(text) => write!(f, "unmapped:{text}"),
            ComparisonKey::Raw(text) => f.write_str(text),
        }
    }
}

impl Serialize for ComparisonKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One ingredient with its cross-product occurrence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredIngredient {
    /// Display text: the canonical name, the first-seen trimmed raw text,
    /// or `(unmapped) ` plus the trimmed raw text.
    pub ingredient: String,
    /// Stable grouping key for this row.
    pub ingredient_key: ComparisonKey,
    /// Number of compared products whose token set contains the key.
    pub in_count: usize,
    /// `in_count / product_count`, rounded to four decimal places.
    pub percent: f64,
}

/// Echo of the parameters a comparison actually ran with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareNotes {
    pub mode: CompareMode,
    pub normalization: &'static str,
    pub trace_included: bool,
    pub may_contain_included: bool,
}

/// The full result of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Number of distinct products actually compared.
    pub product_count: usize,
    /// The compared products, in request order after dedup.
    pub products: Vec<ProductRef>,
    /// Ingredients present in every compared product, sorted by display
    /// text, case-insensitive.
    pub in_all: Vec<ScoredIngredient>,
    /// Ingredients present in some but not all products, sorted by count
    /// descending, then display text, case-insensitive.
    pub in_some: Vec<ScoredIngredient>,
    pub notes: CompareNotes,
}

/// Errors produced by the comparison layer.
///
/// Validation failures describe a precondition the caller can fix;
/// data-source failures mean the catalog store gave out mid-operation.
/// There are no partial results: a comparison either completes or fails.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The request violates a precondition; the message names it.
    #[error("{0}")]
    Validation(String),
    /// The catalog store failed while serving the comparison.
    #[error("data source failure: {0}")]
    DataSource(#[from] StoreError),
}

/// Rounds to four decimal places, half away from zero.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_parse_is_lenient_about_case_and_whitespace() {
        assert_eq!(CompareMode::parse("raw").unwrap(), CompareMode::Raw);
        assert_eq!(CompareMode::parse("  RAW ").unwrap(), CompareMode::Raw);
        assert_eq!(
            CompareMode::parse("Canonical").unwrap(),
            CompareMode::Canonical
        );
    }

    #[test]
    fn unknown_mode_is_a_validation_failure() {
        let err = CompareMode::parse("hybrid").unwrap_err();
        match err {
            CompareError::Validation(msg) => {
                assert_eq!(msg, "mode must be one of: raw, canonical")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn comparison_keys_serialize_as_strings() {
        let id = Uuid::from_u128(7);
        assert_eq!(
            serde_json::to_value(ComparisonKey::Canonical(id)).unwrap(),
            json!(id.to_string())
        );
        assert_eq!(
            serde_json::to_value(ComparisonKey::Unmapped("sea salt".into())).unwrap(),
            json!("unmapped:sea salt")
        );
        assert_eq!(
            serde_json::to_value(ComparisonKey::Raw("rice".into())).unwrap(),
            json!("rice")
        );
    }

    #[test]
    fn round4_behaves_at_boundaries() {
        assert_eq!(round4(1.0 / 3.0), 0.3333);
        assert_eq!(round4(2.0 / 3.0), 0.6667);
        assert_eq!(round4(0.5), 0.5);
        assert_eq!(round4(0.33335), 0.3334);
        assert_eq!(round4(1.0), 1.0);
    }
}
