//! Canonical id backfill for catalog items.
//!
//! Ingredient items are stored with whatever `canonical_id` they had at
//! import time, usually none. Running a backfill after rule edits resolves
//! every unassigned item against the current rules and persists the hits,
//! which is what powers search exclusions.

use ingredients::{resolve, IngredientRuleSet};
use serde::Serialize;
use store::CatalogStore;

use crate::types::CompareError;

/// Outcome of one backfill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Items examined (everything with no canonical assignment).
    pub scanned: usize,
    /// Items that resolved and were assigned.
    pub updated: usize,
}

/// Assigns canonical ids to every unmapped item the rules can resolve.
///
/// Each pass scans all items with no assignment, so it is safe to repeat;
/// items no rule matches are left for a later pass with richer rules.
pub fn backfill_unmapped(
    store: &CatalogStore,
    rules: &IngredientRuleSet,
) -> Result<BackfillReport, CompareError> {
    let unmapped = store.unmapped_items()?;
    let scanned = unmapped.len();
    let mut updated = 0;
    for item in unmapped {
        if let Some(rule) = resolve(&item.raw_text, rules) {
            store.assign_canonical(item.id, rule.canonical_id)?;
            updated += 1;
        }
    }
    tracing::info!(scanned, updated, "canonical backfill complete");
    Ok(BackfillReport { scanned, updated })
}
