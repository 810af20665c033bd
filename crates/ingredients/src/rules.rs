//! Synonym rule compilation.
//!
//! The catalog stores a canonical ingredient vocabulary plus synonym rows that
//! map label spellings onto it. [`IngredientRuleSet::build`] compiles both
//! into one ordered rule list that [`resolve`](crate::resolve) scans
//! first-match-wins, so all precedence decisions live here rather than in the
//! matching loop.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::normalize;

/// How a rule pattern is matched against a normalized ingredient token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The whole token must equal the pattern.
    Exact,
    /// The pattern must occur as a substring of the token.
    Contains,
}

/// A canonical ingredient from the catalog vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub id: Uuid,
    pub name: String,
}

/// One synonym row as loaded from the catalog, before compilation.
///
/// `synonym` is the raw pattern text; compilation normalizes it. Inactive
/// rows are kept in storage for audit but never compiled into rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRow {
    pub canonical_id: Uuid,
    pub canonical_name: String,
    pub synonym: String,
    pub match_kind: MatchKind,
    pub is_active: bool,
}

/// A compiled matching rule. `pattern` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    pub canonical_id: Uuid,
    pub canonical_name: String,
    pub pattern: String,
    pub kind: MatchKind,
}

/// An ordered, compiled set of matching rules.
///
/// Rule order is the resolution precedence:
///
/// 1. [`MatchKind::Exact`] rules before [`MatchKind::Contains`] rules
/// 2. Within a tier, longer patterns first (length in characters of the
///    normalized pattern), so `"pea protein"` beats `"pea"`
/// 3. Ties keep insertion order: canonical names, then synonym rows in their
///    loaded order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRuleSet {
    rules: Vec<SynonymRule>,
}

impl IngredientRuleSet {
    /// Compiles canonical names and synonym rows into an ordered rule set.
    ///
    /// Every canonical name becomes an implicit [`MatchKind::Exact`] rule for
    /// itself, so a label that spells the canonical name verbatim resolves
    /// without a synonym row. Inactive rows and rows whose pattern normalizes
    /// to the empty string are dropped.
    pub fn build(canonicals: &[CanonicalEntry], synonyms: &[SynonymRow]) -> Self {
        let mut rules = Vec::with_capacity(canonicals.len() + synonyms.len());

        for canonical in canonicals {
            let pattern = normalize(&canonical.name);
            if pattern.is_empty() {
                continue;
            }
            rules.push(SynonymRule {
                canonical_id: canonical.id,
                canonical_name: canonical.name.clone(),
                pattern,
                kind: MatchKind::Exact,
            });
        }

        for row in synonyms {
            if !row.is_active {
                continue;
            }
            let pattern = normalize(&row.synonym);
            if pattern.is_empty() {
                continue;
            }
            rules.push(SynonymRule {
                canonical_id: row.canonical_id,
                canonical_name: row.canonical_name.clone(),
                pattern,
                kind: row.match_kind,
            });
        }

        // Stable sort keeps insertion order on ties.
        rules.sort_by_cached_key(|rule| {
            let tier = match rule.kind {
                MatchKind::Exact => 0u8,
                MatchKind::Contains => 1u8,
            };
            (tier, Reverse(rule.pattern.chars().count()))
        });

        Self { rules }
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> &[SynonymRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SynonymRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
