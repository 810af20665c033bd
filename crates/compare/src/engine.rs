use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use ingredients::{normalize, resolve, IngredientRuleSet, NORMALIZATION};
use once_cell::sync::OnceCell;
use store::{CatalogStore, OccurrenceFilter, ProductRef};
use uuid::Uuid;

use crate::backfill::{backfill_unmapped, BackfillReport};
use crate::types::{
    round4, CompareError, CompareMode, CompareNotes, CompareRequest, ComparisonKey,
    ComparisonResult, ScoredIngredient,
};


/// Comparison engine over a shared catalog store.
///
/// The engine lazily loads the synonym rule set on the first canonical-mode
/// request and caches it for its lifetime. A failed load is not cached, so
/// the next request retries. There is no invalidation: rule edits are picked
/// up by restarting the process.
pub struct CompareEngine {
    store: Arc<CatalogStore>,
    rules: OnceCell<Arc<IngredientRuleSet>>,
}

/// Running tally for one grouping key, kept in first-seen order.
struct Aggregate {
    key: ComparisonKey,
    display: String,
    in_count: usize,
}

impl CompareEngine {
    /// Construct an engine over a shared store handle.
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            rules: OnceCell::new(),
        }
    }

    /// The compiled rule set, loading and caching it on first use.
    pub fn rule_set(&self) -> Result<Arc<IngredientRuleSet>, CompareError> {
        self.rules
            .get_or_try_init(|| {
                let canonicals = self.store.canonical_entries()?;
                let rows = self.store.rule_rows()?;
                let rules = IngredientRuleSet::build(&canonicals, &rows);
                tracing::info!(rules = rules.len(), "compiled ingredient rule set");
                Ok(Arc::new(rules))
            })
            .cloned()
    }

    /// Whether the rule cache is populated. Used by readiness reporting.
    pub fn rules_loaded(&self) -> bool {
        self.rules.get().is_some()
    }

    /// Compare the latest ingredient lists of at least two products.
    ///
    /// Tokens resolve in request order; duplicates of the same product and
    /// unknown tokens are dropped silently. Ingredients are counted at most
    /// once per product, partitioned into `in_all` / `in_some` by whether
    /// every compared product has them.
    pub fn compare(&self, request: &CompareRequest) -> Result<ComparisonResult, CompareError> {
        let started = Instant::now();

        if request.product_tokens.len() < 2 {
            return Err(CompareError::Validation(
                "product_tokens must be a list with at least 2 items".into(),
            ));
        }

        let resolved = self.store.resolve_product_tokens(&request.product_tokens)?;
        let mut products: Vec<ProductRef> = Vec::with_capacity(resolved.len());
        let mut seen_products = HashSet::new();
        for product in resolved {
            if seen_products.insert(product.id) {
                products.push(product);
            }
        }
        if products.len() < 2 {
            return Err(CompareError::Validation(
                "At least 2 valid products are required".into(),
            ));
        }

        let rules = match request.mode {
            CompareMode::Canonical => Some(self.rule_set()?),
            CompareMode::Raw => None,
        };

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let filter = OccurrenceFilter {
            include_trace: request.include_trace,
            include_may_contain: request.include_may_contain,
        };
        let occurrences = self.store.latest_occurrences(&product_ids, &filter)?;

        // Aggregate in first-seen order so equal-count ties sort
        // deterministically regardless of hash iteration order.
        let mut slots: HashMap<ComparisonKey, usize> = HashMap::new();
        let mut aggregates: Vec<Aggregate> = Vec::new();
        for product in &products {
            let lines = occurrences
                .get(&product.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let mut seen: HashSet<ComparisonKey> = HashSet::new();
            for line in lines {
                let raw = line.raw_text.trim();
                if raw.is_empty() {
                    continue;
                }
                let (key, display) = match &rules {
                    None => (ComparisonKey::Raw(normalize(raw)), raw.to_string()),
                    Some(rules) => match resolve(raw, rules) {
                        Some(rule) => (
                            ComparisonKey::Canonical(rule.canonical_id),
                            rule.canonical_name.clone(),
                        ),
                        None => (
                            ComparisonKey::Unmapped(normalize(raw)),
                            format!("(unmapped) {raw}"),
                        ),
                    },
                };
                // Count each key once per product.
                if !seen.insert(key.clone()) {
                    continue;
                }
                match slots.get(&key) {
                    Some(&slot) => aggregates[slot].in_count += 1,
                    None => {
                        slots.insert(key.clone(), aggregates.len());
                        aggregates.push(Aggregate {
                            key,
                            display,
                            in_count: 1,
                        });
                    }
                }
            }
        }

        let product_count = products.len();
        let mut in_all = Vec::new();
        let mut in_some = Vec::new();
        for aggregate in aggregates {
            let Aggregate {
                key,
                display,
                in_count,
            } = aggregate;
            let scored = ScoredIngredient {
                ingredient: display,
                ingredient_key: key,
                in_count,
                percent: round4(in_count as f64 / product_count as f64),
            };
            if in_count == product_count {
                in_all.push(scored);
            } else {
                in_some.push(scored);
            }
        }
        in_all.sort_by_cached_key(|entry| entry.ingredient.to_lowercase());
        in_some.sort_by_cached_key(|entry| (Reverse(entry.in_count), entry.ingredient.to_lowercase()));

        metrics::counter!("petxref_compare_total", "mode" => request.mode.as_str()).increment(1);
        metrics::histogram!("petxref_compare_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(
            mode = request.mode.as_str(),
            products = product_count,
            in_all = in_all.len(),
            in_some = in_some.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "comparison complete"
        );

        Ok(ComparisonResult {
            product_count,
            products,
            in_all,
            in_some,
            notes: CompareNotes {
                mode: request.mode,
                normalization: NORMALIZATION,
                trace_included: request.include_trace,
                may_contain_included: request.include_may_contain,
            },
        })
    }

    /// Resolve and persist canonical ids for unmapped catalog items, using
    /// the cached rule set.
    pub fn backfill(&self) -> Result<BackfillReport, CompareError> {
        let rules = self.rule_set()?;
        backfill_unmapped(&self.store, &rules)
    }
}
