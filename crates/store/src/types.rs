//! Catalog record and view types.
//!
//! The first group of structs mirrors the relational shape of the catalog
//! (one struct per table). The second group holds the read-model views the
//! API serves, already joined and trimmed to what clients see.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const fn default_true() -> bool {
    true
}

/// Default page size for the product listing.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Default page size for product search.
pub const DEFAULT_SEARCH_LIMIT: usize = 25;

/// A pet food brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// A product in the catalog. Products carry a URL-safe `slug` in addition to
/// their id; both work as lookup tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub species: String,
    pub format: String,
    pub life_stage: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub brand_id: Uuid,
}

/// One version of a product's ingredient list. Only the highest `version`
/// per product is ever served; older versions stay for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientList {
    pub id: Uuid,
    pub product_id: Uuid,
    pub version: i32,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One line of an ingredient list, in label order.
///
/// `canonical_id` is populated lazily by the backfill operation once the
/// synonym rules can resolve `raw_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientItem {
    pub id: Uuid,
    pub ingredient_list_id: Uuid,
    pub raw_text: String,
    pub order_index: i32,
    #[serde(default)]
    pub is_may_contain: bool,
    #[serde(default)]
    pub is_trace: bool,
    #[serde(default)]
    pub canonical_id: Option<Uuid>,
}

/// A stored synonym rule row. `match_kind` and activity semantics are
/// defined by the `ingredients` crate, which compiles these rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSynonym {
    pub id: Uuid,
    pub canonical_id: Uuid,
    pub synonym: String,
    pub match_kind: ingredients::MatchKind,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A resolved product token: which product a caller-supplied token landed
/// on, with the original token echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub token: String,
}

/// Brand fields embedded in product views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRef {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// One row of the product listing and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub species: String,
    pub format: String,
    pub life_stage: String,
    pub brand: BrandRef,
}

/// Full product view: summary fields plus the latest ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub species: String,
    pub format: String,
    pub life_stage: String,
    pub is_active: bool,
    pub brand: BrandRef,
    pub ingredient_list: Option<IngredientListView>,
}

/// The latest ingredient list of a product, with its items in label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientListView {
    pub id: Uuid,
    pub version: i32,
    pub effective_date: Option<NaiveDate>,
    pub source_type: Option<String>,
    pub source_ref: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<IngredientItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientItemView {
    pub id: Uuid,
    pub raw_text: String,
    pub order_index: i32,
    pub is_may_contain: bool,
    pub is_trace: bool,
    pub canonical_id: Option<Uuid>,
}

/// One ingredient line as consumed by the comparison engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientOccurrence {
    pub raw_text: String,
    pub order_index: i32,
    pub is_may_contain: bool,
    pub is_trace: bool,
}

/// An ingredient item that has no canonical assignment yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedItem {
    pub id: Uuid,
    pub raw_text: String,
}

/// Search criteria for the product catalog. All field filters are exact
/// matches; `exclude_canonical_ids` drops products whose latest ingredient
/// list mentions any of the given canonical ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub species: Option<String>,
    pub format: Option<String>,
    pub life_stage: Option<String>,
    pub exclude_canonical_ids: Vec<Uuid>,
    pub limit: usize,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            species: None,
            format: None,
            life_stage: None,
            exclude_canonical_ids: Vec::new(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Which flagged occurrences to include when fetching ingredient lines.
/// Trace and may-contain lines are excluded unless opted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OccurrenceFilter {
    pub include_trace: bool,
    pub include_may_contain: bool,
}
