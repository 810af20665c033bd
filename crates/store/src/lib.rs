//! # PetXref Catalog Store
//!
//! This crate provides a backend-agnostic store for the pet food product
//! catalog: brands, products, versioned ingredient lists, and the canonical
//! ingredient vocabulary with its synonym rules. It serves the read models
//! the API exposes and the raw rows the comparison engine consumes.
//!
//! ## Core Features
//!
//! - **Pluggable Backends**: Storage goes through the [`StoreBackend`]
//!   trait. Out of the box:
//!   - An in-memory backend for fast, ephemeral storage (ideal for testing).
//!   - The same backend seeded from a JSON [`CatalogSnapshot`] file, for
//!     running against a fixed catalog without a database.
//! - **Latest-version reads**: a product can have many ingredient list
//!   versions; every read model serves only the highest version.
//! - **Token resolution**: products are addressable by UUID or slug through
//!   one token type, preserving caller order.
//!
//! ## Key Concepts
//!
//! The central struct is [`CatalogStore`], a thin facade over the configured
//! backend. [`CatalogSnapshot`] is the whole catalog in relational shape and
//! doubles as the seed file format.
//!
//! ## Example Usage
//!
//! ```
//! use store::{BackendConfig, CatalogStore};
//!
//! let store = CatalogStore::new(BackendConfig::in_memory()).unwrap();
//! store.ping().unwrap();
//! assert!(store.list_products(20).unwrap().is_empty());
//! ```

mod backend;
mod snapshot;
mod types;

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

pub use crate::backend::{BackendConfig, InMemoryBackend, StoreBackend};
pub use crate::snapshot::CatalogSnapshot;
pub use crate::types::{
    Brand, BrandRef, IngredientItem, IngredientItemView, IngredientList, IngredientListView,
    IngredientOccurrence, IngredientSynonym, OccurrenceFilter, Product, ProductDetail, ProductRef,
    ProductSummary, SearchFilter, UnmappedItem, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
};
pub use ingredients::{CanonicalEntry, SynonymRow};

/// Custom error type
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn snapshot<E: std::fmt::Display>(err: E) -> Self {
        Self::Snapshot(err.to_string())
    }
}

/// Catalog facade over the configured backend.
pub struct CatalogStore {
    /// The backend used for storage, abstracted behind a trait.
    backend: Box<dyn StoreBackend>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore").finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Initialize a store using the configured backend.
    /// This will build the backend from the config.
    pub fn new(cfg: BackendConfig) -> Result<Self, StoreError> {
        let backend = cfg.build()?;
        Ok(Self::with_backend(backend))
    }

    /// Build a store with a custom backend (e.g., in-memory for tests).
    /// This is useful for dependency injection and testing.
    pub fn with_backend(backend: Box<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Cheap connectivity check against the backend.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping()
    }

    /// Resolve product tokens (ids or slugs) in caller order, dropping
    /// unknown tokens.
    pub fn resolve_product_tokens(&self, tokens: &[String]) -> Result<Vec<ProductRef>, StoreError> {
        self.backend.resolve_product_tokens(tokens)
    }

    /// Ingredient lines of each product's latest list, flag-filtered.
    pub fn latest_occurrences(
        &self,
        product_ids: &[Uuid],
        filter: &OccurrenceFilter,
    ) -> Result<HashMap<Uuid, Vec<IngredientOccurrence>>, StoreError> {
        self.backend.latest_occurrences(product_ids, filter)
    }

    /// All synonym rows joined with canonical names, including inactive ones.
    pub fn rule_rows(&self) -> Result<Vec<SynonymRow>, StoreError> {
        self.backend.rule_rows()
    }

    /// The canonical ingredient vocabulary.
    pub fn canonical_entries(&self) -> Result<Vec<CanonicalEntry>, StoreError> {
        self.backend.canonical_entries()
    }

    /// Active products ordered by brand name then product name.
    pub fn list_products(&self, limit: usize) -> Result<Vec<ProductSummary>, StoreError> {
        self.backend.list_products(limit)
    }

    /// Filtered product search over active products.
    pub fn search_products(&self, filter: &SearchFilter) -> Result<Vec<ProductSummary>, StoreError> {
        self.backend.search_products(filter)
    }

    /// Full product view by id or slug token.
    pub fn product_detail(&self, token: &str) -> Result<Option<ProductDetail>, StoreError> {
        self.backend.product_detail(token)
    }

    /// Ingredient items with no canonical assignment yet.
    pub fn unmapped_items(&self) -> Result<Vec<UnmappedItem>, StoreError> {
        self.backend.unmapped_items()
    }

    /// Record a canonical assignment for one ingredient item.
    pub fn assign_canonical(&self, item_id: Uuid, canonical_id: Uuid) -> Result<(), StoreError> {
        self.backend.assign_canonical(item_id, canonical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingredients::MatchKind;
    use std::io::Write;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn sample_snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            brands: vec![
                Brand {
                    id: uuid(1),
                    slug: "acme".into(),
                    name: "Acme Pet Foods".into(),
                },
                Brand {
                    id: uuid(2),
                    slug: "bluff-creek".into(),
                    name: "Bluff Creek".into(),
                },
            ],
            products: vec![
                Product {
                    id: uuid(11),
                    slug: "acme-adult-chicken-rice".into(),
                    name: "Adult Chicken & Rice".into(),
                    species: "dog".into(),
                    format: "dry".into(),
                    life_stage: "adult".into(),
                    is_active: true,
                    brand_id: uuid(1),
                },
                Product {
                    id: uuid(12),
                    slug: "bluff-puppy-chicken-meal".into(),
                    name: "Puppy Chicken Meal".into(),
                    species: "dog".into(),
                    format: "dry".into(),
                    life_stage: "puppy".into(),
                    is_active: true,
                    brand_id: uuid(2),
                },
                Product {
                    id: uuid(13),
                    slug: "acme-retired-recipe".into(),
                    name: "Retired Recipe".into(),
                    species: "dog".into(),
                    format: "dry".into(),
                    life_stage: "adult".into(),
                    is_active: false,
                    brand_id: uuid(1),
                },
            ],
            ingredient_lists: vec![
                list(21, 11, 1),
                list(22, 11, 2),
                list(23, 12, 1),
            ],
            ingredient_items: vec![
                item(31, 21, "Corn", 0, false, false, None),
                item(32, 22, "Chicken", 0, false, false, None),
                item(33, 22, "Rice", 1, false, false, None),
                item(34, 22, "Salt", 2, false, true, None),
                item(35, 22, "Salmon Oil", 3, true, false, None),
                item(36, 23, "Chicken Meal", 0, false, false, None),
                item(37, 23, "Rice", 1, false, false, Some(uuid(42))),
            ],
            canonical_ingredients: vec![
                CanonicalEntry {
                    id: uuid(41),
                    name: "Chicken".into(),
                },
                CanonicalEntry {
                    id: uuid(42),
                    name: "Rice".into(),
                },
            ],
            synonyms: vec![
                IngredientSynonym {
                    id: uuid(51),
                    canonical_id: uuid(42),
                    synonym: "ground rice".into(),
                    match_kind: MatchKind::Contains,
                    is_active: true,
                },
                IngredientSynonym {
                    id: uuid(52),
                    canonical_id: uuid(41),
                    synonym: "chix".into(),
                    match_kind: MatchKind::Exact,
                    is_active: false,
                },
            ],
        }
    }

    fn list(n: u128, product: u128, version: i32) -> IngredientList {
        IngredientList {
            id: uuid(n),
            product_id: uuid(product),
            version,
            effective_date: None,
            source_type: Some("label".into()),
            source_ref: None,
            notes: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn item(
        n: u128,
        list: u128,
        raw: &str,
        order: i32,
        may_contain: bool,
        trace: bool,
        canonical: Option<Uuid>,
    ) -> IngredientItem {
        IngredientItem {
            id: uuid(n),
            ingredient_list_id: uuid(list),
            raw_text: raw.into(),
            order_index: order,
            is_may_contain: may_contain,
            is_trace: trace,
            canonical_id: canonical,
        }
    }

    fn sample_store() -> CatalogStore {
        let snapshot = sample_snapshot();
        snapshot.validate().expect("fixture is consistent");
        CatalogStore::with_backend(Box::new(InMemoryBackend::with_data(snapshot)))
    }

    #[test]
    fn resolves_tokens_in_order_with_echo() {
        let store = sample_store();
        let tokens = vec![
            uuid(12).to_string(),
            "acme-adult-chicken-rice".to_string(),
            "no-such-product".to_string(),
        ];
        let refs = store.resolve_product_tokens(&tokens).unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id, uuid(12));
        assert_eq!(refs[0].token, uuid(12).to_string());
        assert_eq!(refs[1].id, uuid(11));
        assert_eq!(refs[1].token, "acme-adult-chicken-rice");
    }

    #[test]
    fn resolves_uppercase_uuid_tokens() {
        let store = sample_store();
        let tokens = vec![uuid(11).to_string().to_uppercase()];
        let refs = store.resolve_product_tokens(&tokens).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, uuid(11));
    }

    #[test]
    fn occurrences_come_from_latest_version_only() {
        let store = sample_store();
        let occurrences = store
            .latest_occurrences(&[uuid(11)], &OccurrenceFilter::default())
            .unwrap();

        let lines: Vec<&str> = occurrences[&uuid(11)]
            .iter()
            .map(|o| o.raw_text.as_str())
            .collect();
        // Version 1 had "Corn"; the default filter also drops trace and
        // may-contain lines from version 2.
        assert_eq!(lines, vec!["Chicken", "Rice"]);
    }

    #[test]
    fn occurrence_filter_opts_flagged_lines_in() {
        let store = sample_store();
        let filter = OccurrenceFilter {
            include_trace: true,
            include_may_contain: true,
        };
        let occurrences = store.latest_occurrences(&[uuid(11)], &filter).unwrap();

        let lines: Vec<&str> = occurrences[&uuid(11)]
            .iter()
            .map(|o| o.raw_text.as_str())
            .collect();
        assert_eq!(lines, vec!["Chicken", "Rice", "Salt", "Salmon Oil"]);

        let trace_only = OccurrenceFilter {
            include_trace: true,
            include_may_contain: false,
        };
        let occurrences = store.latest_occurrences(&[uuid(11)], &trace_only).unwrap();
        let lines: Vec<&str> = occurrences[&uuid(11)]
            .iter()
            .map(|o| o.raw_text.as_str())
            .collect();
        assert_eq!(lines, vec!["Chicken", "Rice", "Salt"]);
    }

    #[test]
    fn occurrences_skip_products_without_lists() {
        let store = sample_store();
        let occurrences = store
            .latest_occurrences(&[uuid(13)], &OccurrenceFilter::default())
            .unwrap();
        assert!(occurrences.is_empty());
    }

    #[test]
    fn rule_rows_include_inactive_and_join_names() {
        let store = sample_store();
        let rows = store.rule_rows().unwrap();

        assert_eq!(rows.len(), 2);
        let inactive = rows.iter().find(|r| !r.is_active).unwrap();
        assert_eq!(inactive.synonym, "chix");
        assert_eq!(inactive.canonical_name, "Chicken");

        let entries = store.canonical_entries().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn list_products_orders_by_brand_then_name_and_skips_inactive() {
        let store = sample_store();
        let products = store.list_products(DEFAULT_LIST_LIMIT).unwrap();

        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["acme-adult-chicken-rice", "bluff-puppy-chicken-meal"]);
        assert_eq!(products[0].brand.name, "Acme Pet Foods");

        let truncated = store.list_products(1).unwrap();
        assert_eq!(truncated.len(), 1);
    }

    #[test]
    fn search_filters_fields_and_exclusions() {
        let store = sample_store();

        let puppies = store
            .search_products(&SearchFilter {
                species: Some("dog".into()),
                life_stage: Some("puppy".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(puppies.len(), 1);
        assert_eq!(puppies[0].id, uuid(12));

        // Product 12's latest list has an item assigned to canonical Rice.
        let without_rice = store
            .search_products(&SearchFilter {
                exclude_canonical_ids: vec![uuid(42)],
                ..Default::default()
            })
            .unwrap();
        let ids: Vec<Uuid> = without_rice.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![uuid(11)]);
    }

    #[test]
    fn product_detail_serves_latest_list() {
        let store = sample_store();

        let detail = store
            .product_detail("acme-adult-chicken-rice")
            .unwrap()
            .expect("product exists");
        let list = detail.ingredient_list.expect("has a list");
        assert_eq!(list.version, 2);
        let raw: Vec<&str> = list.items.iter().map(|i| i.raw_text.as_str()).collect();
        assert_eq!(raw, vec!["Chicken", "Rice", "Salt", "Salmon Oil"]);

        let by_id = store
            .product_detail(&uuid(12).to_string())
            .unwrap()
            .expect("product exists");
        assert_eq!(by_id.slug, "bluff-puppy-chicken-meal");

        // Inactive products still resolve in detail lookups.
        let retired = store.product_detail("acme-retired-recipe").unwrap().unwrap();
        assert!(!retired.is_active);
        assert!(retired.ingredient_list.is_none());

        assert!(store.product_detail("nope").unwrap().is_none());
    }

    #[test]
    fn unmapped_and_assignment_roundtrip() {
        let store = sample_store();

        let unmapped = store.unmapped_items().unwrap();
        let ids: Vec<Uuid> = unmapped.iter().map(|i| i.id).collect();
        assert!(ids.contains(&uuid(36)));
        assert!(!ids.contains(&uuid(37)));

        store.assign_canonical(uuid(36), uuid(41)).unwrap();
        let after = store.unmapped_items().unwrap();
        assert!(!after.iter().any(|i| i.id == uuid(36)));

        let err = store.assign_canonical(uuid(999), uuid(41)).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn snapshot_file_backend_roundtrip() {
        let snapshot = sample_snapshot();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string_pretty(&snapshot).expect("serialize snapshot");
        file.write_all(json.as_bytes()).expect("write snapshot");

        let path = file.path().to_string_lossy().to_string();
        let store = CatalogStore::new(BackendConfig::snapshot(path)).unwrap();
        let products = store.list_products(DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn snapshot_file_backend_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ definitely not a snapshot")
            .expect("write garbage");

        let path = file.path().to_string_lossy().to_string();
        let err = CatalogStore::new(BackendConfig::snapshot(path)).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
    }

    #[test]
    fn missing_snapshot_file_is_an_error() {
        let err = CatalogStore::new(BackendConfig::snapshot("/no/such/file.json")).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
    }
}
