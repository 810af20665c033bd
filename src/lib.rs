//! Workspace umbrella crate for PetXref.
//!
//! PetXref is a product catalog for packaged pet food whose core feature is
//! comparing the ingredient lists of two or more products. This crate stitches
//! the domain crates together so callers can work against a single API entry
//! point:
//!
//! - `ingredients`: label-text normalization, the synonym rule set, and
//!   first-match-wins canonical resolution
//! - `store`: the backend-agnostic catalog store (in-memory, or seeded from a
//!   JSON snapshot file)
//! - `compare`: the cross-product comparison engine with its process-lifetime
//!   rule cache
//!
//! The HTTP edge lives in the separate `petxref-server` crate; nothing here
//! depends on a runtime.
//!
//! ```
//! use std::sync::Arc;
//!
//! use petxref::{CompareEngine, CompareMode, CompareRequest};
//!
//! let store = Arc::new(petxref::demo_store());
//! let engine = CompareEngine::new(store);
//!
//! let result = engine
//!     .compare(&CompareRequest {
//!         product_tokens: vec!["acme-adult-chicken".into(), "bluff-puppy-harvest".into()],
//!         mode: CompareMode::Canonical,
//!         ..CompareRequest::default()
//!     })
//!     .unwrap();
//! assert_eq!(result.product_count, 2);
//! ```

pub use compare::{
    backfill_unmapped, round4, BackfillReport, CompareEngine, CompareError, CompareMode,
    CompareNotes, CompareRequest, ComparisonKey, ComparisonResult, ScoredIngredient,
};
pub use ingredients::{
    normalize, resolve, CanonicalEntry, IngredientRuleSet, MatchKind, SynonymRow, SynonymRule,
    NORMALIZATION,
};
pub use store::{
    BackendConfig, Brand, CatalogSnapshot, CatalogStore, InMemoryBackend, IngredientItem,
    IngredientList, IngredientSynonym, OccurrenceFilter, Product, ProductRef, SearchFilter,
    StoreBackend, StoreError,
};

use uuid::Uuid;

/// A small seeded catalog: two dog foods from two brands, a canonical
/// ingredient vocabulary, and a couple of synonym rules. Backs the demo
/// binary and doc examples; real deployments load a snapshot file instead.
pub fn demo_snapshot() -> CatalogSnapshot {
    let acme = Uuid::from_u128(0x01);
    let bluff = Uuid::from_u128(0x02);
    let adult = Uuid::from_u128(0x11);
    let puppy = Uuid::from_u128(0x12);
    let adult_list = Uuid::from_u128(0x21);
    let puppy_list = Uuid::from_u128(0x22);
    let chicken = Uuid::from_u128(0x31);
    let rice = Uuid::from_u128(0x32);

    let item = |n: u128, list: Uuid, raw: &str, order: i32| IngredientItem {
        id: Uuid::from_u128(n),
        ingredient_list_id: list,
        raw_text: raw.to_string(),
        order_index: order,
        is_may_contain: false,
        is_trace: false,
        canonical_id: None,
    };

    CatalogSnapshot {
        brands: vec![
            Brand {
                id: acme,
                slug: "acme".into(),
                name: "Acme Pet Foods".into(),
            },
            Brand {
                id: bluff,
                slug: "bluff-creek".into(),
                name: "Bluff Creek".into(),
            },
        ],
        products: vec![
            Product {
                id: adult,
                slug: "acme-adult-chicken".into(),
                name: "Adult Chicken & Rice".into(),
                species: "dog".into(),
                format: "dry".into(),
                life_stage: "adult".into(),
                is_active: true,
                brand_id: acme,
            },
            Product {
                id: puppy,
                slug: "bluff-puppy-harvest".into(),
                name: "Puppy Harvest".into(),
                species: "dog".into(),
                format: "dry".into(),
                life_stage: "puppy".into(),
                is_active: true,
                brand_id: bluff,
            },
        ],
        ingredient_lists: vec![
            IngredientList {
                id: adult_list,
                product_id: adult,
                version: 1,
                effective_date: None,
                source_type: Some("label".into()),
                source_ref: None,
                notes: None,
            },
            IngredientList {
                id: puppy_list,
                product_id: puppy,
                version: 1,
                effective_date: None,
                source_type: Some("label".into()),
                source_ref: None,
                notes: None,
            },
        ],
        ingredient_items: vec![
            item(0x41, adult_list, "Chicken", 0),
            item(0x42, adult_list, "Brewers Rice", 1),
            item(0x43, adult_list, "Peas", 2),
            item(0x44, puppy_list, "Chicken Meal", 0),
            item(0x45, puppy_list, "Rice", 1),
            item(0x46, puppy_list, "Corn", 2),
        ],
        canonical_ingredients: vec![
            CanonicalEntry {
                id: chicken,
                name: "Chicken".into(),
            },
            CanonicalEntry {
                id: rice,
                name: "Rice".into(),
            },
        ],
        synonyms: vec![
            IngredientSynonym {
                id: Uuid::from_u128(0x51),
                canonical_id: chicken,
                synonym: "chicken".into(),
                match_kind: MatchKind::Contains,
                is_active: true,
            },
            IngredientSynonym {
                id: Uuid::from_u128(0x52),
                canonical_id: rice,
                synonym: "rice".into(),
                match_kind: MatchKind::Contains,
                is_active: true,
            },
        ],
    }
}

/// An in-memory [`CatalogStore`] seeded with [`demo_snapshot`].
pub fn demo_store() -> CatalogStore {
    CatalogStore::with_backend(Box::new(InMemoryBackend::with_data(demo_snapshot())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_snapshot_is_internally_consistent() {
        demo_snapshot().validate().expect("demo data is consistent");
    }

    #[test]
    fn demo_store_serves_both_products() {
        let store = demo_store();
        let products = store.list_products(20).unwrap();
        assert_eq!(products.len(), 2);
    }
}
