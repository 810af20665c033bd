//! # PetXref Compare
//!
//! The cross-product comparison engine. Given two or more product tokens it
//! loads each product's latest ingredient list from the catalog store,
//! aggregates the lines under a comparison key, and partitions them into
//! ingredients shared by every product versus only some.
//!
//! ## Core Features
//!
//! - **Two modes**: [`CompareMode::Raw`] keys lines by their normalized text;
//!   [`CompareMode::Canonical`] resolves each line through the synonym rule
//!   set first, so "Rice" and "Ground Rice" count as one ingredient.
//! - **Cached rules**: the rule set is compiled from the store once per
//!   engine and shared across requests. A failed load is retried on the next
//!   canonical request rather than cached.
//! - **Deterministic output**: shared ingredients sort alphabetically;
//!   partial ones by descending product count, then alphabetically. Ties
//!   never reorder between runs.
//!
//! ## Key Concepts
//!
//! [`CompareEngine`] owns the store handle and the lazy rule cache.
//! [`ComparisonResult`] is the serializable outcome, with per-ingredient
//! counts and coverage in [`ScoredIngredient`]. The engine also drives the
//! canonical backfill job via [`backfill_unmapped`].
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use compare::{CompareEngine, CompareMode, CompareRequest};
//! use store::{CatalogStore, InMemoryBackend};
//!
//! let store = CatalogStore::with_backend(Box::new(InMemoryBackend::new()));
//! let engine = CompareEngine::new(Arc::new(store));
//!
//! let request = CompareRequest {
//!     product_tokens: vec!["acme-adult".into(), "bluff-puppy".into()],
//!     mode: CompareMode::Canonical,
//!     ..CompareRequest::default()
//! };
//! // The empty store resolves no products, so this reports a validation error.
//! assert!(engine.compare(&request).is_err());
//! ```

mod backfill;
mod engine;
mod types;

pub use crate::backfill::{backfill_unmapped, BackfillReport};
pub use crate::engine::CompareEngine;
pub use crate::types::{
    round4, CompareError, CompareMode, CompareNotes, CompareRequest, ComparisonKey,
    ComparisonResult, ScoredIngredient,
};
