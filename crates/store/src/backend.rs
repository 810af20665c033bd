use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::snapshot::CatalogSnapshot;
use crate::types::{
    IngredientOccurrence, OccurrenceFilter, ProductDetail, ProductRef, ProductSummary,
    SearchFilter, UnmappedItem,
};
use crate::StoreError;
use ingredients::{CanonicalEntry, SynonymRow};

/// Trait for a catalog storage backend.
/// This allows for different storage implementations (e.g., in-memory, snapshot file).
pub trait StoreBackend: Send + Sync {
    /// Cheap connectivity check.
    fn ping(&self) -> Result<(), StoreError>;
    /// Resolve caller-supplied tokens (ids or slugs) to products, in input
    /// order. Unknown tokens are dropped, not errors.
    fn resolve_product_tokens(&self, tokens: &[String]) -> Result<Vec<ProductRef>, StoreError>;
    /// Ingredient lines of each product's latest list, flag-filtered.
    /// Products without any ingredient list are absent from the map.
    fn latest_occurrences(
        &self,
        product_ids: &[Uuid],
        filter: &OccurrenceFilter,
    ) -> Result<HashMap<Uuid, Vec<IngredientOccurrence>>, StoreError>;
    /// All synonym rows joined with canonical names, including inactive ones.
    fn rule_rows(&self) -> Result<Vec<SynonymRow>, StoreError>;
    /// The canonical ingredient vocabulary.
    fn canonical_entries(&self) -> Result<Vec<CanonicalEntry>, StoreError>;
    /// Active products ordered by brand name then product name.
    fn list_products(&self, limit: usize) -> Result<Vec<ProductSummary>, StoreError>;
    /// Filtered product search over active products.
    fn search_products(&self, filter: &SearchFilter) -> Result<Vec<ProductSummary>, StoreError>;
    /// Full product view by id or slug token, with the latest ingredient list.
    fn product_detail(&self, token: &str) -> Result<Option<ProductDetail>, StoreError>;
    /// Ingredient items with no canonical assignment yet, across all lists.
    fn unmapped_items(&self) -> Result<Vec<UnmappedItem>, StoreError>;
    /// Record a canonical assignment for one ingredient item.
    fn assign_canonical(&self, item_id: Uuid, canonical_id: Uuid) -> Result<(), StoreError>;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // Seeded from a JSON snapshot file
/// let config = BackendConfig::snapshot("/data/catalog.json");
/// ```
#[derive(Clone, Debug, Default)]
pub enum BackendConfig {
    /// Load a JSON catalog snapshot from `path` and serve it from memory.
    /// Writes (canonical backfill) stay in memory; the file is never touched.
    Snapshot { path: String },
    /// Start from an empty in-memory catalog. This is useful for testing.
    #[default]
    InMemory,
}

impl BackendConfig {
    /// Create an in-memory backend configuration.
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    /// Create a snapshot-file backend configuration.
    ///
    /// # Arguments
    /// * `path` - The JSON snapshot file to load at build time
    pub fn snapshot<P: Into<String>>(path: P) -> Self {
        BackendConfig::Snapshot { path: path.into() }
    }

    /// Build the backend based on the configuration.
    ///
    /// # Returns
    /// * `Ok(Box<dyn StoreBackend>)` - Successfully created backend
    /// * `Err(StoreError)` - Snapshot file missing, malformed, or inconsistent
    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Snapshot { path } => {
                let snapshot = CatalogSnapshot::from_json_file(path)?;
                Ok(Box::new(InMemoryBackend::with_data(snapshot)))
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a [`CatalogSnapshot`].
pub struct InMemoryBackend {
    data: RwLock<CatalogSnapshot>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_data(CatalogSnapshot::default())
    }

    /// Build a backend over pre-validated snapshot data.
    pub fn with_data(snapshot: CatalogSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn ping(&self) -> Result<(), StoreError> {
        self.data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(())
    }

    fn resolve_product_tokens(&self, tokens: &[String]) -> Result<Vec<ProductRef>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.resolve_tokens(tokens))
    }

    fn latest_occurrences(
        &self,
        product_ids: &[Uuid],
        filter: &OccurrenceFilter,
    ) -> Result<HashMap<Uuid, Vec<IngredientOccurrence>>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let mut occurrences = HashMap::with_capacity(product_ids.len());
        for &product_id in product_ids {
            if let Some(lines) = guard.occurrences(product_id, filter) {
                occurrences.insert(product_id, lines);
            }
        }
        Ok(occurrences)
    }

    fn rule_rows(&self) -> Result<Vec<SynonymRow>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.rule_rows())
    }

    fn canonical_entries(&self) -> Result<Vec<CanonicalEntry>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.canonical_ingredients.clone())
    }

    fn list_products(&self, limit: usize) -> Result<Vec<ProductSummary>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.active_summaries(limit))
    }

    fn search_products(&self, filter: &SearchFilter) -> Result<Vec<ProductSummary>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.search(filter))
    }

    fn product_detail(&self, token: &str) -> Result<Option<ProductDetail>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.detail(token))
    }

    fn unmapped_items(&self) -> Result<Vec<UnmappedItem>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.unmapped())
    }

    fn assign_canonical(&self, item_id: Uuid, canonical_id: Uuid) -> Result<(), StoreError> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if guard.assign_canonical(item_id, canonical_id) {
            Ok(())
        } else {
            Err(StoreError::backend(format!(
                "unknown ingredient item {item_id}"
            )))
        }
    }
}
