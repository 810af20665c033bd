//! Relational catalog snapshot and its query logic.
//!
//! A [`CatalogSnapshot`] is the whole catalog as serializable tables. It is
//! the in-memory backend's working set and the on-disk seed format: a JSON
//! document with one array per table. All read-model queries live here so
//! backends stay thin.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use ingredients::CanonicalEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    Brand, BrandRef, IngredientItem, IngredientItemView, IngredientList, IngredientListView,
    IngredientOccurrence, IngredientSynonym, OccurrenceFilter, Product, ProductDetail, ProductRef,
    ProductSummary, SearchFilter, UnmappedItem,
};
use crate::StoreError;

/// The full catalog in relational shape.
///
/// Every field defaults to empty so partial documents parse; referential
/// integrity is checked separately by [`CatalogSnapshot::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub ingredient_lists: Vec<IngredientList>,
    #[serde(default)]
    pub ingredient_items: Vec<IngredientItem>,
    #[serde(default)]
    pub canonical_ingredients: Vec<CanonicalEntry>,
    #[serde(default)]
    pub synonyms: Vec<IngredientSynonym>,
}

impl CatalogSnapshot {
    /// Parses and validates a snapshot from a JSON string.
    pub fn from_json_str(data: &str) -> Result<Self, StoreError> {
        let snapshot: CatalogSnapshot = serde_json::from_str(data)
            .map_err(|e| StoreError::snapshot(format!("invalid snapshot JSON: {e}")))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reads, parses, and validates a snapshot file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| StoreError::snapshot(format!("read {}: {e}", path.display())))?;
        Self::from_json_str(&data)
    }

    /// Checks referential integrity and uniqueness across all tables.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut brand_ids = HashSet::new();
        for brand in &self.brands {
            if !brand_ids.insert(brand.id) {
                return Err(StoreError::snapshot(format!("duplicate brand id {}", brand.id)));
            }
        }

        let mut product_ids = HashSet::new();
        let mut slugs = HashSet::new();
        for product in &self.products {
            if !product_ids.insert(product.id) {
                return Err(StoreError::snapshot(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
            if !slugs.insert(product.slug.as_str()) {
                return Err(StoreError::snapshot(format!(
                    "duplicate product slug {}",
                    product.slug
                )));
            }
            if !brand_ids.contains(&product.brand_id) {
                return Err(StoreError::snapshot(format!(
                    "product {} references unknown brand {}",
                    product.slug, product.brand_id
                )));
            }
        }

        let mut list_ids = HashSet::new();
        let mut versions = HashSet::new();
        for list in &self.ingredient_lists {
            if !list_ids.insert(list.id) {
                return Err(StoreError::snapshot(format!(
                    "duplicate ingredient list id {}",
                    list.id
                )));
            }
            if !product_ids.contains(&list.product_id) {
                return Err(StoreError::snapshot(format!(
                    "ingredient list {} references unknown product {}",
                    list.id, list.product_id
                )));
            }
            if !versions.insert((list.product_id, list.version)) {
                return Err(StoreError::snapshot(format!(
                    "duplicate ingredient list version {} for product {}",
                    list.version, list.product_id
                )));
            }
        }

        let mut canonical_ids = HashSet::new();
        for canonical in &self.canonical_ingredients {
            if !canonical_ids.insert(canonical.id) {
                return Err(StoreError::snapshot(format!(
                    "duplicate canonical ingredient id {}",
                    canonical.id
                )));
            }
        }

        let mut item_ids = HashSet::new();
        for item in &self.ingredient_items {
            if !item_ids.insert(item.id) {
                return Err(StoreError::snapshot(format!(
                    "duplicate ingredient item id {}",
                    item.id
                )));
            }
            if !list_ids.contains(&item.ingredient_list_id) {
                return Err(StoreError::snapshot(format!(
                    "ingredient item {} references unknown list {}",
                    item.id, item.ingredient_list_id
                )));
            }
            if let Some(canonical_id) = item.canonical_id {
                if !canonical_ids.contains(&canonical_id) {
                    return Err(StoreError::snapshot(format!(
                        "ingredient item {} references unknown canonical {}",
                        item.id, canonical_id
                    )));
                }
            }
        }

        let mut synonym_ids = HashSet::new();
        for synonym in &self.synonyms {
            if !synonym_ids.insert(synonym.id) {
                return Err(StoreError::snapshot(format!(
                    "duplicate synonym id {}",
                    synonym.id
                )));
            }
            if !canonical_ids.contains(&synonym.canonical_id) {
                return Err(StoreError::snapshot(format!(
                    "synonym {} references unknown canonical {}",
                    synonym.id, synonym.canonical_id
                )));
            }
        }

        Ok(())
    }

    /// Looks a product up by token: UUID-shaped tokens resolve by id,
    /// anything else by slug.
    pub(crate) fn product_by_token(&self, token: &str) -> Option<&Product> {
        match Uuid::parse_str(token) {
            Ok(id) => self.products.iter().find(|p| p.id == id),
            Err(_) => self.products.iter().find(|p| p.slug == token),
        }
    }

    pub(crate) fn resolve_tokens(&self, tokens: &[String]) -> Vec<ProductRef> {
        tokens
            .iter()
            .filter_map(|token| {
                self.product_by_token(token).map(|product| ProductRef {
                    id: product.id,
                    slug: product.slug.clone(),
                    name: product.name.clone(),
                    token: token.clone(),
                })
            })
            .collect()
    }

    pub(crate) fn latest_list(&self, product_id: Uuid) -> Option<&IngredientList> {
        self.ingredient_lists
            .iter()
            .filter(|list| list.product_id == product_id)
            .max_by_key(|list| list.version)
    }

    /// Items of one list, in label order.
    fn list_items(&self, list_id: Uuid) -> Vec<&IngredientItem> {
        let mut items: Vec<&IngredientItem> = self
            .ingredient_items
            .iter()
            .filter(|item| item.ingredient_list_id == list_id)
            .collect();
        items.sort_by_key(|item| item.order_index);
        items
    }

    /// Ingredient lines of a product's latest list, flag-filtered. `None`
    /// when the product has no ingredient list at all.
    pub(crate) fn occurrences(
        &self,
        product_id: Uuid,
        filter: &OccurrenceFilter,
    ) -> Option<Vec<IngredientOccurrence>> {
        let list = self.latest_list(product_id)?;
        let occurrences = self
            .list_items(list.id)
            .into_iter()
            .filter(|item| filter.include_trace || !item.is_trace)
            .filter(|item| filter.include_may_contain || !item.is_may_contain)
            .map(|item| IngredientOccurrence {
                raw_text: item.raw_text.clone(),
                order_index: item.order_index,
                is_may_contain: item.is_may_contain,
                is_trace: item.is_trace,
            })
            .collect();
        Some(occurrences)
    }

    fn brand_ref(&self, brand_id: Uuid) -> Option<BrandRef> {
        self.brands.iter().find(|b| b.id == brand_id).map(|b| BrandRef {
            id: b.id,
            slug: b.slug.clone(),
            name: b.name.clone(),
        })
    }

    fn summary(&self, product: &Product) -> Option<ProductSummary> {
        let brand = self.brand_ref(product.brand_id)?;
        Some(ProductSummary {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            species: product.species.clone(),
            format: product.format.clone(),
            life_stage: product.life_stage.clone(),
            brand,
        })
    }

    fn sort_summaries(summaries: &mut [ProductSummary]) {
        summaries.sort_by(|a, b| {
            (a.brand.name.as_str(), a.name.as_str()).cmp(&(b.brand.name.as_str(), b.name.as_str()))
        });
    }

    /// Active products ordered by brand name then product name.
    pub(crate) fn active_summaries(&self, limit: usize) -> Vec<ProductSummary> {
        let mut summaries: Vec<ProductSummary> = self
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter_map(|p| self.summary(p))
            .collect();
        Self::sort_summaries(&mut summaries);
        summaries.truncate(limit);
        summaries
    }

    pub(crate) fn search(&self, filter: &SearchFilter) -> Vec<ProductSummary> {
        let excluded: HashSet<Uuid> = filter.exclude_canonical_ids.iter().copied().collect();
        let mut matches: Vec<ProductSummary> = self
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| filter.species.as_deref().map_or(true, |s| p.species == s))
            .filter(|p| filter.format.as_deref().map_or(true, |s| p.format == s))
            .filter(|p| filter.life_stage.as_deref().map_or(true, |s| p.life_stage == s))
            .filter(|p| excluded.is_empty() || !self.latest_mentions_any(p.id, &excluded))
            .filter_map(|p| self.summary(p))
            .collect();
        Self::sort_summaries(&mut matches);
        matches.truncate(filter.limit);
        matches
    }

    /// Whether the product's latest list mentions any of the given
    /// canonical ingredients. Flagged lines count too: exclusion is about
    /// presence on the label, not prominence.
    fn latest_mentions_any(&self, product_id: Uuid, excluded: &HashSet<Uuid>) -> bool {
        self.latest_list(product_id).map_or(false, |list| {
            self.ingredient_items.iter().any(|item| {
                item.ingredient_list_id == list.id
                    && item.canonical_id.map_or(false, |id| excluded.contains(&id))
            })
        })
    }

    pub(crate) fn detail(&self, token: &str) -> Option<ProductDetail> {
        let product = self.product_by_token(token)?;
        let brand = self.brand_ref(product.brand_id)?;
        let ingredient_list = self.latest_list(product.id).map(|list| IngredientListView {
            id: list.id,
            version: list.version,
            effective_date: list.effective_date,
            source_type: list.source_type.clone(),
            source_ref: list.source_ref.clone(),
            notes: list.notes.clone(),
            items: self
                .list_items(list.id)
                .into_iter()
                .map(|item| IngredientItemView {
                    id: item.id,
                    raw_text: item.raw_text.clone(),
                    order_index: item.order_index,
                    is_may_contain: item.is_may_contain,
                    is_trace: item.is_trace,
                    canonical_id: item.canonical_id,
                })
                .collect(),
        });
        Some(ProductDetail {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            species: product.species.clone(),
            format: product.format.clone(),
            life_stage: product.life_stage.clone(),
            is_active: product.is_active,
            brand,
            ingredient_list,
        })
    }

    /// Synonym rows joined with their canonical names, ready for rule
    /// compilation. Inactive rows are included; the compiler drops them.
    pub(crate) fn rule_rows(&self) -> Vec<ingredients::SynonymRow> {
        let names: HashMap<Uuid, &str> = self
            .canonical_ingredients
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();
        self.synonyms
            .iter()
            .filter_map(|synonym| {
                names.get(&synonym.canonical_id).map(|name| ingredients::SynonymRow {
                    canonical_id: synonym.canonical_id,
                    canonical_name: (*name).to_string(),
                    synonym: synonym.synonym.clone(),
                    match_kind: synonym.match_kind,
                    is_active: synonym.is_active,
                })
            })
            .collect()
    }

    pub(crate) fn unmapped(&self) -> Vec<UnmappedItem> {
        self.ingredient_items
            .iter()
            .filter(|item| item.canonical_id.is_none())
            .map(|item| UnmappedItem {
                id: item.id,
                raw_text: item.raw_text.clone(),
            })
            .collect()
    }

    pub(crate) fn assign_canonical(&mut self, item_id: Uuid, canonical_id: Uuid) -> bool {
        match self.ingredient_items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                item.canonical_id = Some(canonical_id);
                true
            }
            None => false,
        }
    }
}
