//! PetXref ingredient canonicalization layer.
//!
//! This crate turns messy label text into stable ingredient identity.
//! Downstream stages (catalog store, comparison engine) rely on it for
//! grouping the same ingredient across products.
//!
//! ## What we do
//!
//! - Normalize raw ingredient text (trim, lowercase, collapse whitespace)
//! - Compile canonical names plus synonym rows into an ordered rule set
//! - Resolve tokens against the rule set, first match wins
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no OS/locale dependence. The same text and the
//! same rules give the same result on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Patterns are normalized at compile time, tokens at resolve time, with
//!   the same [`normalize`] function
//! - Exact rules always outrank contains rules; within a tier, longer
//!   patterns outrank shorter ones
//! - Inactive synonym rows and blank patterns never become rules
//!
//! Bottom line: resolution order is decided once, in [`IngredientRuleSet::build`].

mod normalize;
mod resolve;
mod rules;

pub use crate::normalize::{normalize, NORMALIZATION};
pub use crate::resolve::resolve;
pub use crate::rules::{CanonicalEntry, IngredientRuleSet, MatchKind, SynonymRow, SynonymRule};
