//! First-match-wins canonical resolution.

use crate::normalize::normalize;
use crate::rules::{IngredientRuleSet, MatchKind, SynonymRule};

/// Resolves raw ingredient text to a canonical ingredient, if any rule
/// matches.
///
/// The input is normalized, then the rule list is scanned in precedence
/// order and the first matching rule wins. Because
/// [`IngredientRuleSet::build`] sorts exact rules first and longer patterns
/// before shorter ones, an exact hit always beats a substring hit and
/// `"pea protein"` beats `"pea"` for the token `"pea protein isolate"`.
///
/// Returns `None` when the text normalizes to the empty string or no rule
/// matches. Unmatched is not an error: callers decide whether to surface the
/// raw text as an unmapped ingredient.
///
/// ```rust
/// use ingredients::{resolve, CanonicalEntry, IngredientRuleSet};
/// use uuid::Uuid;
///
/// let chicken = CanonicalEntry { id: Uuid::from_u128(1), name: "Chicken Meal".into() };
/// let rules = IngredientRuleSet::build(&[chicken], &[]);
///
/// let hit = resolve("  CHICKEN   Meal ", &rules).unwrap();
/// assert_eq!(hit.canonical_name, "Chicken Meal");
/// assert!(resolve("dried kelp", &rules).is_none());
/// ```
pub fn resolve<'rules>(
    raw_text: &str,
    rules: &'rules IngredientRuleSet,
) -> Option<&'rules SynonymRule> {
    let token = normalize(raw_text);
    if token.is_empty() {
        return None;
    }
    rules.iter().find(|rule| match rule.kind {
        MatchKind::Exact => token == rule.pattern,
        MatchKind::Contains => token.contains(rule.pattern.as_str()),
    })
}
