//! Ingredient text normalization.
//!
//! Raw ingredient text comes from scanned labels and manual entry, so the same
//! ingredient shows up as `"Chicken Meal"`, `"  chicken   meal "`, or
//! `"CHICKEN MEAL"`. [`normalize`] maps all of those to one token so the rest
//! of the system can compare by equality.

/// Short label describing the normalization scheme, echoed in comparison
/// output so clients can tell how tokens were produced.
pub const NORMALIZATION: &str = "trim+lower+collapse_spaces";

/// Normalizes raw ingredient text into its comparison token.
///
/// # Algorithm
///
/// 1. Lowercase the input (Unicode-aware)
/// 2. Split on any Unicode whitespace sequence
/// 3. Join the segments with single ASCII spaces
///
/// The result has no leading or trailing whitespace and never contains two
/// consecutive spaces, which makes the function idempotent: normalizing an
/// already-normalized token returns it unchanged.
///
/// # Examples
///
/// ```rust
/// use ingredients::normalize;
///
/// assert_eq!(normalize("  Chicken   Meal "), "chicken meal");
/// assert_eq!(normalize("Salmon\tOil"), "salmon oil");
/// assert_eq!(normalize("   \n\t "), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    for segment in lowered.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
