//! Linguistic stemming for meme labels.
//!
//! A deliberately small suffix-stripping stemmer: it only needs to map the
//! inflected forms that appear in meme vocabularies onto a shared root, not
//! to be a complete English stemmer. Matching is exact over stems, so a
//! conservative reduction is safer than an aggressive one.

/// Minimum length a stem is allowed to shrink to.
const MIN_STEM_LEN: usize = 3;

/// Suffixes stripped from a label, longest first. At most one entry from
/// this table applies, after plural reduction.
const SUFFIXES: &[&str] = &["ness", "ity", "ing", "ed", "e"];

/// Reduces a label to its linguistic stem.
///
/// The label is lowercased and non-alphanumeric characters are dropped
/// before suffix stripping, so `"Dark!"` and `"dark"` stem identically.
///
/// # Example
/// ```
/// use chainwave_isometry::stem;
///
/// assert_eq!(stem("Intensity"), "intens");
/// assert_eq!(stem("intense"), "intens");
/// assert_eq!(stem("coolness"), "cool");
/// assert_eq!(stem("Dark"), "dark");
/// ```
pub fn stem(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    // Plural reduction: "memes" -> "meme", but keep "ss" endings intact.
    if s.len() > MIN_STEM_LEN && s.ends_with('s') && !s.ends_with("ss") {
        s.truncate(s.len() - 1);
    }

    for suffix in SUFFIXES {
        if s.ends_with(suffix) && s.len() - suffix.len() >= MIN_STEM_LEN {
            s.truncate(s.len() - suffix.len());
            break;
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::stem;

    #[test]
    fn reduces_inflected_forms_to_common_root() {
        assert_eq!(stem("Intensity"), "intens");
        assert_eq!(stem("intense"), "intens");
        assert_eq!(stem("coolness"), "cool");
        assert_eq!(stem("Cool"), "cool");
        assert_eq!(stem("darkness"), "dark");
        assert_eq!(stem("Dark"), "dark");
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(stem("DARK"), "dark");
        assert_eq!(stem("hyper-dark"), "hyperdark");
    }

    #[test]
    fn short_labels_survive_unchanged() {
        assert_eq!(stem("Jam"), "jam");
        assert_eq!(stem("bun"), "bun");
        assert_eq!(stem("As"), "as");
    }

    #[test]
    fn plural_reduction_keeps_double_s() {
        // "memes" -> plural strip -> "meme" -> final-e strip -> "mem",
        // the same stem "meme" itself reduces to.
        assert_eq!(stem("memes"), "mem");
        assert_eq!(stem("meme"), "mem");
        assert_eq!(stem("bass"), "bass");
    }
}
