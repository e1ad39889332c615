//! Two-level string catalogs: `category -> key -> value`.
//!
//! A `Catalog` is the unit every reconciliation stage consumes and produces.
//! Both levels keep insertion order so a catalog written back to disk lists
//! its categories and keys in the order they were read (new entries go last).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys of one category mapped to their (possibly missing) value.
///
/// `None` is a JSON `null`, i.e. a key that exists but has no text yet.
pub type Entries = IndexMap<String, Option<String>>;

/// An ordered two-level mapping of localized strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: IndexMap<String, Entries>,
}

/// Whether a value counts as "not yet translated" (missing, `null` or empty).
pub fn is_untranslated(value: Option<&Option<String>>) -> bool {
    match value {
        Some(Some(text)) => text.is_empty(),
        _ => true,
    }
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text.
    ///
    /// The document must be an object of objects whose leaves are strings or `null`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Render the catalog as JSON indented with two spaces.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn category(&self, name: &str) -> Option<&Entries> {
        self.categories.get(name)
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Get a category for writing, creating it (empty, at the end) if absent.
    pub fn category_mut(&mut self, name: &str) -> &mut Entries {
        self.categories.entry(name.to_string()).or_default()
    }

    /// Value stored at `category.key`, `None` if the key is missing or `null`.
    pub fn value(&self, category: &str, key: &str) -> Option<&str> {
        self.categories
            .get(category)
            .and_then(|entries| entries.get(key))
            .and_then(|value| value.as_deref())
    }

    /// Raw slot at `category.key`, distinguishing a missing key from a `null` one.
    pub fn slot(&self, category: &str, key: &str) -> Option<&Option<String>> {
        self.categories
            .get(category)
            .and_then(|entries| entries.get(key))
    }

    /// Set `category.key`, creating the category if needed.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        key: impl Into<String>,
        value: Option<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Keep only the categories (and keys inside them) accepted by the predicates.
    pub fn retain<C, K>(&mut self, mut keep_category: C, mut keep_key: K)
    where
        C: FnMut(&str) -> bool,
        K: FnMut(&str, &str) -> bool,
    {
        self.categories.retain(|category, _| keep_category(category.as_str()));
        for (category, entries) in self.categories.iter_mut() {
            entries.retain(|key, _| keep_key(category.as_str(), key.as_str()));
        }
    }

    /// Iterate categories in order
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Entries> {
        self.categories.iter()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Total number of keys across all categories.
    pub fn entry_count(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    /// True when no category holds any key (a catalog of empty categories counts).
    pub fn has_no_entries(&self) -> bool {
        self.entry_count() == 0
    }
}

impl IntoIterator for Catalog {
    type Item = (String, Entries);
    type IntoIter = indexmap::map::IntoIter<String, Entries>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a String, &'a Entries);
    type IntoIter = indexmap::map::Iter<'a, String, Entries>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

impl FromIterator<(String, Entries)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Entries)>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Parsing Tests ====================

    #[test]
    fn test_from_json_keeps_order() {
        let catalog =
            Catalog::from_json(r#"{"zeta": {"b": "B", "a": "A"}, "alpha": {}}"#).unwrap();

        let names: Vec<&str> = catalog.category_names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let keys: Vec<&String> = catalog.category("zeta").unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_from_value_keeps_written_order() {
        let catalog: Catalog = serde_json::from_value(serde_json::json!({
            "zeta": {"two": "2", "one": "1", "three": "3"},
            "alpha": {}
        }))
        .unwrap();

        let names: Vec<&str> = catalog.category_names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let keys: Vec<&String> = catalog.category("zeta").unwrap().keys().collect();
        assert_eq!(keys, vec!["two", "one", "three"]);
    }

    #[test]
    fn test_from_json_accepts_null_values() {
        let catalog = Catalog::from_json(r#"{"menu": {"open": null}}"#).unwrap();

        assert_eq!(catalog.slot("menu", "open"), Some(&None));
        assert_eq!(catalog.value("menu", "open"), None);
    }

    #[test]
    fn test_from_json_rejects_deeper_nesting() {
        assert!(Catalog::from_json(r#"{"menu": {"open": {"deep": "x"}}}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_object_root() {
        assert!(Catalog::from_json(r#"["menu"]"#).is_err());
    }

    #[test]
    fn test_to_pretty_json_uses_two_space_indent() {
        let mut catalog = Catalog::new();
        catalog.insert("greeting", "hello", Some("Hello".to_string()));

        let json = catalog.to_pretty_json().unwrap();
        assert_eq!(json, "{\n  \"greeting\": {\n    \"hello\": \"Hello\"\n  }\n}");
    }

    // ==================== Access Tests ====================

    #[test]
    fn test_insert_creates_category() {
        let mut catalog = Catalog::new();
        catalog.insert("a", "x", Some("1".to_string()));

        assert!(catalog.contains_category("a"));
        assert_eq!(catalog.value("a", "x"), Some("1"));
        assert_eq!(catalog.entry_count(), 1);
    }

    #[test]
    fn test_category_mut_creates_empty_category_once() {
        let mut catalog = Catalog::new();
        catalog.category_mut("a").insert("x".to_string(), None);
        catalog.category_mut("a");

        assert_eq!(catalog.category_names().count(), 1);
        assert_eq!(catalog.entry_count(), 1);
    }

    #[test]
    fn test_has_no_entries_with_empty_categories() {
        let catalog = Catalog::from_json(r#"{"a": {}, "b": {}}"#).unwrap();
        assert!(catalog.has_no_entries());
        assert_eq!(catalog.category_names().count(), 2);
    }

    // ==================== Untranslated Tests ====================

    #[test]
    fn test_is_untranslated() {
        let empty = Some(String::new());
        let text = Some("Hi".to_string());

        assert!(is_untranslated(None));
        assert!(is_untranslated(Some(&None)));
        assert!(is_untranslated(Some(&empty)));
        assert!(!is_untranslated(Some(&text)));
    }

    #[test]
    fn test_equality_compares_content() {
        let a = Catalog::from_json(r#"{"a": {"x": "1"}}"#).unwrap();
        let b = Catalog::from_json(r#"{"a": {"x": "1"}}"#).unwrap();
        let c = Catalog::from_json(r#"{"a": {"x": "2"}}"#).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
