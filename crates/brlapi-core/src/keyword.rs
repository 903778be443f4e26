//! Abbreviation-resolving keyword dictionary.
//!
//! A [`KeywordMap`] lets a user type only as much of a keyword as is needed
//! to tell it apart from every other registered keyword.  It is used to look
//! up parameter names (`cursor-blink-pe` is ambiguous between
//! `cursor-blink-period` and `cursor-blink-percentage`, but
//! `cursor-blink-peri` is not), boolean operands (`y` → `yes`), and tool
//! command names.
//!
//! # How abbreviation resolution works (for beginners)
//!
//! Every keyword is stored twice:
//!
//! - In the **exact** table under its full lowercase form.
//! - In the **alias** table under each of its proper, non-empty prefixes.
//!
//! When two keywords share a prefix, that prefix's alias entry is demoted to
//! [`Alias::Ambiguous`] and can never resolve again.  For example, after
//! inserting `off` and `on`:
//!
//! | Input | Result                |
//! |-------|-----------------------|
//! | `off` | exact match           |
//! | `of`  | alias → `off`         |
//! | `o`   | ambiguous → `None`    |
//!
//! Lookups try the exact table first, then make a single hop through the
//! alias table.  Matching is case-insensitive.
//!
//! # Re-inserting a keyword
//!
//! Calling [`KeywordMap::put`] with a keyword that is already present
//! replaces its value and keeps its original position in
//! [`KeywordMap::keywords`].  The alias table is unaffected because the
//! keyword's prefixes already point at it.

use std::collections::HashMap;

/// State of one prefix in the alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Alias {
    /// Exactly one registered keyword starts with this prefix.
    Unique(String),
    /// Two or more registered keywords start with this prefix.
    Ambiguous,
}

/// A case-insensitive keyword dictionary with unique-prefix resolution.
///
/// # Examples
///
/// ```rust
/// use brlapi_core::KeywordMap;
///
/// let mut map = KeywordMap::new();
/// map.put("driver-name", 1);
/// map.put("driver-code", 2);
///
/// assert_eq!(map.get("driver-n"), Some(&1));
/// assert_eq!(map.get("DRIVER-C"), Some(&2));
/// assert_eq!(map.get("driver"), None); // shared by both keywords
/// ```
#[derive(Debug, Clone)]
pub struct KeywordMap<V> {
    exact: HashMap<String, V>,
    alias: HashMap<String, Alias>,
    /// Full keywords in insertion order.
    order: Vec<String>,
}

impl<V> KeywordMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            alias: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers `keyword` (case-insensitively) as a full match for `value`.
    ///
    /// Every proper prefix of the keyword becomes an abbreviation for it
    /// unless another keyword already shares that prefix, in which case the
    /// prefix is marked ambiguous for both.
    pub fn put(&mut self, keyword: &str, value: V) {
        let keyword = keyword.to_lowercase();

        if self.exact.insert(keyword.clone(), value).is_some() {
            return;
        }

        for (end, _) in keyword.char_indices().skip(1) {
            let prefix = &keyword[..end];

            match self.alias.get_mut(prefix) {
                None => {
                    self.alias
                        .insert(prefix.to_string(), Alias::Unique(keyword.clone()));
                }
                Some(entry) => {
                    if let Alias::Unique(existing) = entry {
                        if *existing != keyword {
                            tracing::trace!(prefix, "keyword prefix became ambiguous");
                            *entry = Alias::Ambiguous;
                        }
                    }
                }
            }
        }

        self.order.push(keyword);
    }

    /// Resolves `text` to a value.
    ///
    /// Tries an exact (case-insensitive) keyword match first, then a unique
    /// abbreviation.  Returns `None` for unknown or ambiguous input, and for
    /// the empty string.
    pub fn get(&self, text: &str) -> Option<&V> {
        let text = text.to_lowercase();

        if let Some(value) = self.exact.get(&text) {
            return Some(value);
        }

        match self.alias.get(&text)? {
            Alias::Unique(keyword) => self.exact.get(keyword),
            Alias::Ambiguous => None,
        }
    }

    /// Returns the full keyword `text` resolves to, if any.
    pub fn resolve_keyword(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();

        if let Some((keyword, _)) = self.exact.get_key_value(&text) {
            return Some(keyword.as_str());
        }

        match self.alias.get(&text)? {
            Alias::Unique(keyword) => Some(keyword.as_str()),
            Alias::Ambiguous => None,
        }
    }

    /// Returns all full keywords in insertion order.
    pub fn keywords(&self) -> &[String] {
        &self.order
    }

    /// Number of full keywords registered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no keyword has been registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<V> Default for KeywordMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
