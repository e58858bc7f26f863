//! # Language Catalog
//!
//! The languages offered for selection, rebuilt from scratch on every
//! configuration change. Source and target lists always come from the same
//! catalog instance.

use crate::translator::Language;

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_TARGET_LANGUAGE: &str = "it";

/// Languages ordered by display name (code breaks ties).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl LanguageCatalog {
    pub fn new(mut languages: Vec<Language>) -> Self {
        languages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        languages.dedup_by(|a, b| a.code == b.code);
        Self { languages }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Display name for `code`, falling back to the code itself.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(|l| l.name.as_str()).unwrap_or(code)
    }

    /// Keeps `previous` if this catalog still offers it, else `default`,
    /// else the first entry. Returns `default` when the catalog is empty.
    pub fn preserve_or<'a>(&'a self, previous: &'a str, default: &'a str) -> &'a str {
        if self.contains(previous) {
            previous
        } else if self.contains(default) || self.is_empty() {
            default
        } else {
            self.languages.first().map(|l| l.code.as_str()).unwrap_or(default)
        }
    }
}
