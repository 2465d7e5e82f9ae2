use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Localized content for a single language, as returned by the portal API.
///
/// The API returns one object per language, tagged with its code. Everything
/// besides the tag and the display label is feature-keyed content (menu,
/// auth, pricing, ...) that this crate treats as opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleDocument {
    /// Language code this document belongs to (e.g. "cz", "en", "ru")
    pub lang: String,
    /// Display label shown by language switchers (e.g. "CZ", "EN")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Feature-keyed translated content, kept opaque
    #[serde(flatten)]
    pub sections: BTreeMap<String, Value>,
}

impl LocaleDocument {
    /// Get one feature section (e.g. "menu") if the document carries it
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }
}

/// The full set of locale documents returned by one bundle fetch.
///
/// Holds at most one document per language code. The API is expected to
/// respect that, but a duplicate in the payload keeps the first occurrence
/// and logs the rest rather than failing the fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Vec<LocaleDocument>", into = "Vec<LocaleDocument>")]
pub struct LanguageBundle {
    documents: Vec<LocaleDocument>,
}

impl LanguageBundle {
    pub fn new(documents: Vec<LocaleDocument>) -> Self {
        let mut deduped: Vec<LocaleDocument> = Vec::with_capacity(documents.len());
        for doc in documents {
            if deduped.iter().any(|d| d.lang == doc.lang) {
                warn!("Duplicate locale document for '{}' in bundle, keeping first", doc.lang);
                continue;
            }
            deduped.push(doc);
        }
        Self { documents: deduped }
    }

    /// Look up the document for a language code
    pub fn get(&self, code: &str) -> Option<&LocaleDocument> {
        self.documents.iter().find(|doc| doc.lang == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Language codes in bundle order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.lang.as_str())
    }

    pub fn documents(&self) -> &[LocaleDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl From<Vec<LocaleDocument>> for LanguageBundle {
    fn from(documents: Vec<LocaleDocument>) -> Self {
        Self::new(documents)
    }
}

impl From<LanguageBundle> for Vec<LocaleDocument> {
    fn from(bundle: LanguageBundle) -> Self {
        bundle.documents
    }
}
