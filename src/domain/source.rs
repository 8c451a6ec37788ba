use std::collections::BTreeMap;

use crate::canonical::SourceKind;

/// One configured feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub address: String,
    pub lang: String,
    /// Canonicalization strategy, resolved once when the list is loaded.
    pub kind: SourceKind,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        lang: impl Into<String>,
        kind: SourceKind,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            lang: lang.into(),
            kind,
        }
    }
}

/// The fixed set of sources for the lifetime of the process, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    sources: BTreeMap<String, Source>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a source, replacing any earlier one with the same name.
    pub fn insert(&mut self, source: Source) -> Option<Source> {
        self.sources.insert(source.name.clone(), source)
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

impl FromIterator<Source> for SourceList {
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        let mut list = SourceList::new();
        for source in iter {
            list.insert(source);
        }
        list
    }
}
