use std::collections::BTreeMap;

use super::SourceKind;

/// Maps source names to their canonicalization strategy.
///
/// Sources absent from the registry use [`SourceKind::Default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRegistry {
    kinds: BTreeMap<String, SourceKind>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let kinds = [
            ("xinhua", SourceKind::StripQuotesAscii),
            ("upi", SourceKind::Ascii),
            ("zaman", SourceKind::WorldPrefix),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();

        Self { kinds }
    }
}

impl KindRegistry {
    /// Layer configured entries over this registry.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a SourceKind)>,
    {
        for (name, kind) in overrides {
            self.kinds.insert(name.clone(), *kind);
        }
        self
    }

    pub fn kind_for(&self, source_name: &str) -> SourceKind {
        self.kinds.get(source_name).copied().unwrap_or_default()
    }

    /// Registry entries that name none of the given sources.
    pub fn unmatched<'n, I>(&self, source_names: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let names: Vec<&str> = source_names.into_iter().collect();
        self.kinds
            .keys()
            .map(String::as_str)
            .filter(|name| !names.iter().any(|wanted| wanted == name))
            .collect()
    }
}
