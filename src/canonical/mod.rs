//! Source-specific URL canonicalization.
//!
//! The canonical URL is both the dedup key and the `url` field handed to the
//! scraper queue, so every rule here must stay a pure function of
//! `(raw_url, kind)`.

mod registry;

pub use registry::KindRegistry;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::app::StorywireError;

/// Canonicalization strategy attached to a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// UTF-8 passthrough.
    #[default]
    Default,
    /// Drop embedded `"` characters, then require ASCII.
    StripQuotesAscii,
    /// Require ASCII, no other change.
    Ascii,
    /// Strip the segment glued onto `.com`, keep scheme and host, and
    /// prefix the last path segment with `world_`.
    WorldPrefix,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Default,
        SourceKind::StripQuotesAscii,
        SourceKind::Ascii,
        SourceKind::WorldPrefix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Default => "default",
            SourceKind::StripQuotesAscii => "strip_quotes_ascii",
            SourceKind::Ascii => "ascii",
            SourceKind::WorldPrefix => "world_prefix",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = StorywireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| StorywireError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizeError {
    #[error("URL is not ASCII: {0}")]
    NonAscii(String),
}

/// Compute the canonical URL for `raw_url` under `kind`.
pub fn canonicalize(raw_url: &str, kind: SourceKind) -> Result<String, CanonicalizeError> {
    match kind {
        SourceKind::Default => Ok(raw_url.to_string()),
        SourceKind::StripQuotesAscii => require_ascii(raw_url.replace('"', "")),
        SourceKind::Ascii => require_ascii(raw_url.to_string()),
        SourceKind::WorldPrefix => Ok(world_prefix(raw_url)),
    }
}

fn require_ascii(url: String) -> Result<String, CanonicalizeError> {
    if url.is_ascii() {
        Ok(url)
    } else {
        Err(CanonicalizeError::NonAscii(url))
    }
}

/// Positions are character offsets. A missing `.com` counts as position -1,
/// so the search for the next `/` starts at character 3. Whatever sits
/// between the end of `.com` and that slash is removed everywhere it occurs.
fn world_prefix(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();

    let com = url
        .find(".com")
        .map(|byte| url[..byte].chars().count() as isize)
        .unwrap_or(-1);
    let start = (com + 4) as usize;

    let tail: String = chars.iter().skip(start).collect();
    let glued: String = match tail.find('/') {
        Some(byte) => {
            let len = tail[..byte].chars().count();
            chars.iter().skip(start).take(len).collect()
        }
        None => String::new(),
    };

    let stripped = if glued.is_empty() {
        url.to_string()
    } else {
        url.replace(&glued, "")
    };

    let segments: Vec<&str> = stripped.split('/').collect();
    let head = segments[..segments.len().min(3)].join("/");
    let last = segments.last().copied().unwrap_or_default();

    format!("{}/world_{}", head, last)
}
