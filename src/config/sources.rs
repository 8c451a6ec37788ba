//! Feed whitelist loading.
//!
//! Each line is `name,address,<ignored>,lang`; extra fields are ignored.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::app::Result;
use crate::canonical::KindRegistry;
use crate::domain::{Source, SourceList};

/// Load the whitelist, resolving each source's canonicalization kind.
///
/// Never fails: with no file configured, or a file that cannot be read, the
/// list is empty and every cycle does nothing.
pub fn load_sources(path: Option<&Path>, registry: &KindRegistry) -> SourceList {
    let Some(path) = path else {
        warn!("No source file configured; cycles will have nothing to do");
        return SourceList::new();
    };

    match read_sources(path, registry) {
        Ok(sources) => {
            info!(path = %path.display(), count = sources.len(), "Loaded sources");
            for name in registry.unmatched(sources.names()) {
                info!(source = name, "Canonicalization rule matches no configured source");
            }
            sources
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open URL whitelist file");
            SourceList::new()
        }
    }
}

fn read_sources(path: &Path, registry: &KindRegistry) -> Result<SourceList> {
    let content = fs::read_to_string(path)?;
    Ok(parse_sources(&content, registry))
}

/// Later entries with the same name replace earlier ones.
pub fn parse_sources(content: &str, registry: &KindRegistry) -> SourceList {
    let mut sources = SourceList::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            warn!(line = lineno + 1, "Skipping malformed whitelist entry: {}", line);
            continue;
        }

        let (name, address, lang) = (fields[0], fields[1], fields[3]);
        if let Err(e) = url::Url::parse(address) {
            warn!(source = name, address, error = %e, "Source address is not a valid URL");
        }

        sources.insert(Source::new(name, address, lang, registry.kind_for(name)));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::SourceKind;

    #[test]
    fn test_single_line() {
        let sources = parse_sources("cnn,http://cnn.com/rss,ignored,en", &KindRegistry::default());

        assert_eq!(sources.len(), 1);
        let cnn = sources.get("cnn").unwrap();
        assert_eq!(cnn.address, "http://cnn.com/rss");
        assert_eq!(cnn.lang, "en");
        assert_eq!(cnn.kind, SourceKind::Default);
    }

    #[test]
    fn test_kinds_resolved_from_registry() {
        let content = "zaman,http://zaman.com/rss,x,tr\nupi,http://upi.com/rss,x,en\n";
        let sources = parse_sources(content, &KindRegistry::default());

        assert_eq!(sources.get("zaman").unwrap().kind, SourceKind::WorldPrefix);
        assert_eq!(sources.get("upi").unwrap().kind, SourceKind::Ascii);
    }

    #[test]
    fn test_blank_and_short_lines_are_skipped() {
        let content = "\ncnn,http://cnn.com/rss,x,en\nbroken,http://b.com\n\r\n";
        let sources = parse_sources(content, &KindRegistry::default());

        assert_eq!(sources.names().collect::<Vec<_>>(), vec!["cnn"]);
    }

    #[test]
    fn test_crlf_and_extra_fields() {
        let content = "bbc, http://bbc.co.uk/rss ,news,en,extra\r\n";
        let sources = parse_sources(content, &KindRegistry::default());

        let bbc = sources.get("bbc").unwrap();
        assert_eq!(bbc.address, "http://bbc.co.uk/rss");
        assert_eq!(bbc.lang, "en");
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let content = "cnn,http://old.cnn.com/rss,x,en\ncnn,http://cnn.com/rss,x,es\n";
        let sources = parse_sources(content, &KindRegistry::default());

        assert_eq!(sources.len(), 1);
        assert_eq!(sources.get("cnn").unwrap().lang, "es");
    }

    #[test]
    fn test_no_file_configured_is_empty() {
        assert!(load_sources(None, &KindRegistry::default()).is_empty());
    }

    #[test]
    fn test_unreadable_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sources = load_sources(
            Some(dir.path().join("missing.csv").as_path()),
            &KindRegistry::default(),
        );
        assert!(sources.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"cnn,http://cnn.com/rss,ignored,en\n").unwrap();

        let sources = load_sources(Some(file.path()), &KindRegistry::default());
        assert_eq!(sources.get("cnn").unwrap().address, "http://cnn.com/rss");
    }
}
