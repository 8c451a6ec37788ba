use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{Result, StorywireError};
use crate::domain::RawItem;

/// Turns a fetched feed body into story candidates.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse RSS, Atom or JSON Feed and return at most `max_items` entries,
    /// in document order. Entries without a link are dropped.
    pub fn normalize(&self, body: &[u8], max_items: usize) -> Result<Vec<RawItem>> {
        let feed = parser::parse(body).map_err(|e| StorywireError::FeedParse(e.to_string()))?;

        let items = feed
            .entries
            .into_iter()
            .take(max_items)
            .filter_map(|entry| {
                let link = entry.links.first().map(|l| l.href.trim().to_string())?;
                if link.is_empty() {
                    return None;
                }

                let title = entry
                    .title
                    .map(|t| decode_html_entities(&t.content).trim().to_string())
                    .unwrap_or_default();
                let date = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc2822())
                    .unwrap_or_default();

                Some(RawItem::new(title, date, link))
            })
            .collect();

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Fish &amp; Chips</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
    </item>
    <item>
      <title>No link here</title>
      <guid isPermaLink="false">item-3</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let items = Normalizer::new()
            .normalize(RSS_SAMPLE.as_bytes(), 100)
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Test Item 1");
        assert_eq!(items[0].raw_url, "https://example.com/item1");
        let date = chrono::DateTime::parse_from_rfc2822(&items[0].publish_date).unwrap();
        assert_eq!(date.timestamp(), 1_704_067_200);
        assert_eq!(items[1].title, "Fish & Chips");
        assert_eq!(items[1].publish_date, "");
    }

    #[test]
    fn test_parse_atom_uses_updated_date() {
        let items = Normalizer::new()
            .normalize(ATOM_SAMPLE.as_bytes(), 100)
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom Entry 1");
        assert_eq!(items[0].raw_url, "https://example.com/atom1");
        assert!(!items[0].publish_date.is_empty());
    }

    #[test]
    fn test_max_items_caps_entries() {
        let items = Normalizer::new().normalize(RSS_SAMPLE.as_bytes(), 1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw_url, "https://example.com/item1");
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = Normalizer::new().normalize(b"not a feed", 100).unwrap_err();
        assert!(matches!(err, StorywireError::FeedParse(_)));
    }
}
