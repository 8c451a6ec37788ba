use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{RawItem, Source};

/// Body handed to the scraper queue for one new story.
///
/// Field names are the wire format consumed downstream and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub address: String,
    pub website: String,
    pub lang: String,
    pub title: String,
    pub date: String,
    pub url: String,
}

impl OutboundMessage {
    pub fn new(source: &Source, item: &RawItem, canonical_url: &str) -> Self {
        Self {
            address: source.address.clone(),
            website: source.name.clone(),
            lang: source.lang.clone(),
            title: item.title.clone(),
            date: item.publish_date.clone(),
            url: canonical_url.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::SourceKind;

    #[test]
    fn test_message_fields_come_from_source_and_item() {
        let source = Source::new("cnn", "http://cnn.com/rss", "en", SourceKind::Default);
        let item = RawItem::new("Headline", "Mon, 01 Jan 2024 00:00:00 +0000", "http://cnn.com/a");
        let msg = OutboundMessage::new(&source, &item, "http://cnn.com/a");

        assert_eq!(msg.address, "http://cnn.com/rss");
        assert_eq!(msg.website, "cnn");
        assert_eq!(msg.lang, "en");
        assert_eq!(msg.title, "Headline");
        assert_eq!(msg.date, "Mon, 01 Jan 2024 00:00:00 +0000");
        assert_eq!(msg.url, "http://cnn.com/a");
    }

    #[test]
    fn test_wire_format_keys() {
        let source = Source::new("upi", "http://upi.com/rss", "en", SourceKind::Ascii);
        let item = RawItem::new("T", "D", "http://upi.com/x");
        let json = OutboundMessage::new(&source, &item, "http://upi.com/x")
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["address", "date", "lang", "title", "url", "website"]);
        assert!(obj.values().all(|v| v.is_string()));
    }
}
