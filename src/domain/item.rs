/// A story candidate as it came out of a feed, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub publish_date: String,
    pub raw_url: String,
}

impl RawItem {
    pub fn new(
        title: impl Into<String>,
        publish_date: impl Into<String>,
        raw_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            publish_date: publish_date.into(),
            raw_url: raw_url.into(),
        }
    }
}
