use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::Result;
use crate::domain::RawItem;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

pub struct HttpFetcher {
    client: Client,
    normalizer: Normalizer,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("storywire/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            normalizer: Normalizer::new(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        address: &str,
        max_items: usize,
        timeout: Duration,
    ) -> Result<Vec<RawItem>> {
        // The request timeout covers connecting through the end of the body.
        let response = self.client.get(address).timeout(timeout).send().await?;
        response.error_for_status_ref()?;
        let body = response.bytes().await?;

        let items = self.normalizer.normalize(&body, max_items)?;
        tracing::debug!(address, count = items.len(), "Fetched feed");
        Ok(items)
    }
}
