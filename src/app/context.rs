use std::sync::Arc;

use tracing::info;

use crate::app::error::{Result, StorywireError};
use crate::config::{load_sources, Config};
use crate::domain::SourceList;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::pipeline::{SourceTask, TaskSettings, WorkerPool};
use crate::store::{DedupStore, Publisher, SqliteDedupStore, SqliteQueue};

/// Everything a cycle needs. Stores are handed to each task explicitly.
pub struct AppContext {
    pub sources: SourceList,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub dedup: Arc<dyn DedupStore>,
    pub publisher: Arc<dyn Publisher>,
    pub pool: WorkerPool,
    pub settings: TaskSettings,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let cache_path = config
            .cache_path()
            .map_err(|e| StorywireError::Config(e.to_string()))?;
        let queue_path = config
            .queue_path()
            .map_err(|e| StorywireError::Config(e.to_string()))?;

        info!(cache = %cache_path.display(), queue = %queue_path.display(), "Opening stores");
        let dedup: Arc<dyn DedupStore> = Arc::new(SqliteDedupStore::new(&cache_path)?);
        let publisher: Arc<dyn Publisher> = Arc::new(SqliteQueue::new(
            &queue_path,
            config.pipeline.queue_name.clone(),
        )?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);

        let sources = load_sources(config.sources_file.as_deref(), &config.kind_registry());

        Ok(Self::with_parts(sources, fetcher, dedup, publisher, config))
    }

    pub fn with_parts(
        sources: SourceList,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        dedup: Arc<dyn DedupStore>,
        publisher: Arc<dyn Publisher>,
        config: &Config,
    ) -> Self {
        let pool = WorkerPool::with_workers(config.pipeline.workers)
            .with_deadline(config.pipeline.task_deadline());

        Self {
            sources,
            fetcher,
            dedup,
            publisher,
            pool,
            settings: config.pipeline.task_settings(),
        }
    }

    /// One task per configured source, each with its own store handles.
    pub fn source_tasks(&self) -> Vec<SourceTask> {
        self.sources
            .iter()
            .map(|source| {
                SourceTask::new(
                    source.clone(),
                    self.fetcher.clone(),
                    self.dedup.clone(),
                    self.publisher.clone(),
                    self.settings,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::SCRAPER_QUEUE;
    use crate::testing::MockFetcher;

    fn context(config: &Config) -> AppContext {
        AppContext::with_parts(
            SourceList::default(),
            Arc::new(MockFetcher::new()),
            Arc::new(SqliteDedupStore::in_memory().unwrap()),
            Arc::new(SqliteQueue::in_memory(SCRAPER_QUEUE).unwrap()),
            config,
        )
    }

    #[test]
    fn test_pool_gets_configured_deadline() {
        let config = Config::default();
        assert_eq!(context(&config).pool.deadline(), Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_zero_deadline_leaves_pool_unbounded() {
        let mut config = Config::default();
        config.pipeline.task_deadline_secs = 0;
        assert_eq!(context(&config).pool.deadline(), None);
    }
}
