use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use maxscale_common::error::{ExporterError, Result};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, TOTAL_SCRAPES, UP},
    fetcher::JsonSource,
    resources::Resource,
    types::MetricSample,
};

/// State that outlives a single scrape cycle.
#[derive(Debug, Default)]
pub struct ScrapeState {
    total_scrapes: AtomicU64,
}

impl ScrapeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_scrapes(&self) -> u64 {
        self.total_scrapes.load(Ordering::Relaxed)
    }

    fn record_scrape(&self) -> u64 {
        self.total_scrapes.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug)]
pub struct ResourceError {
    pub resource: Resource,
    pub error: ExporterError,
}

#[derive(Debug)]
pub struct ScrapeResult {
    pub up: bool,
    pub total_scrapes: u64,
    pub errors: Vec<ResourceError>,
}

#[derive(Debug)]
pub struct Collection {
    pub samples: Vec<MetricSample>,
    pub result: ScrapeResult,
}

#[derive(Clone)]
pub struct Collector {
    source: Arc<dyn JsonSource>,
    catalog: &'static Catalog,
    state: Arc<ScrapeState>,
}

impl Collector {
    pub fn new(source: Arc<dyn JsonSource>, state: Arc<ScrapeState>) -> Self {
        Self {
            source,
            catalog: Catalog::global(),
            state,
        }
    }

    pub fn state(&self) -> &ScrapeState {
        &self.state
    }

    /// Runs one scrape cycle. Every resource is attempted; a failing resource
    /// only loses its own samples and marks the cycle as down.
    pub async fn collect(&self, deadline: Option<Instant>) -> Collection {
        let total_scrapes = self.state.record_scrape();
        let mut samples = Vec::new();
        let mut errors = Vec::new();

        for resource in Resource::ALL {
            match self.collect_resource(resource, deadline).await {
                Ok(resource_samples) => samples.extend(resource_samples),
                Err(error) => {
                    warn!(
                        resource = %resource,
                        kind = error.kind(),
                        error = %error,
                        "failed to collect maxscale resource"
                    );
                    errors.push(ResourceError { resource, error });
                }
            }
        }

        let up = errors.is_empty();
        samples.push(MetricSample::unlabeled(&UP, if up { 1.0 } else { 0.0 }));
        samples.push(MetricSample::unlabeled(&TOTAL_SCRAPES, total_scrapes as f64));
        debug!(
            total_scrapes,
            samples = samples.len(),
            failed_resources = errors.len(),
            "maxscale scrape finished"
        );

        Collection {
            samples,
            result: ScrapeResult {
                up,
                total_scrapes,
                errors,
            },
        }
    }

    async fn collect_resource(
        &self,
        resource: Resource,
        deadline: Option<Instant>,
    ) -> Result<Vec<MetricSample>> {
        let payload = self.source.get_json(resource.path(), deadline).await?;
        resource.translate(payload, self.catalog)
    }
}
