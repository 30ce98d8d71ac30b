//! Collection pipeline for the MaxScale exporter.
//!
//! ```text
//! Collector::collect()
//!   ├── JsonSource::get_json()   one fetch per resource, NULL fixed, envelope removed
//!   ├── Resource::translate()    servers, services, status, variables, event times
//!   └── maxscale_up / maxscale_exporter_total_scrapes
//!
//! exposition::render_prometheus() → text/plain for /metrics
//! ```

pub mod catalog;
pub mod collector;
pub mod exposition;
pub mod fetcher;
pub mod resources;
pub mod types;

pub use catalog::Catalog;
pub use collector::{Collection, Collector, ResourceError, ScrapeResult, ScrapeState};
pub use exposition::{TEXT_CONTENT_TYPE, render_prometheus};
pub use fetcher::{HttpJsonSource, JsonSource};
pub use resources::Resource;
pub use types::{MetricDescriptor, MetricSample, MetricType, MetricValue};
