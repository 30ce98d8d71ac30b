pub mod handlers;
pub mod process;
pub mod router;

pub use router::{AdminState, METRICS_PATH, exporter_router};
