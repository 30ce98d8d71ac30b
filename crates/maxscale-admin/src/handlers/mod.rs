pub mod index;
pub mod metrics;
