//! Event timing histograms.
//!
//! MaxScale reports how many events were queued and executed within fixed
//! 100ms duration windows up to 3 seconds, plus one overflow window. The
//! windows map one-to-one onto a fixed set of histogram bounds, so the counts
//! are exported as they arrive rather than observed one by one.
//!
//! The upstream API never reports durations, only counts, so the histogram
//! sum is a synthetic value: each record contributes `count * weight` where
//! the weight starts at 0.1 and grows by 0.1 per record in input order. The
//! weight is a running floating-point sum, which keeps the emitted sums
//! identical to those of earlier exporter releases.

use maxscale_common::error::{ExporterError, Result};
use serde::Deserialize;

use crate::{
    catalog::{EVENTS_EXECUTED_SECONDS, EVENTS_QUEUED_SECONDS},
    types::{MetricSample, MetricValue},
};

use super::null_as_default;

pub const BUCKET_WIDTH_MS: u32 = 100;
pub const BUCKET_COUNT: u32 = 29;

const FIRST_WINDOW_LABEL: &str = "< 100ms";
const OVERFLOW_WINDOW_LABEL: &str = "> 3000ms";
const SUM_WEIGHT_STEP: f64 = 0.1;

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "No. Events Queued", default, deserialize_with = "null_as_default")]
    pub queued: u64,
    #[serde(rename = "No. Events Executed", default, deserialize_with = "null_as_default")]
    pub executed: u64,
}

/// The bucket a duration label resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationWindow {
    /// Upper bound in milliseconds.
    Bounded(u32),
    /// Beyond the last finite bound, only visible through `+Inf`.
    Overflow,
}

impl DurationWindow {
    pub fn parse(label: &str) -> Result<Self> {
        match label {
            FIRST_WINDOW_LABEL => Ok(Self::Bounded(BUCKET_WIDTH_MS)),
            OVERFLOW_WINDOW_LABEL => Ok(Self::Overflow),
            ranged => parse_upper_bound_ms(ranged).map(Self::Bounded),
        }
    }
}

/// Takes the trailing token of labels like `"100 - 200ms"` or `"100-200ms"`.
fn parse_upper_bound_ms(label: &str) -> Result<u32> {
    let shape_error = || ExporterError::BucketShape {
        label: label.to_string(),
    };

    let token = label
        .rsplit(|c: char| c.is_whitespace() || c == '-')
        .find(|part| !part.is_empty())
        .ok_or_else(shape_error)?;
    let millis = token
        .trim_matches(|c: char| c == 'm' || c == 's')
        .parse::<f64>()
        .map_err(|_| shape_error())?;

    if !millis.is_finite() || millis.fract() != 0.0 || millis < 0.0 || millis > f64::from(u32::MAX) {
        return Err(shape_error());
    }

    Ok(millis as u32)
}

/// Per-bucket counts over the fixed bound set `100ms..=2900ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationHistogram {
    buckets: Vec<(u32, u64)>,
    count: u64,
    sum: f64,
}

impl DurationHistogram {
    pub fn new() -> Self {
        Self {
            buckets: (1..=BUCKET_COUNT)
                .map(|index| (index * BUCKET_WIDTH_MS, 0))
                .collect(),
            count: 0,
            sum: 0.0,
        }
    }

    pub fn bounds_ms(&self) -> impl Iterator<Item = u32> + '_ {
        self.buckets.iter().map(|(bound, _)| *bound)
    }

    pub fn bucket(&self, bound_ms: u32) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(bound, _)| *bound == bound_ms)
            .map(|(_, count)| *count)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Stores `count` for the window, replacing any earlier value for the same
    /// bound, and adds it to the running totals.
    pub fn record(
        &mut self,
        window: DurationWindow,
        label: &str,
        count: u64,
        sum_weight: f64,
    ) -> Result<()> {
        if let DurationWindow::Bounded(bound_ms) = window {
            let slot = self
                .buckets
                .iter_mut()
                .find(|(bound, _)| *bound == bound_ms)
                .ok_or_else(|| ExporterError::BucketShape {
                    label: label.to_string(),
                })?;
            slot.1 = count;
        }

        self.count = self.count.saturating_add(count);
        self.sum += count as f64 * sum_weight;
        Ok(())
    }

    pub fn into_value(self) -> MetricValue {
        MetricValue::Histogram {
            buckets: self
                .buckets
                .into_iter()
                .map(|(bound_ms, count)| (f64::from(bound_ms) / 1000.0, count))
                .collect(),
            count: self.count,
            sum: self.sum,
        }
    }
}

impl Default for DurationHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventHistograms {
    pub queued: DurationHistogram,
    pub executed: DurationHistogram,
}

pub fn build_histograms(records: &[EventRecord]) -> Result<EventHistograms> {
    let mut queued = DurationHistogram::new();
    let mut executed = DurationHistogram::new();
    let mut sum_weight = SUM_WEIGHT_STEP;

    for record in records {
        let window = DurationWindow::parse(&record.duration)?;
        queued.record(window, &record.duration, record.queued, sum_weight)?;
        executed.record(window, &record.duration, record.executed, sum_weight)?;
        sum_weight += SUM_WEIGHT_STEP;
    }

    Ok(EventHistograms { queued, executed })
}

pub fn translate(records: &[EventRecord]) -> Result<Vec<MetricSample>> {
    let histograms = build_histograms(records)?;

    Ok(vec![
        MetricSample::new(&EVENTS_QUEUED_SECONDS, Vec::new(), histograms.queued.into_value()),
        MetricSample::new(
            &EVENTS_EXECUTED_SECONDS,
            Vec::new(),
            histograms.executed.into_value(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{catalog::Catalog, resources::Resource};

    fn event(duration: &str, queued: u64, executed: u64) -> EventRecord {
        EventRecord {
            duration: duration.to_string(),
            queued,
            executed,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn parses_window_labels() {
        assert_eq!(DurationWindow::parse("< 100ms").unwrap(), DurationWindow::Bounded(100));
        assert_eq!(DurationWindow::parse("100-200ms").unwrap(), DurationWindow::Bounded(200));
        assert_eq!(DurationWindow::parse("2800 - 2900ms").unwrap(), DurationWindow::Bounded(2900));
        assert_eq!(DurationWindow::parse("> 3000ms").unwrap(), DurationWindow::Overflow);

        assert!(matches!(
            DurationWindow::parse("soon"),
            Err(ExporterError::BucketShape { .. })
        ));
        assert!(matches!(
            DurationWindow::parse("100-150.5ms"),
            Err(ExporterError::BucketShape { .. })
        ));
    }

    #[test]
    fn builds_executed_histogram_from_windows() {
        let histograms =
            build_histograms(&[event("< 100ms", 5, 3), event("100-200ms", 2, 1)]).unwrap();

        let executed = &histograms.executed;
        assert_eq!(executed.bucket(100), Some(3));
        assert_eq!(executed.bucket(200), Some(1));
        assert!(executed.bounds_ms().skip(2).all(|bound| executed.bucket(bound) == Some(0)));
        assert_eq!(executed.count(), 4);
        assert_close(executed.sum(), 0.5);

        let queued = &histograms.queued;
        assert_eq!(queued.bucket(100), Some(5));
        assert_eq!(queued.bucket(200), Some(2));
        assert_eq!(queued.count(), 7);
        assert_close(queued.sum(), 0.9);
    }

    #[test]
    fn bound_set_is_fixed() {
        let expected = (1..=29).map(|index| index * 100).collect::<Vec<u32>>();

        let empty = build_histograms(&[]).unwrap();
        assert_eq!(empty.queued.bounds_ms().collect::<Vec<_>>(), expected);

        let sparse = build_histograms(&[event("1400 - 1500ms", 1, 1)]).unwrap();
        assert_eq!(sparse.executed.bounds_ms().collect::<Vec<_>>(), expected);
        assert_eq!(sparse.executed.bucket(1500), Some(1));
        assert_eq!(sparse.executed.bucket(100), Some(0));
    }

    #[test]
    fn overflow_counts_only_towards_totals() {
        let histograms =
            build_histograms(&[event("< 100ms", 0, 2), event("> 3000ms", 0, 6)]).unwrap();

        let executed = &histograms.executed;
        assert_eq!(executed.bucket(100), Some(2));
        assert_eq!(executed.bounds_ms().filter_map(|b| executed.bucket(b)).sum::<u64>(), 2);
        assert_eq!(executed.count(), 8);
        assert_close(executed.sum(), 2.0 * 0.1 + 6.0 * 0.2);
    }

    #[test]
    fn repeated_window_overwrites() {
        let histograms =
            build_histograms(&[event("< 100ms", 0, 2), event("< 100ms", 0, 5)]).unwrap();
        assert_eq!(histograms.executed.bucket(100), Some(5));
        assert_eq!(histograms.executed.count(), 7);
    }

    #[test]
    fn sum_weight_accumulates_like_earlier_releases() {
        let records = (1..=10)
            .map(|index| event(&format!("{} - {}ms", (index - 1) * 100, index * 100), 0, 1))
            .collect::<Vec<_>>();

        let mut expected: f64 = 0.0;
        let mut weight = 0.1;
        for _ in 0..10 {
            expected += 1.0 * weight;
            weight += 0.1;
        }

        let histograms = build_histograms(&records).unwrap();
        assert_eq!(histograms.executed.sum().to_bits(), expected.to_bits());
    }

    #[test]
    fn unknown_bound_is_a_shape_error() {
        let err = build_histograms(&[event("3000-3100ms", 1, 1)]).unwrap_err();
        assert!(matches!(err, ExporterError::BucketShape { ref label } if label == "3000-3100ms"));

        let err = build_histograms(&[event("100-250ms", 1, 1)]).unwrap_err();
        assert!(matches!(err, ExporterError::BucketShape { .. }));
    }

    #[test]
    fn emits_queued_and_executed_samples() {
        let payload = json!([
            {"Duration": "< 100ms", "No. Events Queued": 5, "No. Events Executed": 3},
            {"Duration": "100 - 200ms", "No. Events Queued": 2, "No. Events Executed": 1},
            {"Duration": "> 3000ms", "No. Events Queued": 0, "No. Events Executed": 0}
        ]);

        let samples = Resource::Events.translate(payload, Catalog::global()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].descriptor.fq_name(), "maxscale_events_queued_seconds");
        assert_eq!(samples[1].descriptor.fq_name(), "maxscale_events_executed_seconds");

        let MetricValue::Histogram { buckets, count, .. } = &samples[1].value else {
            panic!("expected histogram, got {:?}", samples[1].value);
        };
        assert_eq!(buckets.len(), 29);
        assert_eq!(buckets[0], (0.1, 3));
        assert_eq!(buckets[1], (0.2, 1));
        assert_eq!(buckets[28], (2.9, 0));
        assert!(buckets.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert_eq!(*count, 4);
    }
}
