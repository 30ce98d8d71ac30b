use std::{collections::HashMap, sync::LazyLock};

use crate::types::{MetricDescriptor, MetricType};

const SERVER_LABELS: &[&str] = &["server", "address"];
const SERVER_UP_LABELS: &[&str] = &["server", "address", "status"];
const SERVICE_LABELS: &[&str] = &["name", "router"];
const NO_LABELS: &[&str] = &[];

pub static UP: MetricDescriptor = MetricDescriptor::new(
    "",
    "up",
    "Was the last scrape of MaxScale successful?",
    MetricType::Gauge,
    NO_LABELS,
);

pub static TOTAL_SCRAPES: MetricDescriptor = MetricDescriptor::new(
    "exporter",
    "total_scrapes",
    "Current total MaxScale scrapes",
    MetricType::Counter,
    NO_LABELS,
);

pub static SERVER_CONNECTIONS: MetricDescriptor = MetricDescriptor::new(
    "server",
    "connections",
    "Amount of connections to the server",
    MetricType::Gauge,
    SERVER_LABELS,
);

pub static SERVER_UP: MetricDescriptor = MetricDescriptor::new(
    "server",
    "up",
    "Is the server up",
    MetricType::Gauge,
    SERVER_UP_LABELS,
);

pub static SERVER_MASTER: MetricDescriptor = MetricDescriptor::new(
    "server",
    "master",
    "Is the server master",
    MetricType::Gauge,
    SERVER_LABELS,
);

pub static SERVICE_CURRENT_SESSIONS: MetricDescriptor = MetricDescriptor::new(
    "service",
    "current_sessions",
    "Amount of sessions currently active",
    MetricType::Gauge,
    SERVICE_LABELS,
);

pub static SERVICE_TOTAL_SESSIONS: MetricDescriptor = MetricDescriptor::new(
    "service",
    "total_sessions",
    "Total amount of sessions",
    MetricType::Counter,
    SERVICE_LABELS,
);

pub static EVENTS_QUEUED_SECONDS: MetricDescriptor = MetricDescriptor::new(
    "events",
    "queued_seconds",
    "Amount of events queued",
    MetricType::Histogram,
    NO_LABELS,
);

pub static EVENTS_EXECUTED_SECONDS: MetricDescriptor = MetricDescriptor::new(
    "events",
    "executed_seconds",
    "Amount of events executed",
    MetricType::Histogram,
    NO_LABELS,
);

macro_rules! status_metric {
    ($name:literal, $help:literal, $kind:ident) => {
        MetricDescriptor::new("status", $name, $help, MetricType::$kind, NO_LABELS)
    };
}

static STATUS_METRICS: [MetricDescriptor; 22] = [
    status_metric!("uptime", "How long has the server been running", Counter),
    status_metric!(
        "uptime_since_flush_status",
        "How long the server has been up since flush status",
        Counter
    ),
    status_metric!("threads_created", "How many threads have been created", Counter),
    status_metric!("threads_running", "How many threads are running", Gauge),
    status_metric!("threadpool_threads", "How many threadpool threads there are", Gauge),
    status_metric!("threads_connected", "How many threads are connected", Gauge),
    status_metric!("connections", "How many connections there are", Gauge),
    status_metric!("client_connections", "How many client connections there are", Gauge),
    status_metric!("backend_connections", "How many backend connections there are", Gauge),
    status_metric!("listeners", "How many listeners there are", Gauge),
    status_metric!("zombie_connections", "How many zombie connections there are", Gauge),
    status_metric!("internal_descriptors", "How many internal descriptors there are", Gauge),
    status_metric!("read_events", "How many read events happened", Counter),
    status_metric!("write_events", "How many write events happened", Counter),
    status_metric!("hangup_events", "How many hangup events happened", Counter),
    status_metric!("error_events", "How many error events happened", Counter),
    status_metric!("accept_events", "How many accept events happened", Counter),
    status_metric!("event_queue_length", "How long the event queue is", Gauge),
    status_metric!("max_event_queue_length", "The max length of the event queue", Gauge),
    status_metric!("max_event_queue_time", "The max event queue time", Gauge),
    status_metric!("max_event_execution_time", "The max event execution time", Gauge),
    status_metric!("pending_events", "How many events are pending", Gauge),
];

// Variable keys carry the upstream `MAXSCALE_` prefix; the exported names drop it.
static VARIABLE_METRICS: [(&str, MetricDescriptor); 4] = [
    (
        "variables_maxscale_threads",
        MetricDescriptor::new("variables", "thread", "MAXSCALE_THREADS", MetricType::Gauge, NO_LABELS),
    ),
    (
        "variables_maxscale_nbpolls",
        MetricDescriptor::new("variables", "nbpolls", "MAXSCALE_NBPOLLS", MetricType::Gauge, NO_LABELS),
    ),
    (
        "variables_maxscale_pollsleep",
        MetricDescriptor::new(
            "variables",
            "pollsleep",
            "MAXSCALE_POLLSLEEP",
            MetricType::Gauge,
            NO_LABELS,
        ),
    ),
    (
        "variables_maxscale_sessions",
        MetricDescriptor::new(
            "variables",
            "sessions",
            "MAXSCALE_SESSIONS",
            MetricType::Gauge,
            NO_LABELS,
        ),
    ),
];

static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::build);

/// Read-only table from a normalized metric key to its descriptor.
pub struct Catalog {
    entries: HashMap<String, &'static MetricDescriptor>,
}

impl Catalog {
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    fn build() -> Self {
        let mut entries = HashMap::new();

        for descriptor in [
            &UP,
            &TOTAL_SCRAPES,
            &SERVER_CONNECTIONS,
            &SERVER_UP,
            &SERVER_MASTER,
            &SERVICE_CURRENT_SESSIONS,
            &SERVICE_TOTAL_SESSIONS,
            &EVENTS_QUEUED_SECONDS,
            &EVENTS_EXECUTED_SECONDS,
        ] {
            entries.insert(descriptor_key(descriptor), descriptor);
        }

        for descriptor in &STATUS_METRICS {
            entries.insert(descriptor_key(descriptor), descriptor);
        }

        for (key, descriptor) in &VARIABLE_METRICS {
            entries.insert((*key).to_string(), descriptor);
        }

        Self { entries }
    }

    pub fn lookup(&self, key: &str) -> Option<&'static MetricDescriptor> {
        self.entries.get(key).copied()
    }

    pub fn status(&self, variable_name: &str) -> Option<&'static MetricDescriptor> {
        self.lookup(&format!("status_{}", variable_name.to_lowercase()))
    }

    pub fn variable(&self, variable_name: &str) -> Option<&'static MetricDescriptor> {
        self.lookup(&format!("variables_{}", variable_name.to_lowercase()))
    }

    pub fn descriptors(&self) -> Vec<&'static MetricDescriptor> {
        let mut descriptors = self.entries.values().copied().collect::<Vec<_>>();
        descriptors.sort_by_key(|descriptor| descriptor.fq_name());
        descriptors
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn descriptor_key(descriptor: &MetricDescriptor) -> String {
    if descriptor.subsystem.is_empty() {
        descriptor.name.to_string()
    } else {
        format!("{}_{}", descriptor.subsystem, descriptor.name)
    }
}
