pub mod procfs;

use std::path::{Path, PathBuf};

use maxscale_collector::types::{MetricDescriptor, MetricSample, MetricType, NAMESPACE};
use maxscale_common::error::Result;
use tracing::warn;

pub use procfs::{ProcessStats, ProcessTarget, read_pid_file, read_process_stats};

pub struct ProcessDescriptors {
    cpu_seconds_total: MetricDescriptor,
    resident_memory_bytes: MetricDescriptor,
    virtual_memory_bytes: MetricDescriptor,
    open_fds: MetricDescriptor,
    max_fds: MetricDescriptor,
    threads: MetricDescriptor,
    start_time_seconds: MetricDescriptor,
}

const fn process_metric(
    namespace: &'static str,
    name: &'static str,
    help: &'static str,
    metric_type: MetricType,
) -> MetricDescriptor {
    MetricDescriptor {
        namespace,
        subsystem: "process",
        name,
        help,
        metric_type,
        variable_labels: &[],
    }
}

impl ProcessDescriptors {
    const fn new(namespace: &'static str) -> Self {
        Self {
            cpu_seconds_total: process_metric(
                namespace,
                "cpu_seconds_total",
                "Total user and system CPU time spent in seconds.",
                MetricType::Counter,
            ),
            resident_memory_bytes: process_metric(
                namespace,
                "resident_memory_bytes",
                "Resident memory size in bytes.",
                MetricType::Gauge,
            ),
            virtual_memory_bytes: process_metric(
                namespace,
                "virtual_memory_bytes",
                "Virtual memory size in bytes.",
                MetricType::Gauge,
            ),
            open_fds: process_metric(
                namespace,
                "open_fds",
                "Number of open file descriptors.",
                MetricType::Gauge,
            ),
            max_fds: process_metric(
                namespace,
                "max_fds",
                "Maximum number of open file descriptors.",
                MetricType::Gauge,
            ),
            threads: process_metric(
                namespace,
                "threads",
                "Number of OS threads in the process.",
                MetricType::Gauge,
            ),
            start_time_seconds: process_metric(
                namespace,
                "start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
                MetricType::Gauge,
            ),
        }
    }

    fn samples(&'static self, stats: &ProcessStats) -> Vec<MetricSample> {
        let mut samples = vec![
            MetricSample::unlabeled(&self.cpu_seconds_total, stats.cpu_seconds),
            MetricSample::unlabeled(&self.resident_memory_bytes, stats.resident_memory_bytes as f64),
            MetricSample::unlabeled(&self.virtual_memory_bytes, stats.virtual_memory_bytes as f64),
            MetricSample::unlabeled(&self.open_fds, stats.open_fds as f64),
            MetricSample::unlabeled(&self.threads, stats.threads as f64),
            MetricSample::unlabeled(&self.start_time_seconds, stats.start_time_seconds),
        ];
        if let Some(max_fds) = stats.max_fds {
            samples.push(MetricSample::unlabeled(&self.max_fds, max_fds as f64));
        }
        samples
    }
}

pub static EXPORTER_PROCESS: ProcessDescriptors = ProcessDescriptors::new("");
pub static MAXSCALE_PROCESS: ProcessDescriptors = ProcessDescriptors::new(NAMESPACE);

/// Process statistics for the exporter itself and, when a pid file is
/// configured, for the monitored MaxScale process.
pub struct ProcessCollector {
    pid_file: Option<PathBuf>,
}

impl ProcessCollector {
    pub fn new(pid_file: Option<PathBuf>) -> Self {
        Self { pid_file }
    }

    pub fn pid_file(&self) -> Option<&Path> {
        self.pid_file.as_deref()
    }

    pub fn collect(&self, include_runtime: bool) -> Vec<MetricSample> {
        let mut samples = Vec::new();

        if include_runtime {
            match read_process_stats(ProcessTarget::Current) {
                Ok(Some(stats)) => samples.extend(EXPORTER_PROCESS.samples(&stats)),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "failed to read exporter process statistics"),
            }
        }

        if let Some(pid_file) = &self.pid_file {
            match self.maxscale_stats(pid_file) {
                Ok(Some(stats)) => samples.extend(MAXSCALE_PROCESS.samples(&stats)),
                Ok(None) => {}
                Err(err) => warn!(
                    pid_file = %pid_file.display(),
                    error = %err,
                    "failed to read maxscale process statistics"
                ),
            }
        }

        samples
    }

    fn maxscale_stats(&self, pid_file: &Path) -> Result<Option<ProcessStats>> {
        let pid = read_pid_file(pid_file)?;
        read_process_stats(ProcessTarget::Pid(pid))
    }
}
