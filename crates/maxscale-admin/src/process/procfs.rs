use std::path::{Path, PathBuf};

use maxscale_common::error::{ExporterError, Result};

/// Kernel clock ticks per second as exposed through procfs on Linux.
const USER_HZ: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessTarget {
    Current,
    Pid(u32),
}

impl ProcessTarget {
    fn root(&self) -> PathBuf {
        match self {
            Self::Current => PathBuf::from("/proc/self"),
            Self::Pid(pid) => PathBuf::from(format!("/proc/{pid}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStats {
    pub cpu_seconds: f64,
    pub resident_memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub open_fds: u64,
    pub max_fds: Option<u64>,
    pub threads: u64,
    pub start_time_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatFields {
    utime_ticks: u64,
    stime_ticks: u64,
    threads: u64,
    start_ticks: u64,
    virtual_memory_bytes: u64,
}

#[cfg(target_os = "linux")]
pub fn read_process_stats(target: ProcessTarget) -> Result<Option<ProcessStats>> {
    let root = target.root();

    let stat = parse_stat(&read_file(&root.join("stat"))?)
        .ok_or_else(|| malformed(&root.join("stat")))?;
    let resident_kb = parse_status_kb(&read_file(&root.join("status"))?, "VmRSS:").unwrap_or(0);
    let max_fds = parse_max_open_files(&read_file(&root.join("limits"))?);
    let open_fds = std::fs::read_dir(root.join("fd"))?.count() as u64;
    let boot_time = parse_boot_time(&read_file(Path::new("/proc/stat"))?)
        .ok_or_else(|| malformed(Path::new("/proc/stat")))?;

    Ok(Some(ProcessStats {
        cpu_seconds: (stat.utime_ticks + stat.stime_ticks) as f64 / USER_HZ,
        resident_memory_bytes: resident_kb.saturating_mul(1024),
        virtual_memory_bytes: stat.virtual_memory_bytes,
        open_fds,
        max_fds,
        threads: stat.threads,
        start_time_seconds: boot_time as f64 + stat.start_ticks as f64 / USER_HZ,
    }))
}

#[cfg(not(target_os = "linux"))]
pub fn read_process_stats(_target: ProcessTarget) -> Result<Option<ProcessStats>> {
    Ok(None)
}

pub fn read_pid_file(path: &Path) -> Result<u32> {
    let content = std::fs::read_to_string(path)?;
    content.trim().parse::<u32>().map_err(|err| {
        ExporterError::InvalidArgument(format!(
            "can't parse pid file {}: {err}",
            path.display()
        ))
    })
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn read_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn malformed(path: &Path) -> ExporterError {
    ExporterError::decode(path.display().to_string(), "unexpected procfs layout")
}

// The command name may contain spaces and parentheses, so fields are counted
// from the last closing parenthesis. Field 3 (state) is index 0.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_stat(content: &str) -> Option<StatFields> {
    let (_, rest) = content.rsplit_once(')')?;
    let fields = rest.split_whitespace().collect::<Vec<_>>();
    let field = |index: usize| fields.get(index)?.parse::<u64>().ok();

    Some(StatFields {
        utime_ticks: field(11)?,
        stime_ticks: field(12)?,
        threads: field(17)?,
        start_ticks: field(19)?,
        virtual_memory_bytes: field(20)?,
    })
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_status_kb(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        line.strip_prefix(key)?
            .split_whitespace()
            .next()?
            .parse::<u64>()
            .ok()
    })
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_max_open_files(content: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        line.strip_prefix("Max open files")?
            .split_whitespace()
            .next()?
            .parse::<u64>()
            .ok()
    })
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_boot_time(content: &str) -> Option<u64> {
    content.lines().find_map(|line| line.strip_prefix("btime ")?.trim().parse().ok())
}
