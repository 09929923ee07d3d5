//! Metric collection: the provider seam, the `sysinfo` implementation, and the
//! two timer-driven sampling threads.
//!
//! The fast thread publishes a [`MetricSample`] every [`FAST_INTERVAL`]; the
//! slow thread publishes a [`RankedProcessList`] every [`SLOW_INTERVAL`]. Both
//! hand their snapshots to the coordinator by value and never touch UI state.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError, tick};
use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tracing::{debug, info_span, warn};

use crate::error::SampleError;
use crate::rank::{RankedProcessList, rank};

/// Cadence of CPU and memory sampling.
pub const FAST_INTERVAL: Duration = Duration::from_secs(1);

/// Cadence of process-table sampling.
pub const SLOW_INTERVAL: Duration = Duration::from_secs(3);

// ── Data ────────────────────────────────────────────────────

/// Point-in-time CPU and memory reading.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Global CPU usage, 0-100.
    pub cpu_percent: f64,
    /// Used share of physical memory, 0-100.
    pub mem_used_percent: f64,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
    /// When the reading was taken.
    pub taken_at: Instant,
}

impl Default for MetricSample {
    fn default() -> Self {
        Self {
            cpu_percent: 0.0,
            mem_used_percent: 0.0,
            mem_used_bytes: 0,
            mem_total_bytes: 0,
            taken_at: Instant::now(),
        }
    }
}

/// Virtual-memory counters as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub used_percent: f64,
}

/// One row of the process table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    /// CPU usage; may exceed 100 on multi-core hosts.
    pub cpu_percent: f64,
    /// Resident memory as a share of total physical memory.
    pub mem_percent: f64,
}

// ── Provider ────────────────────────────────────────────────

/// Source of host metrics.
///
/// `processes` separates a provider-level failure (outer `Err`) from
/// failures that concern a single process (inner `Err`).
pub trait MetricsProvider: Send {
    fn cpu_percent(&mut self) -> Result<f64, SampleError>;
    fn memory(&mut self) -> Result<MemoryStats, SampleError>;
    fn processes(&mut self) -> Result<Vec<Result<ProcessRow, SampleError>>, SampleError>;
}

/// [`MetricsProvider`] backed by a `sysinfo::System` handle.
#[derive(Debug)]
pub struct SysinfoProvider {
    sys: System,
}

impl SysinfoProvider {
    /// Creates a provider with CPU and process counters primed, so the first
    /// reading taken after `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` is meaningful.
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        Self { sys }
    }
}

impl MetricsProvider for SysinfoProvider {
    fn cpu_percent(&mut self) -> Result<f64, SampleError> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(SampleError::CpuUnavailable);
        }
        Ok(f64::from(self.sys.global_cpu_usage()))
    }

    fn memory(&mut self) -> Result<MemoryStats, SampleError> {
        self.sys.refresh_memory();
        let total_bytes = self.sys.total_memory();
        if total_bytes == 0 {
            return Err(SampleError::MemoryUnavailable);
        }
        let used_bytes = self.sys.used_memory();
        Ok(MemoryStats {
            used_bytes,
            total_bytes,
            used_percent: used_bytes as f64 / total_bytes as f64 * 100.0,
        })
    }

    fn processes(&mut self) -> Result<Vec<Result<ProcessRow, SampleError>>, SampleError> {
        self.sys.refresh_memory();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let total = self.sys.total_memory();
        if total == 0 || self.sys.processes().is_empty() {
            return Err(SampleError::ProcessesUnavailable);
        }

        let mut procs: Vec<_> = self.sys.processes().values().collect();
        procs.sort_by_key(|p| p.pid());

        Ok(procs
            .into_iter()
            .map(|p| {
                let pid = p.pid().as_u32();
                match p.status() {
                    ProcessStatus::Zombie | ProcessStatus::Dead => {
                        Err(SampleError::ProcessExited(pid))
                    }
                    _ => Ok(ProcessRow {
                        pid,
                        name: p.name().to_string_lossy().into_owned(),
                        cpu_percent: f64::from(p.cpu_usage()),
                        mem_percent: p.memory() as f64 / total as f64 * 100.0,
                    }),
                }
            })
            .collect())
    }
}

// ── Ticks ───────────────────────────────────────────────────

/// Takes one fast-tick reading. Any CPU or memory failure fails the tick.
pub fn sample_metrics<P>(provider: &mut P) -> Result<MetricSample, SampleError>
where
    P: MetricsProvider + ?Sized,
{
    let cpu_percent = provider.cpu_percent()?;
    let mem = provider.memory()?;
    Ok(MetricSample {
        cpu_percent,
        mem_used_percent: mem.used_percent,
        mem_used_bytes: mem.used_bytes,
        mem_total_bytes: mem.total_bytes,
        taken_at: Instant::now(),
    })
}

/// Takes one slow-tick process snapshot and ranks it.
///
/// Processes that fail individually are left out; only a provider-level
/// failure fails the tick.
pub fn sample_processes<P>(provider: &mut P, cap: usize) -> Result<RankedProcessList, SampleError>
where
    P: MetricsProvider + ?Sized,
{
    let rows = provider
        .processes()?
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(row) => Some(row),
            Err(err) => {
                debug!(%err, "dropping process from snapshot");
                None
            }
        })
        .collect();
    Ok(rank(rows, cap))
}

/// Spawns the CPU/memory sampling thread.
pub fn spawn_fast<P>(mut provider: P, tx: Sender<MetricSample>) -> io::Result<JoinHandle<()>>
where
    P: MetricsProvider + 'static,
{
    spawn_ticker("sampler-fast", FAST_INTERVAL, tx, move || {
        sample_metrics(&mut provider)
    })
}

/// Spawns the process-table sampling thread.
pub fn spawn_slow<P>(
    mut provider: P,
    cap: usize,
    tx: Sender<RankedProcessList>,
) -> io::Result<JoinHandle<()>>
where
    P: MetricsProvider + 'static,
{
    spawn_ticker("sampler-slow", SLOW_INTERVAL, tx, move || {
        sample_processes(&mut provider, cap)
    })
}

/// Runs `sample` once after the CPU warm-up window and then on every tick of
/// `interval`, publishing each success to `tx`. A failed tick is skipped.
///
/// `tx` is expected to be bounded: while the coordinator has not yet taken
/// the previous snapshot, a new one is discarded rather than queued.
/// Returns once the receiving side has hung up.
fn spawn_ticker<T, F>(
    name: &'static str,
    interval: Duration,
    tx: Sender<T>,
    mut sample: F,
) -> io::Result<JoinHandle<()>>
where
    T: Send + 'static,
    F: FnMut() -> Result<T, SampleError> + Send + 'static,
{
    thread::Builder::new().name(name.to_owned()).spawn(move || {
        let _span = info_span!("sampler", thread = name).entered();
        thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

        let ticker = tick(interval);
        loop {
            match sample() {
                Ok(value) => match tx.try_send(value) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!("previous snapshot still pending, dropping this one");
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("receiver dropped, stopping");
                        return;
                    }
                },
                Err(err) => warn!(%err, "sampling failed, keeping previous values"),
            }
            if ticker.recv().is_err() {
                return;
            }
        }
    })
}
