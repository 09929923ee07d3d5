//! Dashboard state.
//!
//! [`App`] holds the latest [`MetricSample`], the latest
//! [`RankedProcessList`] and the table [`Viewport`]. Only the coordinator
//! thread owns it; samplers hand over whole snapshots, which replace the
//! previous ones in a single assignment.

use tracing::trace;

use crate::input::Command;
use crate::rank::RankedProcessList;
use crate::sampler::MetricSample;
use crate::ui::classify;
use crate::viewport::{Viewport, VisibleSlice, visible_slice};

#[derive(Debug)]
pub struct App {
    /// Latest CPU and memory reading.
    pub sample: MetricSample,
    /// Latest process snapshot, highest CPU first.
    pub processes: RankedProcessList,
    pub viewport: Viewport,
    /// Whether the event loop should keep running.
    pub running: bool,
}

impl App {
    /// Creates an empty dashboard whose table shows `visible_rows` rows.
    pub fn new(visible_rows: usize) -> Self {
        Self {
            sample: MetricSample::default(),
            processes: RankedProcessList::default(),
            viewport: Viewport::new(visible_rows),
            running: true,
        }
    }

    pub fn publish_sample(&mut self, sample: MetricSample) {
        trace!(
            cpu = sample.cpu_percent,
            cpu_band = classify(sample.cpu_percent).as_str(),
            mem = sample.mem_used_percent,
            mem_band = classify(sample.mem_used_percent).as_str(),
            age_ms = sample.taken_at.elapsed().as_millis() as u64,
            "sample published"
        );
        self.sample = sample;
    }

    /// Swaps in a new process snapshot and keeps the scroll offset valid.
    pub fn publish_processes(&mut self, processes: RankedProcessList) {
        trace!(rows = processes.len(), "process list published");
        self.processes = processes;
        self.viewport.clamp(self.processes.len());
    }

    /// Applies `command`. Returns whether the screen needs repainting.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => self.running = false,
            Command::ScrollUp => self.viewport.scroll_up(),
            Command::ScrollDown => self.viewport.scroll_down(self.processes.len()),
        }
        self.running
    }

    /// Changes how many table rows fit on screen.
    pub fn resize(&mut self, visible_rows: usize) {
        self.viewport.resize(visible_rows, self.processes.len());
    }

    /// The header and rows currently in view.
    pub fn visible(&self) -> VisibleSlice<'_> {
        visible_slice(
            self.processes.rows(),
            self.viewport.offset(),
            self.viewport.visible_rows(),
        )
    }
}
