//! Scroll state for the process table.

use crate::sampler::ProcessRow;

/// Column titles shown above every window.
pub const HEADER: [&str; 4] = ["PID", "Name", "CPU%", "Memory%"];

/// Scroll offset plus window height, kept within
/// `0..=len.saturating_sub(visible_rows)` after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    visible_rows: usize,
}

impl Viewport {
    /// Creates a viewport at the top of the list. A zero height becomes one.
    pub fn new(visible_rows: usize) -> Self {
        Self {
            offset: 0,
            visible_rows: visible_rows.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Largest offset that still shows a full page of a `len`-row list.
    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.visible_rows)
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, len: usize) {
        self.offset = (self.offset + 1).min(self.max_offset(len));
    }

    /// Pulls the offset back into range after the list was replaced.
    pub fn clamp(&mut self, len: usize) {
        self.offset = self.offset.min(self.max_offset(len));
    }

    /// Changes the window height, e.g. after a terminal resize.
    pub fn resize(&mut self, visible_rows: usize, len: usize) {
        self.visible_rows = visible_rows.max(1);
        self.clamp(len);
    }
}

/// The header plus the rows currently in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSlice<'a> {
    pub header: [&'static str; 4],
    pub rows: &'a [ProcessRow],
}

/// Returns `list[offset..offset + visible_rows]`, clamped at the end of the
/// list, under the fixed [`HEADER`].
pub fn visible_slice(list: &[ProcessRow], offset: usize, visible_rows: usize) -> VisibleSlice<'_> {
    let start = offset.min(list.len());
    let end = start.saturating_add(visible_rows).min(list.len());
    VisibleSlice {
        header: HEADER,
        rows: &list[start..end],
    }
}
