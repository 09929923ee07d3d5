//! Top-N process ranking.

use crate::sampler::ProcessRow;

/// Number of processes kept per snapshot.
pub const TOP_N: usize = 50;

/// Process rows sorted by descending CPU usage, capped in length.
///
/// Only [`rank`] builds one, and nothing mutates it afterwards: a new
/// snapshot replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedProcessList {
    rows: Vec<ProcessRow>,
}

impl RankedProcessList {
    pub fn rows(&self) -> &[ProcessRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub fn into_rows(self) -> Vec<ProcessRow> {
        self.rows
    }
}

/// Sorts `rows` by CPU usage (highest first) and keeps the first `cap`.
///
/// The sort is stable, so rows with equal CPU usage keep their input order.
pub fn rank(mut rows: Vec<ProcessRow>, cap: usize) -> RankedProcessList {
    rows.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    rows.truncate(cap);
    RankedProcessList { rows }
}
