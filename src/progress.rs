//! Progress of a graft: vertices created so far against the known total.
//!
//! The counter is shared by all persistence tasks and only ever increases,
//! capped at the total. Rendering (`"<current> of <total>"`, redrawn in place
//! on stderr) is purely observational.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

const TEMPLATE: &str = "{pos} of {len}";

/// Where progress is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTarget {
    Stderr,
    Hidden,
}

/// Monotonic counter of created vertices.
pub struct Progress {
    current: AtomicUsize,
    total: usize,
    bar: ProgressBar,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("current", &self.current())
            .field("total", &self.total)
            .finish()
    }
}

impl Progress {
    pub fn new(total: usize, target: ProgressTarget) -> Self {
        let draw_target = match target {
            ProgressTarget::Stderr => ProgressDrawTarget::stderr(),
            ProgressTarget::Hidden => ProgressDrawTarget::hidden(),
        };
        let bar = ProgressBar::with_draw_target(Some(total as u64), draw_target);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style);
        }

        Self {
            current: AtomicUsize::new(0),
            total,
            bar,
        }
    }

    /// Progress that is counted but never rendered.
    pub fn hidden(total: usize) -> Self {
        Self::new(total, ProgressTarget::Hidden)
    }

    /// Counts one more created vertex and re-renders.
    ///
    /// # Returns
    /// The new count, or `None` if the total was already reached
    /// (the count is left unchanged).
    pub fn advance(&self) -> Option<usize> {
        let total = self.total;
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| (c < total).then_some(c + 1))
            .ok()?;

        let current = previous + 1;
        self.bar.set_position(current as u64);
        Some(current)
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.current() == self.total
    }

    /// Leaves the last rendering in place and ends its line.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Stops rendering at the current count, as after a failed graft.
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    /// Whether rendering was stopped by [finish](Self::finish) or [abandon](Self::abandon).
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}
