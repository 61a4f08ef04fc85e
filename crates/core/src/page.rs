//! Windowed pagination over the filtered record list.
//!
//! The dashboard reveals records in fixed-size steps instead of numbered
//! pages: "load more" grows the window, and any filter change snaps it back
//! to the first page.

/// Number of records revealed per "load more" step.
pub const PAGE_SIZE: usize = 25;

/// A grow-only visible window over a filtered list.
///
/// The window never shrinks on its own. It resets to one page whenever the
/// filter changes, even if more had been revealed before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    limit: usize,
}

impl VisibleWindow {
    /// A window showing the first page.
    pub fn new() -> Self {
        Self { limit: PAGE_SIZE }
    }

    /// A window with an explicit requested size (at least one record).
    ///
    /// Used by stateless listings where the client carries the window size
    /// across requests.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Snap back to the first page.
    pub fn reset(&mut self) {
        self.limit = PAGE_SIZE;
    }

    /// Reveal one more page.
    pub fn extend(&mut self) {
        self.limit = self.limit.saturating_add(PAGE_SIZE);
    }

    /// The requested window size, before clamping to the list length.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of records actually visible given the filtered length.
    pub fn visible_in(&self, filtered_len: usize) -> usize {
        self.limit.min(filtered_len)
    }

    /// Whether more records exist beyond the current window.
    pub fn has_more(&self, filtered_len: usize) -> bool {
        filtered_len > self.limit
    }
}

impl Default for VisibleWindow {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
