//! evs-window
//!
//! Event-window extraction and window-level statistics.
//!
//! Pipeline per (symbol, event): ALIGN -> EXTRACT -> REDUCE
//!
//! - Align: calendar date -> nearest observation index (ties -> earlier date)
//! - Extract: pre `[p-pre, p)` and post `[p+1, p+1+post)`; the event day is in neither
//! - Reduce: sample std (n-1) and mean per window, or |ret_p| / median baseline
//!
//! Pure deterministic logic. No IO, no logging. "Not enough data" is a
//! [`SkipReason`], never a panic.

mod align;
mod impact;
pub mod summary;
mod window;

pub use align::{nearest_position, Dated};
pub use impact::{event_day_impact, event_day_impact_around, EventDayImpact};
pub use window::{extract_windows, window_stats, window_stats_around, WindowPair, WindowStats};

use std::fmt;

/// Default pre-event window length (trading days).
pub const DEFAULT_PRE_DAYS: usize = 5;
/// Default post-event window length (trading days).
pub const DEFAULT_POST_DAYS: usize = 5;
/// Default trailing baseline length for the impact ratio (trading days).
pub const DEFAULT_BASELINE_WINDOW: usize = 20;

/// Why no row was produced for a (symbol, event) pair.
///
/// Every variant is recoverable: the caller skips the pair and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Series is empty; the date cannot be mapped.
    UnresolvableAlignment,
    /// Aligned to the first observation; no prior data exists.
    EventAtSeriesStart,
    /// Pre window has no observations.
    EmptyPreWindow,
    /// Post window has no observations (series ends at the event).
    EmptyPostWindow,
    /// Trailing baseline slice is empty.
    EmptyBaseline,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnresolvableAlignment => "UNRESOLVABLE_ALIGNMENT",
            SkipReason::EventAtSeriesStart => "EVENT_AT_SERIES_START",
            SkipReason::EmptyPreWindow => "EMPTY_PRE_WINDOW",
            SkipReason::EmptyPostWindow => "EMPTY_POST_WINDOW",
            SkipReason::EmptyBaseline => "EMPTY_BASELINE",
        }
    }

    /// True for the window-shape rejections grouped as "insufficient window".
    pub fn is_insufficient_window(&self) -> bool {
        !matches!(self, SkipReason::UnresolvableAlignment)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SkipReason {}
