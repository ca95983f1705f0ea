//! Calendar resolver: maps a timestamp to an iteration number
//!
//! Windows are held ordered by start time. Resolution is an upper-bound
//! search on `start` stepped back one position, then an end-bound check -
//! the same shape as a secondary-index lookup in the host ledger. A miss is
//! not an error: iteration 0 means "no active iteration, system paused".

use std::collections::BTreeMap;

use crate::types::error::{GovError, GovResult};
use crate::types::window::IterationWindow;

/// Ordered, non-overlapping set of iteration windows
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    // keyed by window start; BTreeMap keeps the start-ordering invariant
    windows: BTreeMap<i64, IterationWindow>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window, rejecting inverted bounds and overlaps.
    pub fn add_window(&mut self, window: IterationWindow) -> GovResult<()> {
        if window.end < window.start {
            return Err(GovError::InvalidWindow(window.iteration_number));
        }

        // Neighbour before: must end strictly before this start
        if let Some((_, prev)) = self.windows.range(..=window.start).next_back() {
            if prev.end >= window.start {
                return Err(GovError::WindowOverlap(window.iteration_number));
            }
        }
        // Neighbour after: must start strictly after this end
        if let Some((_, next)) = self.windows.range(window.start..).next() {
            if next.start <= window.end {
                return Err(GovError::WindowOverlap(window.iteration_number));
            }
        }

        self.windows.insert(window.start, window);
        Ok(())
    }

    /// Which iteration is `now` in? 0 when no window covers it.
    pub fn resolve(&self, now: i64) -> u32 {
        match self.windows.range(..=now).next_back() {
            Some((_, window)) if window.contains(now) => window.iteration_number,
            _ => 0,
        }
    }

    /// Look up a window by its iteration number
    pub fn window(&self, iteration: u32) -> Option<&IterationWindow> {
        self.windows
            .values()
            .find(|w| w.iteration_number == iteration)
    }

    /// Windows in start order
    pub fn windows(&self) -> impl Iterator<Item = &IterationWindow> {
        self.windows.values()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_window_calendar() -> Calendar {
        let mut cal = Calendar::new();
        cal.add_window(IterationWindow::new(1, 100, 199)).unwrap();
        cal.add_window(IterationWindow::new(2, 210, 299)).unwrap();
        cal
    }

    #[test]
    fn test_resolve_inside_window() {
        let cal = two_window_calendar();
        assert_eq!(cal.resolve(150), 1);
        assert_eq!(cal.resolve(250), 2);
    }

    #[test]
    fn test_resolve_boundaries_are_inclusive() {
        let cal = two_window_calendar();
        assert_eq!(cal.resolve(100), 1);
        assert_eq!(cal.resolve(199), 1);
        assert_eq!(cal.resolve(210), 2);
        assert_eq!(cal.resolve(299), 2);
    }

    #[test]
    fn test_resolve_gap_between_windows_is_zero() {
        let cal = two_window_calendar();
        assert_eq!(cal.resolve(200), 0);
        assert_eq!(cal.resolve(205), 0);
        assert_eq!(cal.resolve(209), 0);
    }

    #[test]
    fn test_resolve_before_first_window_is_zero() {
        let cal = two_window_calendar();
        assert_eq!(cal.resolve(0), 0);
        assert_eq!(cal.resolve(99), 0);
    }

    #[test]
    fn test_resolve_after_last_window_is_zero() {
        let cal = two_window_calendar();
        assert_eq!(cal.resolve(300), 0);
        assert_eq!(cal.resolve(100_000), 0);
    }

    #[test]
    fn test_resolve_empty_calendar() {
        let cal = Calendar::new();
        assert_eq!(cal.resolve(12345), 0);
    }

    #[test]
    fn test_add_window_rejects_inverted_bounds() {
        let mut cal = Calendar::new();
        let err = cal.add_window(IterationWindow::new(1, 200, 100)).unwrap_err();
        assert_eq!(err, GovError::InvalidWindow(1));
    }

    #[test]
    fn test_add_window_rejects_overlap() {
        let mut cal = two_window_calendar();
        // Overlaps window 1 from the left side
        let err = cal.add_window(IterationWindow::new(3, 150, 205)).unwrap_err();
        assert_eq!(err, GovError::WindowOverlap(3));
        // Touching an existing end is still an overlap (boundaries inclusive)
        let err = cal.add_window(IterationWindow::new(3, 199, 205)).unwrap_err();
        assert_eq!(err, GovError::WindowOverlap(3));
        // Overlaps window 2 from the right side
        let err = cal.add_window(IterationWindow::new(3, 205, 210)).unwrap_err();
        assert_eq!(err, GovError::WindowOverlap(3));
        // Clean fit in the gap works
        cal.add_window(IterationWindow::new(3, 202, 208)).unwrap();
        assert_eq!(cal.resolve(205), 3);
    }

    #[test]
    fn test_window_lookup_by_iteration() {
        let cal = two_window_calendar();
        assert_eq!(cal.window(2).unwrap().start, 210);
        assert!(cal.window(9).is_none());
    }
}
