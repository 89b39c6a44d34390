//! Frame scheduling: in-flight arbitration, visibility gating, and pending
//! resize tracking for one render target.

use helio_core::geometry::Size;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-surface render arbitration.
///
/// Exactly one frame may be in flight at a time. A `render` call arriving
/// while a frame is still being submitted is dropped entirely — not queued,
/// not retried; the next data-change event triggers a fresh render. Visibility
/// is an external signal (the engine does not compute it).
pub struct FrameScheduler {
    in_flight: AtomicBool,
    visible: AtomicBool,
    pending_resize: Mutex<Option<Size<u32>>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            visible: AtomicBool::new(true),
            pending_resize: Mutex::new(None),
        }
    }

    /// Try to claim the in-flight slot for a new frame.
    ///
    /// Returns `false` if a frame is already in flight; the caller must drop
    /// the frame in that case. On `true`, the caller owns the slot until
    /// [`FrameScheduler::end_frame`].
    pub fn begin_frame(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the in-flight slot.
    pub fn end_frame(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Record the external visibility signal.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Whether frames should be produced at all right now.
    pub fn should_render(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Record a resize to apply before the next frame.
    ///
    /// A later resize replaces an earlier unapplied one; only the final size
    /// matters once the next frame begins.
    pub fn request_resize(&self, size: Size<u32>) {
        let mut pending = match self.pending_resize.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some(size);
    }

    /// Take the pending resize, if any.
    pub fn take_resize(&self) -> Option<Size<u32>> {
        let mut pending = match self.pending_resize.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.take()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_while_in_flight_is_rejected() {
        let scheduler = FrameScheduler::new();
        assert!(scheduler.begin_frame());
        // Re-entrant call while the first frame is still being submitted.
        assert!(!scheduler.begin_frame());
        scheduler.end_frame();
        assert!(scheduler.begin_frame());
    }

    #[test]
    fn dropped_frames_are_not_queued() {
        let scheduler = FrameScheduler::new();
        assert!(scheduler.begin_frame());
        assert!(!scheduler.begin_frame());
        assert!(!scheduler.begin_frame());
        scheduler.end_frame();
        // Exactly one new frame can start, regardless of how many were dropped.
        assert!(scheduler.begin_frame());
        assert!(!scheduler.begin_frame());
    }

    #[test]
    fn visibility_gates_rendering() {
        let scheduler = FrameScheduler::new();
        assert!(scheduler.should_render());
        scheduler.set_visible(false);
        assert!(!scheduler.should_render());
        scheduler.set_visible(true);
        assert!(scheduler.should_render());
    }

    #[test]
    fn latest_resize_wins() {
        let scheduler = FrameScheduler::new();
        scheduler.request_resize(Size::new(100, 100));
        scheduler.request_resize(Size::new(200, 150));
        assert_eq!(scheduler.take_resize(), Some(Size::new(200, 150)));
        assert_eq!(scheduler.take_resize(), None);
    }
}
