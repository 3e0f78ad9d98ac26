// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frames and the time window a property is sampled in.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// A frame number. Absolute frames count from the start of the parent
/// timeline, local frames from the start of the owning segment.
pub type Frame = i64;

/// Placement of a segment inside its parent timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SegmentWindow {
    /// First frame of the segment in the parent timeline
    pub start: Frame,
    /// Number of frames in the segment
    pub length: Frame,
}

impl SegmentWindow {
    /// Create a window
    pub fn new(start: Frame, length: Frame) -> Self {
        Self { start, length }
    }

    /// Frame just past the segment in the parent timeline
    pub fn end(&self) -> Frame {
        self.start + self.length
    }

    /// Convert an absolute frame to a segment-local one
    pub fn to_local(&self, absolute: Frame) -> Frame {
        absolute - self.start
    }

    /// Convert a segment-local frame to an absolute one
    pub fn to_absolute(&self, local: Frame) -> Frame {
        local + self.start
    }

    /// Whether `local` may hold an interior keyframe
    pub fn is_interior(&self, local: Frame) -> bool {
        local > 0 && local < self.length
    }
}

/// Supplies the window of the segment that owns a property.
///
/// The property never stores its window; it asks on every sample and edit.
pub trait TimeRange {
    /// Current placement of the owning segment
    fn segment_window(&self) -> SegmentWindow;
}

impl TimeRange for SegmentWindow {
    fn segment_window(&self) -> SegmentWindow {
        *self
    }
}

/// A window that its owner can move or resize after properties are attached
#[derive(Debug, Default)]
pub struct ClipWindow {
    window: Cell<SegmentWindow>,
}

impl ClipWindow {
    /// Create a clip window
    pub fn new(start: Frame, length: Frame) -> Self {
        Self {
            window: Cell::new(SegmentWindow::new(start, length)),
        }
    }

    /// Move the clip to a new start frame
    pub fn set_start(&self, start: Frame) {
        let mut window = self.window.get();
        window.start = start;
        self.window.set(window);
    }

    /// Change the clip length
    pub fn set_length(&self, length: Frame) {
        let mut window = self.window.get();
        window.length = length;
        self.window.set(window);
    }
}

impl TimeRange for ClipWindow {
    fn segment_window(&self) -> SegmentWindow {
        self.window.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_conversion() {
        let window = SegmentWindow::new(30, 100);
        assert_eq!(window.to_local(80), 50);
        assert_eq!(window.to_absolute(50), 80);
        assert_eq!(window.end(), 130);
    }

    #[test]
    fn test_interior_is_open_range() {
        let window = SegmentWindow::new(0, 100);
        assert!(!window.is_interior(0));
        assert!(window.is_interior(1));
        assert!(window.is_interior(99));
        assert!(!window.is_interior(100));
        assert!(!window.is_interior(-5));
    }

    #[test]
    fn test_clip_window_updates() {
        let clip = ClipWindow::new(10, 50);
        clip.set_start(20);
        clip.set_length(60);
        assert_eq!(clip.segment_window(), SegmentWindow::new(20, 60));
    }
}
