// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timelines for Keyline.
//!
//! This crate provides:
//! - [`Timeline`], the keyframe/value store and its segment lookup
//! - The structural edits (insert, remove, move) that keep it consistent
//! - Undoable [`RecordCommand`]s for every edit, handed to an external history
//! - [`Subject`]s that notify observers of value and keyframe changes
//! - [`KeyframeProperty`], which ties a timeline to its segment window
//!
//! ## Architecture
//!
//! Properties live behind `Rc` and commands keep only a `Weak` handle, so a
//! command left in an undo history never keeps its property alive. A command
//! whose property is gone does nothing.

pub mod command;
pub mod notify;
pub mod property;
pub mod time;
pub mod timeline;
pub mod value;

pub use command::{
    AddKeyframe, ChangeEasing, ChangeValue, CommandSink, MoveKeyframe, RecordCommand, RemoveKeyframe,
};
pub use notify::{Observer, ObserverError, Subject, Subscription};
pub use property::{
    ColorProperty, EaseProperty, EasingChanged, KeyframeAdded, KeyframeMoved, KeyframeProperty,
    KeyframeRemoved, PropertyEvents, PropertyId, PropertyMetadata, TimelineReset, ValueChanged,
};
pub use time::{ClipWindow, Frame, SegmentWindow, TimeRange};
pub use timeline::{Segment, Timeline, TimelineSnapshot};
pub use value::{Channels, Color, ScalarLimits};

use keyline_easing::EasingError;

/// Sequencer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    /// Frame outside the open interval `(0, length)`
    #[error("Frame {frame} is outside the segment (0, {length})")]
    OutOfRange {
        /// Rejected frame
        frame: Frame,
        /// Segment length at the time of the edit
        length: Frame,
    },

    /// Index outside its sequence
    #[error("Index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        /// Rejected index
        index: usize,
        /// Sequence length
        len: usize,
    },

    /// No keyframe sits at this frame
    #[error("No keyframe at frame {0}")]
    KeyframeNotFound(Frame),

    /// Persisted sequences break the timeline layout
    #[error("Invalid timeline layout: {0}")]
    InvalidLayout(String),

    /// The easing is an unregistered strategy and cannot be written out
    #[error("Property {0} uses an unregistered easing that cannot be persisted")]
    UnpersistableEasing(String),

    /// Easing lookup failed
    #[error(transparent)]
    Easing(#[from] EasingError),
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
