// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe storage, segment lookup and the structural edits.
//!
//! A timeline keeps interior keyframe positions in `times` (ascending, each
//! strictly inside the owning segment) and one value per anchor in `values`:
//! the start boundary, one entry per interior keyframe, then the end boundary.
//! `values.len() == times.len() + 2` holds after every call, successful or not.

use crate::time::Frame;
use crate::value::Channels;
use crate::{Result, SequencerError};
use keyline_easing::{detached_owner, EasingKind, OwnerHandle};
use serde::{Deserialize, Serialize};

/// The stretch of a timeline a frame falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Local frame the segment starts at
    pub start: Frame,
    /// Local frame the segment ends at
    pub end: Frame,
    /// Index in `values` of the value at `start`; the end value follows it
    pub index: usize,
}

impl Segment {
    /// Number of frames in the segment
    pub fn duration(&self) -> Frame {
        self.end - self.start
    }
}

/// Keyframes and values for one animatable property
#[derive(Debug)]
pub struct Timeline<V: Channels> {
    times: Vec<Frame>,
    values: Vec<V>,
    easing: EasingKind,
    limits: V::Limits,
    offset: f32,
    owner: OwnerHandle,
}

impl<V: Channels> Timeline<V> {
    /// Create a timeline with both boundaries at `default` and no interior keyframes
    pub fn new(default: V, easing: EasingKind, limits: V::Limits) -> Self {
        Self {
            times: Vec::new(),
            values: vec![default, default],
            easing,
            limits,
            offset: 0.0,
            owner: detached_owner(),
        }
    }

    /// Rebuild a timeline from persisted sequences.
    ///
    /// Interior frames must be positive and ascending, and there must be exactly
    /// two more values than frames.
    pub fn from_parts(
        times: Vec<Frame>,
        values: Vec<V>,
        easing: EasingKind,
        limits: V::Limits,
    ) -> Result<Self> {
        if values.len() != times.len() + 2 {
            return Err(SequencerError::InvalidLayout(format!(
                "{} keyframes need {} values, got {}",
                times.len(),
                times.len() + 2,
                values.len()
            )));
        }
        if times.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(SequencerError::InvalidLayout("keyframes are not in ascending order".to_string()));
        }
        if times.first().is_some_and(|&first| first <= 0) {
            return Err(SequencerError::InvalidLayout("keyframes must follow frame 0".to_string()));
        }
        Ok(Self {
            times,
            values,
            easing,
            limits,
            offset: 0.0,
            owner: detached_owner(),
        })
    }

    /// Interior keyframe positions, ascending
    pub fn times(&self) -> &[Frame] {
        &self.times
    }

    /// Anchor values: start boundary, interior keyframes, end boundary
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of interior keyframes
    pub fn keyframe_count(&self) -> usize {
        self.times.len()
    }

    /// Current easing
    pub fn easing(&self) -> &EasingKind {
        &self.easing
    }

    /// Mutable access to the current easing, e.g. to tune its parameters
    pub fn easing_mut(&mut self) -> &mut EasingKind {
        &mut self.easing
    }

    /// Value limits
    pub fn limits(&self) -> &V::Limits {
        &self.limits
    }

    /// Additive bias applied after interpolation when the limits enable it
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Set the additive bias
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Index of the first keyframe at `frame`
    pub fn position_of(&self, frame: Frame) -> Option<usize> {
        self.times.iter().position(|&t| t == frame)
    }

    /// Find the segment a local frame falls into.
    ///
    /// When keyframes coincide the last bracketing pair wins.
    pub fn segment_at(&self, local: Frame, length: Frame) -> Segment {
        let (Some(&first), Some(&last)) = (self.times.first(), self.times.last()) else {
            return Segment { start: 0, end: length, index: 0 };
        };

        if local <= first {
            return Segment { start: 0, end: first, index: 0 };
        }
        if local >= last {
            return Segment {
                start: last,
                end: length,
                index: self.times.len(),
            };
        }

        let mut pair = 0;
        for (i, window) in self.times.windows(2).enumerate() {
            if window[0] <= local && local <= window[1] {
                pair = i;
            }
        }
        Segment {
            start: self.times[pair],
            end: self.times[pair + 1],
            index: pair + 1,
        }
    }

    /// Sample the timeline at a local frame
    pub fn value_at(&self, local: Frame, length: Frame) -> V {
        let segment = self.segment_at(local, length);
        let from = self.values[segment.index];
        let to = self.values[segment.index + 1];
        let elapsed = local - segment.start;
        let duration = segment.duration();

        let eased = V::from_channels(|c| {
            self.easing
                .interpolate(elapsed, duration, from.channel(c), to.channel(c))
        });
        eased.finish(&self.limits, self.offset)
    }

    /// Insert a keyframe, returning the index of its value in `values`.
    ///
    /// The keyframe lands before any existing keyframe at the same frame.
    pub fn insert(&mut self, frame: Frame, value: V, length: Frame) -> Result<usize> {
        check_frame(frame, length)?;
        let position = self.times.partition_point(|&t| t < frame);
        self.times.insert(position, frame);
        self.values.insert(position + 1, value);
        Ok(position + 1)
    }

    /// Remove the first keyframe at `frame`.
    ///
    /// Returns the index its value had in `values` and the value itself, or
    /// `None` when no keyframe sits at `frame`.
    pub fn remove(&mut self, frame: Frame, length: Frame) -> Result<Option<(usize, V)>> {
        check_frame(frame, length)?;
        let Some(position) = self.position_of(frame) else {
            return Ok(None);
        };
        self.times.remove(position);
        let value = self.values.remove(position + 1);
        Ok(Some((position + 1, value)))
    }

    /// Move keyframe `from_index` to `to_frame`, returning its new index in `times`.
    ///
    /// The keyframe keeps its value; every other keyframe keeps its relative order.
    pub fn move_keyframe(&mut self, from_index: usize, to_frame: Frame, length: Frame) -> Result<usize> {
        check_frame(to_frame, length)?;
        check_index(from_index, self.times.len())?;

        self.times.remove(from_index);
        let new_index = self.times.partition_point(|&t| t < to_frame);
        self.times.insert(new_index, to_frame);

        let value = self.values.remove(from_index + 1);
        self.values.insert(new_index + 1, value);
        Ok(new_index)
    }

    /// Replace the value at `index` in `values`, returning the previous one
    pub fn set_value(&mut self, index: usize, value: V) -> Result<V> {
        check_index(index, self.values.len())?;
        Ok(std::mem::replace(&mut self.values[index], value))
    }

    /// Swap in a new easing, returning the previous one.
    ///
    /// The outgoing strategy is unloaded and the incoming one loaded with the
    /// timeline's owner.
    pub fn replace_easing(&mut self, mut easing: EasingKind) -> EasingKind {
        self.easing.unload();
        easing.load(&self.owner);
        std::mem::replace(&mut self.easing, easing)
    }

    /// Handle passed to strategies when they are loaded
    pub fn owner(&self) -> &OwnerHandle {
        &self.owner
    }

    /// Set the owner and load the current easing with it
    pub(crate) fn attach(&mut self, owner: OwnerHandle) {
        self.owner = owner;
        self.easing.load(&self.owner);
    }

    /// Unload the current easing before the timeline is discarded
    pub(crate) fn detach(&mut self) {
        self.easing.unload();
    }

    /// Put a removed keyframe back at its exact position
    pub(crate) fn restore(&mut self, position: usize, frame: Frame, value: V) {
        let position = position.min(self.times.len());
        self.times.insert(position, frame);
        self.values.insert(position + 1, value);
    }

    /// Remove the keyframe at `position` in `times` if it sits at `frame`
    pub(crate) fn take(&mut self, position: usize, frame: Frame) -> Option<V> {
        if self.times.get(position) != Some(&frame) {
            return None;
        }
        self.times.remove(position);
        Some(self.values.remove(position + 1))
    }

    /// Undo [`Timeline::move_keyframe`]
    pub(crate) fn restore_move(&mut self, new_index: usize, from_index: usize, old_frame: Frame) {
        if new_index >= self.times.len() {
            return;
        }
        self.times.remove(new_index);
        let from_index = from_index.min(self.times.len());
        self.times.insert(from_index, old_frame);

        let value = self.values.remove(new_index + 1);
        self.values.insert(from_index + 1, value);
    }

    /// Copy the persisted part of the timeline.
    ///
    /// An unregistered easing is recorded by its display name only and cannot
    /// be resolved again.
    pub fn snapshot(&self) -> TimelineSnapshot<V> {
        TimelineSnapshot {
            times: self.times.clone(),
            values: self.values.clone(),
            easing: self.easing.name().to_string(),
            parameters: self.easing.parameters(),
        }
    }
}

/// Plain sequences handed to an external serializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TimelineSnapshot<V: Channels> {
    /// Interior keyframe positions
    pub times: Vec<Frame>,
    /// Anchor values
    pub values: Vec<V>,
    /// Display name of the easing
    pub easing: String,
    /// Parameters saved by the easing strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

fn check_frame(frame: Frame, length: Frame) -> Result<()> {
    if frame <= 0 || frame >= length {
        return Err(SequencerError::OutOfRange { frame, length });
    }
    Ok(())
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(SequencerError::IndexOutOfRange { index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Color, ScalarLimits};
    use keyline_easing::{Curve, EasingRegistry, PrimitiveEasing};

    const LENGTH: Frame = 100;

    fn scalar(start: f32, end: f32) -> Timeline<f32> {
        let mut timeline = Timeline::new(start, EasingKind::Linear, ScalarLimits::unbounded());
        timeline.set_value(1, end).unwrap();
        timeline
    }

    fn assert_layout<V: Channels>(timeline: &Timeline<V>) {
        assert_eq!(timeline.values().len(), timeline.times().len() + 2);
        assert!(timeline.times().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_new_has_two_boundaries() {
        let timeline = Timeline::new(3.0f32, EasingKind::Linear, ScalarLimits::unbounded());
        assert!(timeline.times().is_empty());
        assert_eq!(timeline.values(), &[3.0, 3.0]);
    }

    #[test]
    fn test_midpoint_of_empty_timeline() {
        let timeline = scalar(0.0, 10.0);
        assert_eq!(timeline.value_at(50, LENGTH), 5.0);
    }

    #[test]
    fn test_insert_then_sample_at_keyframe() {
        let mut timeline = scalar(0.0, 10.0);
        assert_eq!(timeline.insert(25, 2.0, LENGTH).unwrap(), 1);
        assert_eq!(timeline.times(), &[25]);
        assert_eq!(timeline.values(), &[0.0, 2.0, 10.0]);
        assert_eq!(timeline.value_at(25, LENGTH), 2.0);
    }

    #[test]
    fn test_move_keeps_value_order() {
        let mut timeline = scalar(0.0, 10.0);
        timeline.insert(25, 2.0, LENGTH).unwrap();
        assert_eq!(timeline.move_keyframe(0, 75, LENGTH).unwrap(), 0);
        assert_eq!(timeline.times(), &[75]);
        assert_eq!(timeline.values(), &[0.0, 2.0, 10.0]);
        assert_eq!(timeline.value_at(75, LENGTH), 2.0);
    }

    #[test]
    fn test_insert_outside_segment_is_rejected() {
        let mut timeline = scalar(0.0, 10.0);
        timeline.insert(40, 4.0, LENGTH).unwrap();
        let before = timeline.snapshot();

        for frame in [0, -3, LENGTH, LENGTH + 1] {
            let err = timeline.insert(frame, 1.0, LENGTH).unwrap_err();
            assert!(matches!(err, SequencerError::OutOfRange { .. }));
        }
        assert_eq!(timeline.snapshot(), before);
    }

    #[test]
    fn test_boundaries_hold_with_interior_keyframes() {
        let mut timeline = scalar(1.5, 8.25);
        timeline.insert(10, -4.0, LENGTH).unwrap();
        timeline.insert(90, 40.0, LENGTH).unwrap();
        timeline.insert(50, 0.3, LENGTH).unwrap();

        assert_eq!(timeline.value_at(0, LENGTH), timeline.values()[0]);
        assert_eq!(timeline.value_at(LENGTH, LENGTH), timeline.values()[4]);
    }

    #[test]
    fn test_insert_keeps_times_sorted() {
        let mut timeline = scalar(0.0, 0.0);
        for (frame, value) in [(60, 6.0), (20, 2.0), (80, 8.0), (40, 4.0)] {
            timeline.insert(frame, value, LENGTH).unwrap();
            assert_layout(&timeline);
        }
        assert_eq!(timeline.times(), &[20, 40, 60, 80]);
        assert_eq!(timeline.values(), &[0.0, 2.0, 4.0, 6.0, 8.0, 0.0]);
    }

    #[test]
    fn test_insert_then_remove_restores_sequences() {
        let mut timeline = scalar(0.0, 10.0);
        timeline.insert(30, 3.0, LENGTH).unwrap();
        timeline.insert(70, 7.0, LENGTH).unwrap();
        let before = timeline.snapshot();

        let index = timeline.insert(50, 5.0, LENGTH).unwrap();
        let removed = timeline.remove(50, LENGTH).unwrap();
        assert_eq!(removed, Some((index, 5.0)));
        assert_eq!(timeline.snapshot(), before);
    }

    #[test]
    fn test_remove_missing_frame_is_noop() {
        let mut timeline = scalar(0.0, 10.0);
        timeline.insert(30, 3.0, LENGTH).unwrap();
        assert_eq!(timeline.remove(31, LENGTH).unwrap(), None);
        assert_eq!(timeline.times(), &[30]);
        assert!(timeline.remove(0, LENGTH).is_err());
    }

    #[test]
    fn test_move_across_neighbours_shifts_values() {
        let mut timeline = scalar(0.0, 0.0);
        timeline.insert(20, 2.0, LENGTH).unwrap();
        timeline.insert(40, 4.0, LENGTH).unwrap();
        timeline.insert(60, 6.0, LENGTH).unwrap();

        let new_index = timeline.move_keyframe(0, 50, LENGTH).unwrap();
        assert_eq!(new_index, 1);
        assert_eq!(timeline.times(), &[40, 50, 60]);
        assert_eq!(timeline.values(), &[0.0, 4.0, 2.0, 6.0, 0.0]);

        timeline.restore_move(new_index, 0, 20);
        assert_eq!(timeline.times(), &[20, 40, 60]);
        assert_eq!(timeline.values(), &[0.0, 2.0, 4.0, 6.0, 0.0]);
    }

    #[test]
    fn test_move_rejects_bad_input_atomically() {
        let mut timeline = scalar(0.0, 10.0);
        timeline.insert(20, 2.0, LENGTH).unwrap();
        let before = timeline.snapshot();

        assert!(matches!(
            timeline.move_keyframe(0, LENGTH, LENGTH),
            Err(SequencerError::OutOfRange { .. })
        ));
        assert!(matches!(
            timeline.move_keyframe(1, 50, LENGTH),
            Err(SequencerError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(timeline.snapshot(), before);
    }

    #[test]
    fn test_duplicate_frames_last_pair_wins() {
        let mut timeline = scalar(0.0, 0.0);
        timeline.insert(10, 1.0, LENGTH).unwrap();
        timeline.insert(50, 5.0, LENGTH).unwrap();
        timeline.insert(50, 9.0, LENGTH).unwrap();
        timeline.insert(90, 3.0, LENGTH).unwrap();
        assert_eq!(timeline.times(), &[10, 50, 50, 90]);
        assert_eq!(timeline.values(), &[0.0, 1.0, 9.0, 5.0, 3.0, 0.0]);

        let segment = timeline.segment_at(50, LENGTH);
        assert_eq!(segment, Segment { start: 50, end: 90, index: 3 });
        assert_eq!(timeline.value_at(50, LENGTH), 5.0);
    }

    #[test]
    fn test_lookup_is_repeatable() {
        let mut timeline = scalar(0.0, 1.0);
        timeline.insert(33, 0.7, LENGTH).unwrap();
        let first = timeline.value_at(61, LENGTH);
        for _ in 0..10 {
            assert_eq!(timeline.value_at(61, LENGTH).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_limits_and_offset() {
        let mut timeline = Timeline::new(
            0.0f32,
            EasingKind::Linear,
            ScalarLimits::range(0.0, 10.0).with_offset(),
        );
        timeline.set_value(1, 10.0).unwrap();
        timeline.set_offset(3.0);
        assert_eq!(timeline.value_at(50, LENGTH), 8.0);
        assert_eq!(timeline.value_at(90, LENGTH), 10.0);
    }

    #[test]
    fn test_color_interpolates_each_channel() {
        let mut timeline = Timeline::new(Color::rgba(0, 100, 200, 255), EasingKind::Linear, ());
        timeline.set_value(1, Color::rgba(200, 100, 0, 55)).unwrap();
        assert_eq!(timeline.value_at(50, LENGTH), Color::rgba(100, 100, 100, 155));
        assert_eq!(timeline.value_at(LENGTH, LENGTH), Color::rgba(200, 100, 0, 55));
    }

    #[test]
    fn test_named_easing_drives_lookup() {
        let registry = EasingRegistry::with_builtins();
        let mut timeline = scalar(0.0, 100.0);
        let easing = EasingKind::from_strategy(&registry, Box::new(PrimitiveEasing::new(Curve::QuadIn)));
        let previous = timeline.replace_easing(easing);
        assert!(matches!(previous, EasingKind::Linear));
        assert!((timeline.value_at(20, LENGTH) - 4.0).abs() < 1e-3);

        let snapshot = timeline.snapshot();
        assert_eq!(snapshot.easing, PrimitiveEasing::NAME);
        assert_eq!(snapshot.parameters.as_deref(), Some("QuadIn"));
    }

    #[test]
    fn test_from_parts_validates_layout() {
        let parts = |times: Vec<Frame>, values: Vec<f32>| {
            Timeline::from_parts(times, values, EasingKind::Linear, ScalarLimits::default())
        };

        assert!(parts(vec![10, 20], vec![0.0, 1.0, 2.0, 3.0]).is_ok());
        assert!(matches!(
            parts(vec![10, 20], vec![0.0, 1.0]),
            Err(SequencerError::InvalidLayout(_))
        ));
        assert!(matches!(
            parts(vec![20, 10], vec![0.0; 4]),
            Err(SequencerError::InvalidLayout(_))
        ));
        assert!(matches!(
            parts(vec![0], vec![0.0; 3]),
            Err(SequencerError::InvalidLayout(_))
        ));
    }
}
