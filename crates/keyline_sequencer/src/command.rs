// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undoable edits.
//!
//! Every change to a property is a [`RecordCommand`]. Commands capture what
//! they need when they are built and reject invalid input then, so a command
//! that exists can always be applied. They hold a weak handle to their
//! property; once the property is dropped they do nothing.

use crate::property::{
    EasingChanged, KeyframeAdded, KeyframeMoved, KeyframeProperty, KeyframeRemoved, ValueChanged,
};
use crate::time::Frame;
use crate::value::Channels;
use crate::{Result, SequencerError};
use keyline_easing::EasingKind;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// An edit that an undo history can replay in both directions
pub trait RecordCommand {
    /// Get a description of this command
    fn name(&self) -> &str;

    /// Perform the edit
    fn apply(&self);

    /// Perform the edit again after it was reverted
    fn reapply(&self) {
        self.apply();
    }

    /// Undo the edit
    fn revert(&self);
}

/// Receives commands, typically an undo history
pub trait CommandSink {
    /// Apply `command` and keep it for later undo
    fn execute(&mut self, command: Box<dyn RecordCommand>);
}

fn upgrade<V: Channels>(property: &Weak<KeyframeProperty<V>>, command: &str) -> Option<Rc<KeyframeProperty<V>>> {
    let property = property.upgrade();
    if property.is_none() {
        tracing::warn!(command, "property dropped, command ignored");
    }
    property
}

fn check_frame(frame: Frame, length: Frame) -> Result<()> {
    if frame <= 0 || frame >= length {
        return Err(SequencerError::OutOfRange { frame, length });
    }
    Ok(())
}

/// Replace one boundary or keyframe value
#[derive(Debug)]
pub struct ChangeValue<V: Channels> {
    property: Weak<KeyframeProperty<V>>,
    index: usize,
    old: V,
    new: V,
}

impl<V: Channels> ChangeValue<V> {
    /// Build the command; `value` is brought within the property's limits
    pub fn new(property: &Rc<KeyframeProperty<V>>, index: usize, value: V) -> Result<Self> {
        let timeline = property.timeline();
        let Some(&old) = timeline.values().get(index) else {
            return Err(SequencerError::IndexOutOfRange {
                index,
                len: timeline.values().len(),
            });
        };
        Ok(Self {
            property: Rc::downgrade(property),
            index,
            old,
            new: value.constrain(timeline.limits()),
        })
    }

    /// Value written by [`RecordCommand::apply`]
    pub fn new_value(&self) -> V {
        self.new
    }

    /// Value written by [`RecordCommand::revert`]
    pub fn old_value(&self) -> V {
        self.old
    }

    fn write(&self, value: V) {
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let result = property.timeline_mut().set_value(self.index, value);
        match result {
            Ok(_) => {
                tracing::debug!(property = property.name(), index = self.index, ?value, "value changed");
                property.events().value_changed.publish(&ValueChanged {
                    index: self.index,
                    value,
                });
            }
            Err(error) => tracing::warn!(property = property.name(), %error, "value change skipped"),
        }
    }
}

impl<V: Channels> RecordCommand for ChangeValue<V> {
    fn name(&self) -> &str {
        "Change value"
    }

    fn apply(&self) {
        self.write(self.new);
    }

    fn revert(&self) {
        self.write(self.old);
    }
}

/// Swap the easing.
///
/// The same two instances trade places on every apply and revert.
#[derive(Debug)]
pub struct ChangeEasing<V: Channels> {
    property: Weak<KeyframeProperty<V>>,
    stashed: RefCell<Option<EasingKind>>,
    applied: Cell<bool>,
}

impl<V: Channels> ChangeEasing<V> {
    /// Build the command for an already resolved easing
    pub fn new(property: &Rc<KeyframeProperty<V>>, easing: EasingKind) -> Self {
        Self {
            property: Rc::downgrade(property),
            stashed: RefCell::new(Some(easing)),
            applied: Cell::new(false),
        }
    }

    fn swap(&self) {
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let Some(incoming) = self.stashed.borrow_mut().take() else {
            return;
        };
        let outgoing = property.timeline_mut().replace_easing(incoming);
        let name = property.easing_name();
        tracing::debug!(property = property.name(), from = outgoing.name(), to = %name, "easing changed");
        *self.stashed.borrow_mut() = Some(outgoing);
        self.applied.set(!self.applied.get());
        property.events().easing_changed.publish(&EasingChanged { name });
    }
}

impl<V: Channels> RecordCommand for ChangeEasing<V> {
    fn name(&self) -> &str {
        "Change easing"
    }

    fn apply(&self) {
        if !self.applied.get() {
            self.swap();
        }
    }

    fn revert(&self) {
        if self.applied.get() {
            self.swap();
        }
    }
}

/// Insert a keyframe
#[derive(Debug)]
pub struct AddKeyframe<V: Channels> {
    property: Weak<KeyframeProperty<V>>,
    frame: Frame,
    value: V,
    position: Cell<Option<usize>>,
}

impl<V: Channels> AddKeyframe<V> {
    /// Build the command; `frame` is local and must lie inside the segment
    pub fn new(property: &Rc<KeyframeProperty<V>>, frame: Frame, value: V) -> Result<Self> {
        check_frame(frame, property.length())?;
        let value = value.constrain(property.timeline().limits());
        Ok(Self {
            property: Rc::downgrade(property),
            frame,
            value,
            position: Cell::new(None),
        })
    }

    /// Local frame of the new keyframe
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Value of the new keyframe
    pub fn value(&self) -> V {
        self.value
    }
}

impl<V: Channels> RecordCommand for AddKeyframe<V> {
    fn name(&self) -> &str {
        "Add keyframe"
    }

    fn apply(&self) {
        if self.position.get().is_some() {
            return;
        }
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let length = property.length();
        let result = property.timeline_mut().insert(self.frame, self.value, length);
        match result {
            Ok(index) => {
                let position = index - 1;
                self.position.set(Some(position));
                tracing::debug!(property = property.name(), frame = self.frame, position, "keyframe added");
                property.events().keyframe_added.publish(&KeyframeAdded {
                    frame: self.frame,
                    index: position,
                });
            }
            Err(error) => tracing::warn!(property = property.name(), %error, "keyframe insert skipped"),
        }
    }

    fn revert(&self) {
        let Some(position) = self.position.get() else {
            return;
        };
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let removed = property.timeline_mut().take(position, self.frame);
        if removed.is_none() {
            tracing::warn!(property = property.name(), frame = self.frame, "added keyframe is gone");
            return;
        }
        self.position.set(None);
        tracing::debug!(property = property.name(), frame = self.frame, position, "keyframe add reverted");
        property.events().keyframe_removed.publish(&KeyframeRemoved {
            frame: self.frame,
            index: position,
        });
    }
}

/// Remove the keyframe at a frame
#[derive(Debug)]
pub struct RemoveKeyframe<V: Channels> {
    property: Weak<KeyframeProperty<V>>,
    frame: Frame,
    value: Cell<V>,
    position: Cell<Option<usize>>,
}

impl<V: Channels> RemoveKeyframe<V> {
    /// Build the command; a keyframe must sit at the local `frame`
    pub fn new(property: &Rc<KeyframeProperty<V>>, frame: Frame) -> Result<Self> {
        check_frame(frame, property.length())?;
        let timeline = property.timeline();
        let Some(position) = timeline.position_of(frame) else {
            return Err(SequencerError::KeyframeNotFound(frame));
        };
        Ok(Self {
            property: Rc::downgrade(property),
            frame,
            value: Cell::new(timeline.values()[position + 1]),
            position: Cell::new(None),
        })
    }

    /// Local frame of the removed keyframe
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Value the removed keyframe held
    pub fn value(&self) -> V {
        self.value.get()
    }
}

impl<V: Channels> RecordCommand for RemoveKeyframe<V> {
    fn name(&self) -> &str {
        "Remove keyframe"
    }

    fn apply(&self) {
        if self.position.get().is_some() {
            return;
        }
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let length = property.length();
        let result = property.timeline_mut().remove(self.frame, length);
        match result {
            Ok(Some((index, value))) => {
                let position = index - 1;
                self.position.set(Some(position));
                self.value.set(value);
                tracing::debug!(property = property.name(), frame = self.frame, position, "keyframe removed");
                property.events().keyframe_removed.publish(&KeyframeRemoved {
                    frame: self.frame,
                    index: position,
                });
            }
            Ok(None) => tracing::warn!(property = property.name(), frame = self.frame, "no keyframe to remove"),
            Err(error) => tracing::warn!(property = property.name(), %error, "keyframe removal skipped"),
        }
    }

    fn revert(&self) {
        let Some(position) = self.position.get() else {
            return;
        };
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        property.timeline_mut().restore(position, self.frame, self.value.get());
        self.position.set(None);
        tracing::debug!(property = property.name(), frame = self.frame, position, "keyframe removal reverted");
        property.events().keyframe_added.publish(&KeyframeAdded {
            frame: self.frame,
            index: position,
        });
    }
}

/// Move a keyframe to another frame, keeping its value
#[derive(Debug)]
pub struct MoveKeyframe<V: Channels> {
    property: Weak<KeyframeProperty<V>>,
    from_index: usize,
    from_frame: Frame,
    to_frame: Frame,
    new_index: Cell<Option<usize>>,
}

impl<V: Channels> MoveKeyframe<V> {
    /// Build the command; `to_frame` is local and must lie inside the segment
    pub fn new(property: &Rc<KeyframeProperty<V>>, from_index: usize, to_frame: Frame) -> Result<Self> {
        check_frame(to_frame, property.length())?;
        let timeline = property.timeline();
        let Some(&from_frame) = timeline.times().get(from_index) else {
            return Err(SequencerError::IndexOutOfRange {
                index: from_index,
                len: timeline.keyframe_count(),
            });
        };
        Ok(Self {
            property: Rc::downgrade(property),
            from_index,
            from_frame,
            to_frame,
            new_index: Cell::new(None),
        })
    }

    /// Position the keyframe ended up at, once applied
    pub fn new_index(&self) -> Option<usize> {
        self.new_index.get()
    }
}

impl<V: Channels> RecordCommand for MoveKeyframe<V> {
    fn name(&self) -> &str {
        "Move keyframe"
    }

    fn apply(&self) {
        if self.new_index.get().is_some() {
            return;
        }
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        let length = property.length();
        let result = property
            .timeline_mut()
            .move_keyframe(self.from_index, self.to_frame, length);
        match result {
            Ok(new_index) => {
                self.new_index.set(Some(new_index));
                tracing::debug!(
                    property = property.name(),
                    from = self.from_index,
                    to = new_index,
                    frame = self.to_frame,
                    "keyframe moved"
                );
                property.events().keyframe_moved.publish(&KeyframeMoved {
                    from: self.from_index,
                    to: new_index,
                });
            }
            Err(error) => tracing::warn!(property = property.name(), %error, "keyframe move skipped"),
        }
    }

    fn revert(&self) {
        let Some(new_index) = self.new_index.get() else {
            return;
        };
        let Some(property) = upgrade(&self.property, self.name()) else {
            return;
        };
        property
            .timeline_mut()
            .restore_move(new_index, self.from_index, self.from_frame);
        self.new_index.set(None);
        tracing::debug!(property = property.name(), from = new_index, to = self.from_index, "keyframe move reverted");
        property.events().keyframe_moved.publish(&KeyframeMoved {
            from: new_index,
            to: self.from_index,
        });
    }
}
