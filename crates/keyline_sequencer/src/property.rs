// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable properties: a timeline bound to the segment that owns it.
//!
//! A [`KeyframeProperty`] is shared through `Rc`. Reads go straight to the
//! timeline; every edit is built as a command so an external history can undo
//! it.

use crate::command::{AddKeyframe, ChangeEasing, ChangeValue, MoveKeyframe, RemoveKeyframe};
use crate::notify::Subject;
use crate::time::{Frame, SegmentWindow, TimeRange};
use crate::timeline::{Timeline, TimelineSnapshot};
use crate::value::{Channels, Color};
use crate::{Result, SequencerError};
use keyline_easing::{EasingFunction, EasingKind, EasingOwner, EasingRegistry, OwnerHandle};
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub Uuid);

impl PropertyId {
    /// Create a new random property ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PropertyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Static configuration of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PropertyMetadata<V: Channels> {
    /// Display name
    pub name: String,
    /// Value both boundaries start with
    pub default_value: V,
    /// Registry name of the starting easing; `None` means linear
    #[serde(default)]
    pub default_easing: Option<String>,
    /// Limits applied to edited and sampled values
    #[serde(default)]
    pub limits: V::Limits,
}

impl<V: Channels> PropertyMetadata<V> {
    /// Create metadata with linear easing and default limits
    pub fn new(name: impl Into<String>, default_value: V) -> Self {
        Self {
            name: name.into(),
            default_value,
            default_easing: None,
            limits: V::Limits::default(),
        }
    }

    /// Start with the registry easing called `easing`
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.default_easing = Some(easing.into());
        self
    }

    /// Set value limits
    pub fn with_limits(mut self, limits: V::Limits) -> Self {
        self.limits = limits;
        self
    }
}

/// A boundary or keyframe value was replaced
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged<V> {
    /// Index in the timeline's values
    pub index: usize,
    /// The value now stored there
    pub value: V,
}

/// The easing was replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EasingChanged {
    /// Display name of the easing now in use
    pub name: String,
}

/// A keyframe was inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeAdded {
    /// Local frame of the keyframe
    pub frame: Frame,
    /// Position among the interior keyframes
    pub index: usize,
}

/// A keyframe was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeRemoved {
    /// Local frame the keyframe sat at
    pub frame: Frame,
    /// Position it had among the interior keyframes
    pub index: usize,
}

/// A keyframe changed position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeMoved {
    /// Previous position among the interior keyframes
    pub from: usize,
    /// New position among the interior keyframes
    pub to: usize,
}

/// The whole timeline was replaced from persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineReset {
    /// Interior keyframes after the reset
    pub keyframes: usize,
}

/// Notification channels of one property
#[derive(Debug)]
pub struct PropertyEvents<V: Channels> {
    /// Boundary or keyframe values
    pub value_changed: Subject<ValueChanged<V>>,
    /// Easing selection
    pub easing_changed: Subject<EasingChanged>,
    /// Keyframe insertions
    pub keyframe_added: Subject<KeyframeAdded>,
    /// Keyframe removals
    pub keyframe_removed: Subject<KeyframeRemoved>,
    /// Keyframe moves
    pub keyframe_moved: Subject<KeyframeMoved>,
    /// Timeline replaced wholesale
    pub reset: Subject<TimelineReset>,
}

impl<V: Channels> Default for PropertyEvents<V> {
    fn default() -> Self {
        Self {
            value_changed: Subject::new(),
            easing_changed: Subject::new(),
            keyframe_added: Subject::new(),
            keyframe_removed: Subject::new(),
            keyframe_moved: Subject::new(),
            reset: Subject::new(),
        }
    }
}

/// A value animated over the segment that owns it
pub struct KeyframeProperty<V: Channels> {
    id: PropertyId,
    metadata: PropertyMetadata<V>,
    timeline: RefCell<Timeline<V>>,
    window: RefCell<Rc<dyn TimeRange>>,
    events: PropertyEvents<V>,
}

/// A scalar property
pub type EaseProperty = KeyframeProperty<f32>;

/// A color property
pub type ColorProperty = KeyframeProperty<Color>;

impl<V: Channels> KeyframeProperty<V> {
    /// Create a property using the process-wide easing registry
    pub fn new(metadata: PropertyMetadata<V>, window: Rc<dyn TimeRange>) -> Result<Rc<Self>> {
        let easing = {
            let registry = keyline_easing::global().read();
            EasingKind::resolve(&registry, metadata.default_easing.as_deref())?
        };
        Ok(Self::build(metadata, window, easing))
    }

    /// Create a property, resolving its default easing in `registry`
    pub fn with_registry(
        metadata: PropertyMetadata<V>,
        window: Rc<dyn TimeRange>,
        registry: &EasingRegistry,
    ) -> Result<Rc<Self>> {
        let easing = EasingKind::resolve(registry, metadata.default_easing.as_deref())?;
        Ok(Self::build(metadata, window, easing))
    }

    fn build(metadata: PropertyMetadata<V>, window: Rc<dyn TimeRange>, easing: EasingKind) -> Rc<Self> {
        let timeline = Timeline::new(metadata.default_value, easing, metadata.limits.clone());
        let property = Rc::new(Self {
            id: PropertyId::new(),
            metadata,
            timeline: RefCell::new(timeline),
            window: RefCell::new(window),
            events: PropertyEvents::default(),
        });

        let owner: OwnerHandle = Rc::downgrade(&property) as OwnerHandle;
        property.timeline.borrow_mut().attach(owner);
        property
    }

    /// Get the property ID
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get the metadata
    pub fn metadata(&self) -> &PropertyMetadata<V> {
        &self.metadata
    }

    /// Notification channels
    pub fn events(&self) -> &PropertyEvents<V> {
        &self.events
    }

    /// Borrow the timeline for reading
    pub fn timeline(&self) -> Ref<'_, Timeline<V>> {
        self.timeline.borrow()
    }

    pub(crate) fn timeline_mut(&self) -> RefMut<'_, Timeline<V>> {
        self.timeline.borrow_mut()
    }

    /// Current placement of the owning segment
    pub fn window(&self) -> SegmentWindow {
        self.window.borrow().segment_window()
    }

    /// Current segment length
    pub fn length(&self) -> Frame {
        self.window().length
    }

    /// Attach the property to a different segment
    pub fn set_window(&self, window: Rc<dyn TimeRange>) {
        *self.window.borrow_mut() = window;
    }

    /// Sample at an absolute frame of the parent timeline
    pub fn value_at(&self, absolute: Frame) -> V {
        let window = self.window();
        self.local_value_at(window.to_local(absolute))
    }

    /// Sample at a segment-local frame
    pub fn local_value_at(&self, local: Frame) -> V {
        let length = self.length();
        self.timeline.borrow().value_at(local, length)
    }

    /// Display name of the current easing
    pub fn easing_name(&self) -> String {
        self.timeline.borrow().easing().name().to_string()
    }

    /// Copy the keyframes, values and easing for persistence.
    ///
    /// Fails when the easing is a strategy the registry does not know, since
    /// it could not be resolved again.
    pub fn snapshot(&self) -> Result<TimelineSnapshot<V>> {
        let timeline = self.timeline.borrow();
        if !timeline.easing().is_persistable() {
            return Err(SequencerError::UnpersistableEasing(self.metadata.name.clone()));
        }
        Ok(timeline.snapshot())
    }

    /// Replace the timeline with persisted data, using the process-wide registry
    pub fn restore(&self, snapshot: TimelineSnapshot<V>) -> Result<()> {
        let easing = {
            let registry = keyline_easing::global().read();
            EasingKind::restore(&registry, &snapshot.easing, snapshot.parameters.as_deref())?
        };
        self.install(snapshot, easing)
    }

    /// Replace the timeline with persisted data.
    ///
    /// Nothing changes unless the data is valid for the current window and its
    /// easing resolves in `registry`. The offset is kept. This edit bypasses the
    /// command layer; observers get a [`TimelineReset`] followed by an
    /// [`EasingChanged`].
    pub fn restore_with(&self, snapshot: TimelineSnapshot<V>, registry: &EasingRegistry) -> Result<()> {
        let easing = EasingKind::restore(registry, &snapshot.easing, snapshot.parameters.as_deref())?;
        self.install(snapshot, easing)
    }

    fn install(&self, snapshot: TimelineSnapshot<V>, easing: EasingKind) -> Result<()> {
        let length = self.length();
        if let Some(&frame) = snapshot.times.iter().find(|&&t| t >= length) {
            return Err(SequencerError::OutOfRange { frame, length });
        }
        let mut restored =
            Timeline::from_parts(snapshot.times, snapshot.values, easing, self.metadata.limits.clone())?;

        let (keyframes, name) = {
            let mut timeline = self.timeline.borrow_mut();
            restored.set_offset(timeline.offset());
            timeline.detach();
            restored.attach(timeline.owner().clone());
            *timeline = restored;
            (timeline.keyframe_count(), timeline.easing().name().to_string())
        };

        tracing::debug!(property = %self.metadata.name, keyframes, easing = %name, "restored timeline");
        self.events.reset.publish(&TimelineReset { keyframes });
        self.events.easing_changed.publish(&EasingChanged { name });
        Ok(())
    }

    /// Command replacing the value at `index` in the timeline's values
    pub fn change_value(self: &Rc<Self>, index: usize, value: V) -> Result<ChangeValue<V>> {
        ChangeValue::new(self, index, value)
    }

    /// Command switching to the registry easing called `name`
    pub fn change_easing(self: &Rc<Self>, name: &str) -> Result<ChangeEasing<V>> {
        let easing = {
            let registry = keyline_easing::global().read();
            EasingKind::resolve(&registry, Some(name))?
        };
        Ok(ChangeEasing::new(self, easing))
    }

    /// Command switching to the easing called `name` in `registry`
    pub fn change_easing_with(self: &Rc<Self>, name: &str, registry: &EasingRegistry) -> Result<ChangeEasing<V>> {
        let easing = EasingKind::resolve(registry, Some(name))?;
        Ok(ChangeEasing::new(self, easing))
    }

    /// Command switching to an existing strategy instance
    pub fn change_strategy(self: &Rc<Self>, strategy: Box<dyn EasingFunction>) -> ChangeEasing<V> {
        let easing = {
            let registry = keyline_easing::global().read();
            EasingKind::from_strategy(&registry, strategy)
        };
        ChangeEasing::new(self, easing)
    }

    /// Command adding a keyframe at a local frame, holding the value sampled there
    pub fn add_keyframe(self: &Rc<Self>, frame: Frame) -> Result<AddKeyframe<V>> {
        let value = self.local_value_at(frame);
        AddKeyframe::new(self, frame, value)
    }

    /// Command adding a keyframe at a local frame with an explicit value
    pub fn insert_keyframe(self: &Rc<Self>, frame: Frame, value: V) -> Result<AddKeyframe<V>> {
        AddKeyframe::new(self, frame, value)
    }

    /// Command removing the keyframe at a local frame
    pub fn remove_keyframe(self: &Rc<Self>, frame: Frame) -> Result<RemoveKeyframe<V>> {
        RemoveKeyframe::new(self, frame)
    }

    /// Command moving keyframe `from_index` to a local frame
    pub fn move_keyframe(self: &Rc<Self>, from_index: usize, to_frame: Frame) -> Result<MoveKeyframe<V>> {
        MoveKeyframe::new(self, from_index, to_frame)
    }
}

impl KeyframeProperty<f32> {
    /// Additive bias, used when the limits enable it
    pub fn offset(&self) -> f32 {
        self.timeline.borrow().offset()
    }

    /// Set the additive bias
    pub fn set_offset(&self, offset: f32) {
        self.timeline.borrow_mut().set_offset(offset);
    }
}

impl<V: Channels> EasingOwner for KeyframeProperty<V> {
    fn owner_name(&self) -> String {
        self.metadata.name.clone()
    }

    fn segment_length(&self) -> Frame {
        self.length()
    }
}

impl<V: Channels> fmt::Debug for KeyframeProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeline = self.timeline.borrow();
        f.debug_struct("KeyframeProperty")
            .field("id", &self.id)
            .field("name", &self.metadata.name)
            .field("keyframes", &timeline.keyframe_count())
            .field("easing", &timeline.easing().name())
            .finish_non_exhaustive()
    }
}
