// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing strategies and the tagged selection a timeline holds.

use crate::curve::Curve;
use crate::registry::{EasingDescriptor, EasingRegistry};
use crate::{EasingError, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Weak;

/// Display name reported for [`EasingKind::Linear`]
pub const LINEAR_NAME: &str = "Linear";

/// Display name reported for [`EasingKind::Custom`]
pub const CUSTOM_NAME: &str = "Custom";

/// The property a strategy is attached to
pub trait EasingOwner {
    /// Display name of the owning property
    fn owner_name(&self) -> String;

    /// Length in frames of the segment the owner is sampled over
    fn segment_length(&self) -> i64;
}

/// Non-owning handle a strategy receives when it is attached
pub type OwnerHandle = Weak<dyn EasingOwner>;

struct Detached;

impl EasingOwner for Detached {
    fn owner_name(&self) -> String {
        String::new()
    }

    fn segment_length(&self) -> i64 {
        0
    }
}

/// A handle that never upgrades, for easings with no owner yet
pub fn detached_owner() -> OwnerHandle {
    Weak::<Detached>::new()
}

/// A pluggable interpolation function for one scalar channel.
///
/// Implementations are owned by exactly one timeline at a time. Multi-channel
/// values call [`EasingFunction::ease`] once per channel.
pub trait EasingFunction: Any + fmt::Debug {
    /// Interpolate between `start` and `end` after `elapsed` of `duration` frames.
    ///
    /// `duration` is always positive.
    fn ease(&self, elapsed: i64, duration: i64, start: f32, end: f32) -> f32;

    /// Access the concrete strategy
    fn as_any(&self) -> &dyn Any;

    /// Mutable access to the concrete strategy
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Called when the strategy becomes the active easing of a timeline.
    ///
    /// The owner's timeline is being edited while this runs, so the handle
    /// should be stored rather than sampled.
    fn load(&mut self, _owner: &OwnerHandle) {}

    /// Called when the strategy stops being the active easing of a timeline
    fn unload(&mut self) {}

    /// Parameters persisted next to the easing name
    fn save_parameters(&self) -> Option<String> {
        None
    }

    /// Apply parameters written by [`EasingFunction::save_parameters`]
    fn load_parameters(&mut self, _parameters: &str) -> Result<()> {
        Ok(())
    }

    /// Type identity used for registry lookups
    fn strategy_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// The stock strategy: one of the [`Curve`]s, selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimitiveEasing {
    curve: Curve,
}

impl PrimitiveEasing {
    /// Display name under which the registry knows this strategy
    pub const NAME: &'static str = "Primitive";

    /// Create a strategy using `curve`
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    /// Currently selected curve
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Select a different curve
    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }
}

impl EasingFunction for PrimitiveEasing {
    fn ease(&self, elapsed: i64, duration: i64, start: f32, end: f32) -> f32 {
        self.curve.evaluate(elapsed as f32, duration as f32, start, end)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn save_parameters(&self) -> Option<String> {
        Some(self.curve.name().to_string())
    }

    fn load_parameters(&mut self, parameters: &str) -> Result<()> {
        self.curve = Curve::from_name(parameters)
            .ok_or_else(|| EasingError::InvalidParameters(parameters.to_string()))?;
        Ok(())
    }
}

/// The easing a timeline interpolates with.
///
/// Registry metadata is resolved once, when the value is built, never on reads.
#[derive(Debug, Default)]
pub enum EasingKind {
    /// Built-in straight-line interpolation
    #[default]
    Linear,
    /// A strategy instantiated from, or matched against, a registry entry
    Named {
        /// Registry entry the strategy belongs to
        descriptor: EasingDescriptor,
        /// The owned strategy instance
        strategy: Box<dyn EasingFunction>,
    },
    /// A strategy the registry knows nothing about
    Custom(Box<dyn EasingFunction>),
}

impl EasingKind {
    /// Instantiate the registry entry called `name`
    pub fn from_registry(registry: &EasingRegistry, name: &str) -> Result<Self> {
        let descriptor = registry.find_by_name(name)?;
        Ok(Self::Named {
            strategy: descriptor.create(),
            descriptor: descriptor.clone(),
        })
    }

    /// Wrap an existing strategy, attaching its registry entry if it has one
    pub fn from_strategy(registry: &EasingRegistry, strategy: Box<dyn EasingFunction>) -> Self {
        match registry.find(strategy.strategy_type()) {
            Some(descriptor) => Self::Named {
                descriptor: descriptor.clone(),
                strategy,
            },
            None => Self::Custom(strategy),
        }
    }

    /// Resolve an optional easing name: `None` and `"Linear"` mean [`EasingKind::Linear`]
    pub fn resolve(registry: &EasingRegistry, name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Self::Linear),
            Some(LINEAR_NAME) if registry.find_by_name(LINEAR_NAME).is_err() => Ok(Self::Linear),
            Some(name) => Self::from_registry(registry, name),
        }
    }

    /// Resolve a persisted easing: its name, then its saved parameters
    pub fn restore(registry: &EasingRegistry, name: &str, parameters: Option<&str>) -> Result<Self> {
        let mut easing = Self::resolve(registry, Some(name))?;
        if let (Some(strategy), Some(parameters)) = (easing.strategy_mut(), parameters) {
            strategy.load_parameters(parameters)?;
        }
        Ok(easing)
    }

    /// Whether the selection can be written out and resolved again
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Parameters of the strategy instance, if it saves any
    pub fn parameters(&self) -> Option<String> {
        self.strategy()?.save_parameters()
    }

    /// Display name of the selected easing
    pub fn name(&self) -> &str {
        match self {
            Self::Linear => LINEAR_NAME,
            Self::Named { descriptor, .. } => descriptor.name(),
            Self::Custom(_) => CUSTOM_NAME,
        }
    }

    /// Registry entry, if the easing has one
    pub fn descriptor(&self) -> Option<&EasingDescriptor> {
        match self {
            Self::Named { descriptor, .. } => Some(descriptor),
            Self::Linear | Self::Custom(_) => None,
        }
    }

    /// The strategy instance, if any
    pub fn strategy(&self) -> Option<&dyn EasingFunction> {
        match self {
            Self::Linear => None,
            Self::Named { strategy, .. } | Self::Custom(strategy) => Some(strategy.as_ref()),
        }
    }

    /// Mutable access to the strategy instance
    pub fn strategy_mut(&mut self) -> Option<&mut dyn EasingFunction> {
        match self {
            Self::Linear => None,
            Self::Named { strategy, .. } | Self::Custom(strategy) => Some(strategy.as_mut()),
        }
    }

    /// Downcast the strategy instance
    pub fn downcast_ref<T: EasingFunction>(&self) -> Option<&T> {
        self.strategy()?.as_any().downcast_ref()
    }

    /// Interpolate one channel.
    ///
    /// A non-positive `duration` yields `start`.
    pub fn interpolate(&self, elapsed: i64, duration: i64, start: f32, end: f32) -> f32 {
        if duration <= 0 {
            return start;
        }
        match self {
            Self::Linear => Curve::Linear.evaluate(elapsed as f32, duration as f32, start, end),
            Self::Named { strategy, .. } | Self::Custom(strategy) => {
                strategy.ease(elapsed, duration, start, end)
            }
        }
    }

    /// Forward the load hook to the strategy
    pub fn load(&mut self, owner: &OwnerHandle) {
        if let Some(strategy) = self.strategy_mut() {
            strategy.load(owner);
        }
    }

    /// Forward the unload hook to the strategy
    pub fn unload(&mut self) {
        if let Some(strategy) = self.strategy_mut() {
            strategy.unload();
        }
    }

    /// Whether two selections use the same kind of strategy
    pub fn same_kind(&self, other: &EasingKind) -> bool {
        match (self, other) {
            (Self::Linear, Self::Linear) => true,
            (Self::Named { .. } | Self::Custom(_), Self::Named { .. } | Self::Custom(_)) => {
                self.strategy().map(EasingFunction::strategy_type)
                    == other.strategy().map(EasingFunction::strategy_type)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Halfway;

    impl EasingFunction for Halfway {
        fn ease(&self, _elapsed: i64, _duration: i64, start: f32, end: f32) -> f32 {
            (start + end) / 2.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_linear_interpolates_midpoint() {
        let easing = EasingKind::Linear;
        assert_eq!(easing.interpolate(50, 100, 0.0, 10.0), 5.0);
        assert_eq!(easing.name(), LINEAR_NAME);
        assert!(easing.descriptor().is_none());
    }

    #[test]
    fn test_zero_duration_yields_start() {
        let easing = EasingKind::Linear;
        assert_eq!(easing.interpolate(0, 0, 3.0, 9.0), 3.0);
    }

    #[test]
    fn test_from_registry_attaches_descriptor() {
        let registry = EasingRegistry::with_builtins();
        let easing = EasingKind::from_registry(&registry, PrimitiveEasing::NAME).unwrap();
        assert_eq!(easing.name(), PrimitiveEasing::NAME);
        assert_eq!(
            easing.downcast_ref::<PrimitiveEasing>().map(PrimitiveEasing::curve),
            Some(Curve::Linear)
        );
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = EasingRegistry::with_builtins();
        let err = EasingKind::from_registry(&registry, "Spline").unwrap_err();
        assert!(matches!(err, EasingError::NotFound(name) if name == "Spline"));
    }

    #[test]
    fn test_from_strategy_matches_registered_type() {
        let registry = EasingRegistry::with_builtins();
        let named = EasingKind::from_strategy(&registry, Box::new(PrimitiveEasing::new(Curve::BounceOut)));
        assert_eq!(named.name(), PrimitiveEasing::NAME);

        let custom = EasingKind::from_strategy(&registry, Box::new(Halfway));
        assert_eq!(custom.name(), CUSTOM_NAME);
        assert_eq!(custom.interpolate(1, 10, 2.0, 4.0), 3.0);
        assert!(!custom.same_kind(&named));
    }

    #[test]
    fn test_primitive_parameters_restore_curve() {
        let registry = EasingRegistry::with_builtins();
        let source = EasingKind::from_strategy(&registry, Box::new(PrimitiveEasing::new(Curve::QuadIn)));
        let parameters = source.parameters();
        assert_eq!(parameters.as_deref(), Some("QuadIn"));

        let restored = EasingKind::restore(&registry, source.name(), parameters.as_deref()).unwrap();
        assert_eq!(
            restored.downcast_ref::<PrimitiveEasing>().map(PrimitiveEasing::curve),
            Some(Curve::QuadIn)
        );
        assert_eq!(restored.interpolate(20, 100, 0.0, 100.0), source.interpolate(20, 100, 0.0, 100.0));
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let registry = EasingRegistry::with_builtins();
        let err = EasingKind::restore(&registry, PrimitiveEasing::NAME, Some("Wobble")).unwrap_err();
        assert_eq!(err, EasingError::InvalidParameters("Wobble".to_string()));
    }

    #[test]
    fn test_custom_is_not_persistable() {
        let registry = EasingRegistry::with_builtins();
        assert!(EasingKind::Linear.is_persistable());
        assert!(EasingKind::from_registry(&registry, PrimitiveEasing::NAME).unwrap().is_persistable());
        assert!(!EasingKind::Custom(Box::new(Halfway)).is_persistable());
    }

    #[derive(Debug, Default)]
    struct Remembers {
        owner: Option<OwnerHandle>,
    }

    impl EasingFunction for Remembers {
        fn ease(&self, _elapsed: i64, _duration: i64, start: f32, _end: f32) -> f32 {
            start
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn load(&mut self, owner: &OwnerHandle) {
            self.owner = Some(owner.clone());
        }
    }

    struct Clip;

    impl EasingOwner for Clip {
        fn owner_name(&self) -> String {
            "Clip".to_string()
        }

        fn segment_length(&self) -> i64 {
            120
        }
    }

    #[test]
    fn test_load_hands_owner_to_strategy() {
        let clip = Rc::new(Clip);
        let owner: OwnerHandle = Rc::downgrade(&clip) as OwnerHandle;
        let mut easing = EasingKind::Custom(Box::new(Remembers::default()));
        easing.load(&owner);

        let stored = easing.downcast_ref::<Remembers>().and_then(|r| r.owner.as_ref()?.upgrade());
        assert_eq!(stored.map(|o| (o.owner_name(), o.segment_length())), Some(("Clip".to_string(), 120)));
        assert!(detached_owner().upgrade().is_none());
    }

    #[test]
    fn test_resolve_defaults_to_linear() {
        let registry = EasingRegistry::with_builtins();
        assert!(matches!(EasingKind::resolve(&registry, None), Ok(EasingKind::Linear)));
        assert!(matches!(
            EasingKind::resolve(&registry, Some(LINEAR_NAME)),
            Ok(EasingKind::Linear)
        ));
        assert!(EasingKind::resolve(&registry, Some("Nope")).is_err());
    }
}
