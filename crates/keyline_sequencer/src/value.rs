// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value shapes a timeline can animate.
//!
//! A value is a fixed number of independent `f32` channels. Easing runs once per
//! channel and the result is rebuilt with [`Channels::from_channels`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value made of independent float channels
pub trait Channels: Copy + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Per-property limits applied after interpolation
    type Limits: Clone + Default + fmt::Debug + Serialize + DeserializeOwned;

    /// Number of channels
    const COUNT: usize;

    /// Read channel `index`
    fn channel(&self, index: usize) -> f32;

    /// Build a value from per-channel results
    fn from_channels(f: impl FnMut(usize) -> f32) -> Self;

    /// Bring an edited value within `limits`
    fn constrain(self, _limits: &Self::Limits) -> Self {
        self
    }

    /// Post-process an interpolated value.
    ///
    /// `offset` is the property's additive bias; shapes that have no use for it
    /// ignore it.
    fn finish(self, limits: &Self::Limits, _offset: f32) -> Self {
        self.constrain(limits)
    }
}

/// Clamp range and offset switch for scalar properties
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarLimits {
    /// Lower bound; `None` or NaN leaves the side open
    pub min: Option<f32>,
    /// Upper bound; `None` or NaN leaves the side open
    pub max: Option<f32>,
    /// Whether the property's offset is added to sampled values
    pub use_offset: bool,
}

impl ScalarLimits {
    /// No bounds, offset disabled
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bound both sides
    pub fn range(min: f32, max: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            use_offset: false,
        }
    }

    /// Set the lower bound
    pub fn with_min(mut self, min: f32) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound
    pub fn with_max(mut self, max: f32) -> Self {
        self.max = Some(max);
        self
    }

    /// Enable the additive offset
    pub fn with_offset(mut self) -> Self {
        self.use_offset = true;
        self
    }

    /// Clamp `value` to the bounds, inclusive on both sides
    pub fn clamp(&self, value: f32) -> f32 {
        if let Some(min) = self.min.filter(|m| !m.is_nan()) {
            if value <= min {
                return min;
            }
        }
        if let Some(max) = self.max.filter(|m| !m.is_nan()) {
            if max <= value {
                return max;
            }
        }
        value
    }
}

impl Channels for f32 {
    type Limits = ScalarLimits;

    const COUNT: usize = 1;

    fn channel(&self, _index: usize) -> f32 {
        *self
    }

    fn from_channels(mut f: impl FnMut(usize) -> f32) -> Self {
        f(0)
    }

    fn constrain(self, limits: &ScalarLimits) -> Self {
        limits.clamp(self)
    }

    // Offset first, then clamp.
    fn finish(self, limits: &ScalarLimits, offset: f32) -> Self {
        let biased = if limits.use_offset { self + offset } else { self };
        limits.clamp(biased)
    }
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Opaque black
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Create a color from channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

impl Channels for Color {
    type Limits = ();

    const COUNT: usize = 4;

    fn channel(&self, index: usize) -> f32 {
        match index {
            0 => f32::from(self.r),
            1 => f32::from(self.g),
            2 => f32::from(self.b),
            _ => f32::from(self.a),
        }
    }

    // `as u8` truncates and saturates, so overshooting easings stay in range.
    fn from_channels(mut f: impl FnMut(usize) -> f32) -> Self {
        Self {
            r: f(0) as u8,
            g: f(1) as u8,
            b: f(2) as u8,
            a: f(3) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_clamp_inclusive() {
        let limits = ScalarLimits::range(0.0, 10.0);
        assert_eq!(limits.clamp(-1.0), 0.0);
        assert_eq!(limits.clamp(0.0), 0.0);
        assert_eq!(limits.clamp(4.5), 4.5);
        assert_eq!(limits.clamp(12.0), 10.0);
    }

    #[test]
    fn test_nan_bounds_are_open() {
        let limits = ScalarLimits {
            min: Some(f32::NAN),
            max: None,
            use_offset: false,
        };
        assert_eq!(limits.clamp(-1e9), -1e9);
        assert_eq!(limits.clamp(1e9), 1e9);
    }

    #[test]
    fn test_offset_applied_before_clamp() {
        let limits = ScalarLimits::range(0.0, 10.0).with_offset();
        assert_eq!(9.0f32.finish(&limits, 5.0), 10.0);
        assert_eq!(2.0f32.finish(&limits, 5.0), 7.0);

        let disabled = ScalarLimits::range(0.0, 10.0);
        assert_eq!(2.0f32.finish(&disabled, 5.0), 2.0);
    }

    #[test]
    fn test_color_channels() {
        let color = Color::rgba(10, 20, 30, 40);
        let channels: Vec<f32> = (0..Color::COUNT).map(|i| color.channel(i)).collect();
        assert_eq!(channels, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(Color::from_channels(|i| color.channel(i)), color);
    }

    #[test]
    fn test_color_channels_saturate() {
        let color = Color::from_channels(|i| [300.0, -20.0, 127.9, f32::NAN][i]);
        assert_eq!(color, Color::rgba(255, 0, 127, 0));
    }
}
