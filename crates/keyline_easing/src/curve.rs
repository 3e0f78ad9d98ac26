// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in easing curves.
//!
//! Every curve maps `(t, total, min, max)` to a value, where `t` is the elapsed
//! time inside a segment of length `total`, `min` is the value at the start of
//! the segment and `max` the value at its end.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// A named easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Holds the start value for the whole segment
    None,
    /// Straight line from start to end
    #[default]
    Linear,
    /// Sine ease in
    SineIn,
    /// Sine ease out
    SineOut,
    /// Sine ease in/out
    SineInOut,
    /// Quadratic ease in
    QuadIn,
    /// Quadratic ease out
    QuadOut,
    /// Quadratic ease in/out
    QuadInOut,
    /// Cubic ease in
    CubicIn,
    /// Cubic ease out
    CubicOut,
    /// Cubic ease in/out
    CubicInOut,
    /// Quartic ease in
    QuartIn,
    /// Quartic ease out
    QuartOut,
    /// Quartic ease in/out
    QuartInOut,
    /// Quintic ease in
    QuintIn,
    /// Quintic ease out
    QuintOut,
    /// Quintic ease in/out
    QuintInOut,
    /// Exponential ease in
    ExpIn,
    /// Exponential ease out
    ExpOut,
    /// Exponential ease in/out
    ExpInOut,
    /// Circular ease in
    CircIn,
    /// Circular ease out
    CircOut,
    /// Circular ease in/out
    CircInOut,
    /// Overshooting ease in
    BackIn,
    /// Overshooting ease out
    BackOut,
    /// Overshooting ease in/out
    BackInOut,
    /// Elastic ease in
    ElasticIn,
    /// Elastic ease out
    ElasticOut,
    /// Elastic ease in/out
    ElasticInOut,
    /// Bouncing ease in
    BounceIn,
    /// Bouncing ease out
    BounceOut,
    /// Bouncing ease in/out
    BounceInOut,
}

impl Curve {
    /// Every curve, in selector order
    #[rustfmt::skip]
    pub const ALL: [Curve; 32] = [
        Curve::None,
        Curve::Linear,
        Curve::SineIn, Curve::SineOut, Curve::SineInOut,
        Curve::QuadIn, Curve::QuadOut, Curve::QuadInOut,
        Curve::CubicIn, Curve::CubicOut, Curve::CubicInOut,
        Curve::QuartIn, Curve::QuartOut, Curve::QuartInOut,
        Curve::QuintIn, Curve::QuintOut, Curve::QuintInOut,
        Curve::ExpIn, Curve::ExpOut, Curve::ExpInOut,
        Curve::CircIn, Curve::CircOut, Curve::CircInOut,
        Curve::BackIn, Curve::BackOut, Curve::BackInOut,
        Curve::ElasticIn, Curve::ElasticOut, Curve::ElasticInOut,
        Curve::BounceIn, Curve::BounceOut, Curve::BounceInOut,
    ];

    /// Display names, index-aligned with [`Curve::ALL`]
    #[rustfmt::skip]
    pub const NAMES: [&'static str; 32] = [
        "None",
        "Linear",
        "SineIn", "SineOut", "SineInOut",
        "QuadIn", "QuadOut", "QuadInOut",
        "CubicIn", "CubicOut", "CubicInOut",
        "QuartIn", "QuartOut", "QuartInOut",
        "QuintIn", "QuintOut", "QuintInOut",
        "ExpIn", "ExpOut", "ExpInOut",
        "CircIn", "CircOut", "CircInOut",
        "BackIn", "BackOut", "BackInOut",
        "ElasticIn", "ElasticOut", "ElasticInOut",
        "BounceIn", "BounceOut", "BounceInOut",
    ];

    /// Position of this curve in [`Curve::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Curve at a selector index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the display name
    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Look up a curve by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(Self::from_index)
    }

    /// Evaluate the curve.
    ///
    /// `total` must be non-zero; callers handle empty segments themselves.
    pub fn evaluate(self, t: f32, total: f32, min: f32, max: f32) -> f32 {
        match self {
            Self::None => min,
            Self::Linear => linear(t, total, min, max),
            Self::SineIn => sine_in(t, total, min, max),
            Self::SineOut => sine_out(t, total, min, max),
            Self::SineInOut => sine_in_out(t, total, min, max),
            Self::QuadIn => power_in(2, t, total, min, max),
            Self::QuadOut => quad_out(t, total, min, max),
            Self::QuadInOut => quad_in_out(t, total, min, max),
            Self::CubicIn => power_in(3, t, total, min, max),
            Self::CubicOut => odd_power_out(3, t, total, min, max),
            Self::CubicInOut => odd_power_in_out(3, t, total, min, max),
            Self::QuartIn => power_in(4, t, total, min, max),
            Self::QuartOut => quart_out(t, total, min, max),
            Self::QuartInOut => quart_in_out(t, total, min, max),
            Self::QuintIn => power_in(5, t, total, min, max),
            Self::QuintOut => odd_power_out(5, t, total, min, max),
            Self::QuintInOut => odd_power_in_out(5, t, total, min, max),
            Self::ExpIn => exp_in(t, total, min, max),
            Self::ExpOut => exp_out(t, total, min, max),
            Self::ExpInOut => exp_in_out(t, total, min, max),
            Self::CircIn => circ_in(t, total, min, max),
            Self::CircOut => circ_out(t, total, min, max),
            Self::CircInOut => circ_in_out(t, total, min, max),
            Self::BackIn => back_in(t, total, min, max),
            Self::BackOut => back_out(t, total, min, max),
            Self::BackInOut => back_in_out(t, total, min, max),
            Self::ElasticIn => elastic_in(t, total, min, max),
            Self::ElasticOut => elastic_out(t, total, min, max),
            Self::ElasticInOut => elastic_in_out(t, total, min, max),
            Self::BounceIn => bounce_in(t, total, min, max),
            Self::BounceOut => bounce_out(t, total, min, max),
            Self::BounceInOut => bounce_in_out(t, total, min, max),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weighted blend, exact at both ends of the segment
fn linear(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let r = t / total;
    min * (1.0 - r) + max * r
}

fn power_in(power: i32, t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    delta * (t / total).powi(power) + min
}

fn quad_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total;
    -delta * t * (t - 2.0) + min
}

fn quad_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return delta / 2.0 * t * t + min;
    }
    t -= 1.0;
    -delta / 2.0 * (t * (t - 2.0) - 1.0) + min
}

fn odd_power_out(power: i32, t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total - 1.0;
    delta * (t.powi(power) + 1.0) + min
}

fn odd_power_in_out(power: i32, t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return delta / 2.0 * t.powi(power) + min;
    }
    t -= 2.0;
    delta / 2.0 * (t.powi(power) + 2.0) + min
}

fn quart_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total - 1.0;
    -delta * (t.powi(4) - 1.0) + min
}

fn quart_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return delta / 2.0 * t.powi(4) + min;
    }
    t -= 2.0;
    -delta / 2.0 * (t.powi(4) - 2.0) + min
}

fn sine_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    -delta * (t * (PI / 2.0) / total).cos() + delta + min
}

fn sine_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    delta * (t * (PI / 2.0) / total).sin() + min
}

fn sine_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    -delta / 2.0 * ((t * PI / total).cos() - 1.0) + min
}

fn exp_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    if t == 0.0 {
        return min;
    }
    let delta = max - min;
    delta * 2f32.powf(10.0 * (t / total - 1.0)) + min
}

fn exp_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    if t == total {
        return max;
    }
    let delta = max - min;
    delta * (1.0 - 2f32.powf(-10.0 * t / total)) + min
}

fn exp_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    if t == 0.0 {
        return min;
    }
    if t == total {
        return max;
    }
    let delta = max - min;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return delta / 2.0 * 2f32.powf(10.0 * (t - 1.0)) + min;
    }
    t -= 1.0;
    delta / 2.0 * (2.0 - 2f32.powf(-10.0 * t)) + min
}

fn circ_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total;
    -delta * ((1.0 - t * t).sqrt() - 1.0) + min
}

fn circ_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total - 1.0;
    delta * (1.0 - t * t).sqrt() + min
}

fn circ_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return -delta / 2.0 * ((1.0 - t * t).sqrt() - 1.0) + min;
    }
    t -= 2.0;
    delta / 2.0 * ((1.0 - t * t).sqrt() + 1.0) + min
}

// The overshoot amount scales with the size of the jump.
fn back_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let s = delta * 0.01;
    let t = t / total;
    delta * t * t * ((s + 1.0) * t - s) + min
}

fn back_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let s = delta * 0.001;
    let t = t / total - 1.0;
    delta * (t * t * ((s + 1.0) * t + s) + 1.0) + min
}

fn back_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let s = delta * 0.01 * 1.525;
    let mut t = t / (total / 2.0);
    if t < 1.0 {
        return delta / 2.0 * (t * t * ((s + 1.0) * t - s)) + min;
    }
    t -= 2.0;
    delta / 2.0 * (t * t * ((s + 1.0) * t + s) + 2.0) + min
}

fn elastic_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total;
    if t == 0.0 {
        return min;
    }
    if t == 1.0 {
        return max;
    }
    let p = total * 0.3;
    let s = p / 4.0;
    let t = t - 1.0;
    -(delta * 2f32.powf(10.0 * t) * ((t * total - s) * (2.0 * PI) / p).sin()) + min
}

fn elastic_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / total;
    if t == 0.0 {
        return min;
    }
    if t == 1.0 {
        return max;
    }
    let p = total * 0.3;
    let s = p / 4.0;
    delta * 2f32.powf(-10.0 * t) * ((t * total - s) * (2.0 * PI) / p).sin() + delta + min
}

fn elastic_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let t = t / (total / 2.0);
    if t == 0.0 {
        return min;
    }
    if t == 2.0 {
        return max;
    }
    let p = total * (0.3 * 1.5);
    let s = p / 4.0;
    let t = t - 1.0;
    let wave = ((t * total - s) * (2.0 * PI) / p).sin();
    if t < 0.0 {
        return -0.5 * (delta * 2f32.powf(10.0 * t) * wave) + min;
    }
    delta * 2f32.powf(-10.0 * t) * wave * 0.5 + delta + min
}

fn bounce_in(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    delta - bounce_out(total - t, total, 0.0, delta) + min
}

fn bounce_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    let mut t = t / total;
    if t < 1.0 / 2.75 {
        delta * (7.5625 * t * t) + min
    } else if t < 2.0 / 2.75 {
        t -= 1.5 / 2.75;
        delta * (7.5625 * t * t + 0.75) + min
    } else if t < 2.5 / 2.75 {
        t -= 2.25 / 2.75;
        delta * (7.5625 * t * t + 0.9375) + min
    } else {
        t -= 2.625 / 2.75;
        delta * (7.5625 * t * t + 0.984375) + min
    }
}

fn bounce_in_out(t: f32, total: f32, min: f32, max: f32) -> f32 {
    let delta = max - min;
    if t < total / 2.0 {
        bounce_in(t * 2.0, total, 0.0, delta) * 0.5 + min
    } else {
        bounce_out(t * 2.0 - total, total, 0.0, delta) * 0.5 + min + delta * 0.5
    }
}
