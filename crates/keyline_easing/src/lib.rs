// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing for Keyline keyframe timelines.
//!
//! This crate provides:
//! - The built-in easing [`Curve`]s
//! - The [`EasingFunction`] strategy trait and the stock [`PrimitiveEasing`]
//! - [`EasingKind`], the selection a timeline interpolates with
//! - The process-wide [`EasingRegistry`]
//!
//! ## Architecture
//!
//! Strategies interpolate a single `f32` channel. Multi-channel values call
//! the strategy once per channel. Registry metadata is looked up when an
//! [`EasingKind`] is built, so the timeline never consults the registry while
//! sampling.

pub mod curve;
pub mod registry;
pub mod strategy;

pub use curve::Curve;
pub use registry::{global, EasingDescriptor, EasingFactory, EasingRegistry};
pub use strategy::{
    detached_owner, EasingFunction, EasingKind, EasingOwner, OwnerHandle, PrimitiveEasing, CUSTOM_NAME, LINEAR_NAME,
};

/// Easing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EasingError {
    /// No strategy is registered under this name
    #[error("Easing not found: {0}")]
    NotFound(String),

    /// The name or type is already registered
    #[error("Easing already registered: {0}")]
    AlreadyRegistered(String),

    /// Saved parameters do not fit the strategy
    #[error("Invalid easing parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for easing operations
pub type Result<T> = std::result::Result<T, EasingError>;
