// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property animation for screen flows.
//!
//! This crate animates the color and scale of UI targets:
//! - Easing curves
//! - Sequences of timed steps with looping and chaining
//! - Per-target players and fan-out groups
//! - RON sequence libraries
//!
//! ## Architecture
//!
//! Everything runs on a single thread and is driven by the host's frame tick:
//! - Players are explicit task state machines advanced once per tick
//! - Sequences are immutable and shared through `Arc`
//! - Targets are reached through the [`AnimationTarget`] trait

pub mod clock;
pub mod easing;
pub mod error;
pub mod group;
pub mod library;
pub mod player;
pub mod sequence;
pub mod target;
pub mod value;

pub use clock::{FrameTime, TaskStatus, TimeMode};
pub use easing::{lerp, lerp01, Ease};
pub use error::{Result, SequenceError};
pub use group::{GroupPlayer, GroupWait};
pub use library::{SequenceLibrary, SequenceLibraryFile};
pub use player::{AnimationPlayer, InitialState, NamedSequence, PlayerEvent, MIN_STEP_DURATION};
pub use sequence::{AnimationId, LoopMode, Sequence, SequenceId, TargetState, TransitionStep};
pub use target::{AnimationTarget, SimpleTarget};
pub use value::{Color, ColorChannels, Interpolation, Scale, UNIT_SCALE};
