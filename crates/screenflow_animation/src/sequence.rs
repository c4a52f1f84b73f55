// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored animation sequences.
//!
//! A [`Sequence`] is an ordered list of [`TransitionStep`]s, each moving the
//! target towards a scale and color over a duration. Sequences are immutable
//! once authored and shared between players through `Arc`.

use crate::easing::Ease;
use crate::value::{Color, ColorChannels, Scale, UNIT_SCALE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub Uuid);

impl SequenceId {
    /// Create a new random sequence ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Name selecting one of a player's sequences (e.g. "open", "close")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(pub String);

impl AnimationId {
    /// Create an identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnimationId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// State a step moves towards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetState {
    /// Target scale
    pub scale: Scale,
    /// Target color
    pub color: Color,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            scale: UNIT_SCALE,
            color: Color::WHITE,
        }
    }
}

/// One timed step of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionStep {
    /// Values reached at the end of the step
    pub state: TargetState,
    /// Easing curve
    pub ease: Ease,
    /// Duration in seconds
    pub duration: f32,
    /// Delay before the step starts, in seconds
    pub delay: f32,
}

impl TransitionStep {
    /// Create a one second linear step towards `state`
    pub fn new(state: TargetState) -> Self {
        Self {
            state,
            ease: Ease::Linear,
            duration: 1.0,
            delay: 0.0,
        }
    }

    /// Step towards a scale, keeping the default color
    pub fn to_scale(scale: Scale) -> Self {
        Self::new(TargetState {
            scale,
            ..TargetState::default()
        })
    }

    /// Step towards a color, keeping the default scale
    pub fn to_color(color: Color) -> Self {
        Self::new(TargetState {
            color,
            ..TargetState::default()
        })
    }

    /// Set the easing curve
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set the duration (negative values clamp to zero)
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Set the delay (negative values clamp to zero)
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }
}

impl Default for TransitionStep {
    fn default() -> Self {
        Self::new(TargetState::default())
    }
}

/// What happens after the last step of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoopMode {
    /// Play once
    #[default]
    None,
    /// Alternate forward and backward passes
    PingPong,
    /// Restart from the first step
    LoopBack,
}

/// An ordered, loopable, chainable list of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequence {
    /// Unique sequence ID
    #[serde(skip)]
    pub id: SequenceId,
    /// Sequence name (used by chain references)
    pub name: String,
    /// Interpolate between steps; when off, each step snaps then waits
    pub fade: bool,
    /// Start each step from the previous step's target instead of the live values
    pub use_previous_state_as_base: bool,
    /// Loop behaviour
    pub loop_mode: LoopMode,
    /// Stop looping after this many passes
    pub max_repetitions: Option<u32>,
    /// Color channels written by the sequence
    pub color_channels: ColorChannels,
    /// Whether the scale is written
    pub animate_scale: bool,
    /// Steps in play order
    pub steps: Vec<TransitionStep>,
    /// Name of the sequence played when this one ends
    pub chain: Option<String>,
    /// Resolved chain target
    #[serde(skip)]
    chained: Option<Arc<Sequence>>,
}

impl Sequence {
    /// Create an empty fading sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SequenceId::new(),
            name: name.into(),
            fade: true,
            use_previous_state_as_base: false,
            loop_mode: LoopMode::None,
            max_repetitions: None,
            color_channels: ColorChannels::ALL,
            animate_scale: true,
            steps: Vec::new(),
            chain: None,
            chained: None,
        }
    }

    /// Append a step
    pub fn with_step(mut self, step: TransitionStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the loop mode
    pub fn with_loop(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    /// Limit the number of passes
    pub fn with_max_repetitions(mut self, repetitions: u32) -> Self {
        self.max_repetitions = Some(repetitions.max(1));
        self
    }

    /// Enable or disable interpolation
    pub fn with_fade(mut self, fade: bool) -> Self {
        self.fade = fade;
        self
    }

    /// Start steps from the previous step's target values
    pub fn with_previous_state_as_base(mut self, enabled: bool) -> Self {
        self.use_previous_state_as_base = enabled;
        self
    }

    /// Choose the animated color channels
    pub fn with_color_channels(mut self, channels: ColorChannels) -> Self {
        self.color_channels = channels;
        self
    }

    /// Enable or disable scale animation
    pub fn with_scale(mut self, animate: bool) -> Self {
        self.animate_scale = animate;
        self
    }

    /// Chain another sequence after this one.
    ///
    /// Chains hold the next sequence by `Arc`, so a chain built this way can
    /// never loop back to itself.
    pub fn chain_to(mut self, next: Arc<Sequence>) -> Self {
        self.chain = Some(next.name.clone());
        self.chained = Some(next);
        self
    }

    /// Sequence played when this one ends
    pub fn chained(&self) -> Option<&Arc<Sequence>> {
        self.chained.as_ref()
    }

    /// Get step count
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether there is anything to play
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total time of one forward pass (delays included)
    pub fn pass_duration(&self) -> f32 {
        self.steps.iter().map(|s| s.delay + s.duration).sum()
    }

    /// Wrap in an `Arc` for sharing between players
    pub fn shared(self) -> Arc<Sequence> {
        Arc::new(self)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence")
    }
}
