// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick-driven sequence player.
//!
//! An [`AnimationPlayer`] owns one [`AnimationTarget`] and walks a
//! [`Sequence`] over it, one scheduler tick per [`AnimationPlayer::advance`]
//! call. Every step occupies at least one tick: the step checks its timeline
//! at the top of each tick, accumulates the frame delta, writes the eased
//! values and yields until the accumulated time passes the duration.
//!
//! Suspension points are stored as [`StepPhase`] values instead of language
//! level yields, so a run can be dropped at any time by [`AnimationPlayer::stop`]
//! without rolling anything back.

use crate::clock::{FrameTime, TaskStatus, TimeMode};
use crate::easing::lerp01;
use crate::sequence::{AnimationId, LoopMode, Sequence, TargetState};
use crate::target::AnimationTarget;
use crate::value::{Color, Interpolation, Scale};
use std::sync::Arc;

/// Floor applied to step durations while fading.
///
/// Keeps `elapsed / duration` finite and lets zero-length steps live for one
/// tick.
pub const MIN_STEP_DURATION: f32 = 0.00001;

/// A sequence registered under an identifier
#[derive(Debug, Clone)]
pub struct NamedSequence {
    /// Identifier used by [`AnimationPlayer::play_with_id`]
    pub id: AnimationId,
    /// Sequence to play
    pub sequence: Arc<Sequence>,
}

impl NamedSequence {
    /// Create a named sequence
    pub fn new(id: impl Into<AnimationId>, sequence: Arc<Sequence>) -> Self {
        Self {
            id: id.into(),
            sequence,
        }
    }
}

/// Values applied by [`AnimationPlayer::on_enable`] before anything plays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    /// Scale to apply, if any
    pub scale: Option<Scale>,
    /// Color to apply, if any
    pub color: Option<Color>,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            scale: Some(crate::value::UNIT_SCALE),
            color: Some(Color::WHITE.with_alpha(0.0)),
        }
    }
}

/// Something that happened during the last [`AnimationPlayer::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A step began (before its delay)
    StepStarted {
        /// Sequence name
        sequence: String,
        /// Step index
        index: usize,
    },
    /// A sequence ended and handed over to its chained sequence
    SequenceChained {
        /// Sequence that ended
        from: String,
        /// Sequence that started
        to: String,
    },
    /// A run ended on its own, without chaining
    SequenceEnded {
        /// Identifier the run was started under, if any
        id: Option<AnimationId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Where a step is suspended
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepPhase {
    /// Not started; the next resume snapshots the base values
    Enter,
    /// Waiting out the step delay
    Delay { remaining: f32 },
    /// Interpolating
    Fade { elapsed: f32 },
    /// Values snapped, waiting out the duration
    Hold { elapsed: f32 },
}

enum RunTick {
    Yield,
    Finished,
}

/// State of one in-flight pass through a sequence
#[derive(Debug, Clone)]
struct SequenceRun {
    sequence: Arc<Sequence>,
    direction: Direction,
    index: usize,
    repetitions: u32,
    phase: StepPhase,
    from_scale: Scale,
    from_color: Color,
}

impl SequenceRun {
    fn new(sequence: Arc<Sequence>) -> Self {
        Self {
            sequence,
            direction: Direction::Forward,
            index: 0,
            repetitions: 0,
            phase: StepPhase::Enter,
            from_scale: crate::value::UNIT_SCALE,
            from_color: Color::WHITE,
        }
    }

    /// Resume the run with this frame's delta until it yields or ends.
    fn tick(
        &mut self,
        dt: f32,
        target: &mut dyn AnimationTarget,
        last_completed: &mut Option<TargetState>,
        events: &mut Vec<PlayerEvent>,
    ) -> RunTick {
        let sequence = Arc::clone(&self.sequence);
        loop {
            let step = &sequence.steps[self.index];
            match self.phase {
                StepPhase::Enter => {
                    events.push(PlayerEvent::StepStarted {
                        sequence: sequence.name.clone(),
                        index: self.index,
                    });
                    self.from_scale = target.scale();
                    self.from_color = target.color();
                    if sequence.use_previous_state_as_base {
                        if let Some(previous) = last_completed {
                            self.from_scale = previous.scale;
                            self.from_color = previous.color;
                        }
                    }
                    if step.delay > 0.0 {
                        self.phase = StepPhase::Delay { remaining: step.delay };
                        return RunTick::Yield;
                    }
                    self.begin_timeline(target);
                }
                StepPhase::Delay { remaining } => {
                    let remaining = remaining - dt;
                    if remaining > 0.0 {
                        self.phase = StepPhase::Delay { remaining };
                        return RunTick::Yield;
                    }
                    self.begin_timeline(target);
                }
                StepPhase::Fade { elapsed } => {
                    let duration = step.duration.max(MIN_STEP_DURATION);
                    if elapsed <= duration {
                        let elapsed = elapsed + dt;
                        let t = lerp01(elapsed / duration, step.ease);
                        self.apply(target, step.state, t);
                        self.phase = StepPhase::Fade { elapsed };
                        return RunTick::Yield;
                    }
                    *last_completed = Some(step.state);
                    if !self.next_step() {
                        return RunTick::Finished;
                    }
                }
                StepPhase::Hold { elapsed } => {
                    if elapsed <= step.duration.max(0.0) {
                        self.phase = StepPhase::Hold { elapsed: elapsed + dt };
                        return RunTick::Yield;
                    }
                    *last_completed = Some(step.state);
                    if !self.next_step() {
                        return RunTick::Finished;
                    }
                }
            }
        }
    }

    fn begin_timeline(&mut self, target: &mut dyn AnimationTarget) {
        if self.sequence.fade {
            self.phase = StepPhase::Fade { elapsed: 0.0 };
        } else {
            let state = self.sequence.steps[self.index].state;
            self.apply(target, state, 1.0);
            self.phase = StepPhase::Hold { elapsed: 0.0 };
        }
    }

    fn apply(&self, target: &mut dyn AnimationTarget, to: TargetState, t: f32) {
        if self.sequence.animate_scale {
            target.set_scale(Interpolation::lerp_scale(self.from_scale, to.scale, t));
        }
        if self.sequence.color_channels.any() {
            target.set_color(Interpolation::lerp_color(
                self.from_color,
                to.color,
                t,
                self.sequence.color_channels,
            ));
        }
    }

    /// Move to the next step, handling pass ends. Returns false when the run
    /// is over.
    fn next_step(&mut self) -> bool {
        let count = self.sequence.steps.len();
        self.phase = StepPhase::Enter;

        match self.direction {
            Direction::Forward if self.index + 1 < count => {
                self.index += 1;
                return true;
            }
            Direction::Backward if self.index > 0 => {
                self.index -= 1;
                return true;
            }
            _ => {}
        }

        // End of a pass
        if self.sequence.loop_mode == LoopMode::PingPong {
            // Skip the boundary step that was just played
            match self.direction {
                Direction::Forward => {
                    self.direction = Direction::Backward;
                    self.index = count.saturating_sub(2);
                }
                Direction::Backward => {
                    self.direction = Direction::Forward;
                    self.index = 1.min(count - 1);
                }
            }
        } else {
            self.index = 0;
        }

        if let Some(max) = self.sequence.max_repetitions {
            self.repetitions += 1;
            if self.repetitions >= max {
                return false;
            }
        }
        self.sequence.loop_mode != LoopMode::None
    }
}

/// Plays sequences on a single target
pub struct AnimationPlayer {
    /// Player name, used in logs
    pub name: String,
    target: Box<dyn AnimationTarget>,
    /// Clock the player reads
    pub time_mode: TimeMode,
    default_sequence: Option<Arc<Sequence>>,
    named: Vec<NamedSequence>,
    initial_state: Option<InitialState>,
    play_on_enable: bool,
    is_playing: bool,
    current_id: Option<AnimationId>,
    last_played_id: Option<AnimationId>,
    last_completed: Option<TargetState>,
    run: Option<SequenceRun>,
    events: Vec<PlayerEvent>,
}

impl AnimationPlayer {
    /// Create a player for `target`
    pub fn new(name: impl Into<String>, target: impl AnimationTarget + 'static) -> Self {
        Self {
            name: name.into(),
            target: Box::new(target),
            time_mode: TimeMode::Scaled,
            default_sequence: None,
            named: Vec::new(),
            initial_state: None,
            play_on_enable: false,
            is_playing: false,
            current_id: None,
            last_played_id: None,
            last_completed: None,
            run: None,
            events: Vec::new(),
        }
    }

    /// Read the real clock instead of the scaled one
    pub fn with_time_mode(mut self, mode: TimeMode) -> Self {
        self.time_mode = mode;
        self
    }

    /// Set the sequence played by [`Self::play_default`]
    pub fn with_default(mut self, sequence: Arc<Sequence>) -> Self {
        self.default_sequence = Some(sequence);
        self
    }

    /// Register a sequence under an identifier
    pub fn with_named(mut self, id: impl Into<AnimationId>, sequence: Arc<Sequence>) -> Self {
        self.add_named(NamedSequence::new(id, sequence));
        self
    }

    /// Values applied on enable
    pub fn with_initial_state(mut self, state: InitialState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Play the default sequence on enable
    pub fn with_play_on_enable(mut self, enabled: bool) -> Self {
        self.play_on_enable = enabled;
        self
    }

    /// Register a sequence under an identifier.
    ///
    /// Duplicate identifiers are kept; the last registration wins on lookup.
    pub fn add_named(&mut self, named: NamedSequence) {
        self.named.push(named);
    }

    /// Apply the initial state and optionally start the default sequence
    pub fn on_enable(&mut self) {
        if let Some(state) = self.initial_state {
            if let Some(color) = state.color {
                self.target.set_color(color);
            }
            if let Some(scale) = state.scale {
                self.target.set_scale(scale);
            }
        }
        if self.play_on_enable {
            self.play_default();
        }
    }

    /// Play the default sequence
    pub fn play_default(&mut self) {
        match self.default_sequence.clone() {
            Some(sequence) => self.play(sequence),
            None => tracing::warn!("There is no default animation assigned to player '{}'", self.name),
        }
    }

    /// Play a registered sequence by identifier.
    ///
    /// The identifier is recorded as last played even when no sequence is
    /// registered under it; a running sequence then keeps its own identifier.
    pub fn play_with_id(&mut self, id: &AnimationId) {
        self.last_played_id = Some(id.clone());
        let found = self
            .named
            .iter()
            .rev()
            .find(|named| &named.id == id)
            .map(|named| Arc::clone(&named.sequence));
        match found {
            Some(sequence) => {
                self.play(sequence);
                if self.is_playing {
                    self.current_id = Some(id.clone());
                }
            }
            None => tracing::debug!("Player '{}' has no animation '{}'", self.name, id),
        }
    }

    /// Cancel any run and start `sequence` from its first step
    pub fn play(&mut self, sequence: Arc<Sequence>) {
        if sequence.is_empty() {
            tracing::warn!("There are no transitions to play in '{}'", sequence.name);
            return;
        }
        if !self.target.is_active() {
            tracing::warn!("The target of player '{}' is inactive, it cannot start '{}'", self.name, sequence.name);
            return;
        }
        self.stop();
        self.start_run(sequence);
    }

    fn start_run(&mut self, sequence: Arc<Sequence>) {
        tracing::debug!("Player '{}' playing '{}'", self.name, sequence.name);
        self.is_playing = true;
        self.last_completed = None;
        self.run = Some(SequenceRun::new(sequence));
    }

    /// Cancel the in-flight run, leaving the target at its last written values
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.run = None;
    }

    /// Advance the current run by one tick
    pub fn advance(&mut self, frame: FrameTime) -> TaskStatus {
        self.events.clear();
        let dt = frame.delta(self.time_mode);
        loop {
            let outcome = match self.run.as_mut() {
                Some(run) => run.tick(dt, self.target.as_mut(), &mut self.last_completed, &mut self.events),
                None => return TaskStatus::Completed,
            };
            match outcome {
                RunTick::Yield => return TaskStatus::Running,
                RunTick::Finished => self.finish_run(),
            }
        }
    }

    fn finish_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        match run.sequence.chained() {
            Some(next) => {
                self.events.push(PlayerEvent::SequenceChained {
                    from: run.sequence.name.clone(),
                    to: next.name.clone(),
                });
                let next = Arc::clone(next);
                self.play(next);
                if self.run.is_none() {
                    self.is_playing = false;
                }
            }
            None => {
                tracing::debug!("Player '{}' finished '{}'", self.name, run.sequence.name);
                self.events.push(PlayerEvent::SequenceEnded {
                    id: self.current_id.clone(),
                });
                self.is_playing = false;
            }
        }
    }

    /// Whether a run is in flight
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether a run started under `id` is in flight
    pub fn is_playing_with_id(&self, id: &AnimationId) -> bool {
        self.is_playing && self.current_id.as_ref() == Some(id)
    }

    /// Identifier the current or last run was started under
    pub fn current_id(&self) -> Option<&AnimationId> {
        self.current_id.as_ref()
    }

    /// Identifier last played through [`Self::play_with_id`]
    pub fn last_played_id(&self) -> Option<&AnimationId> {
        self.last_played_id.as_ref()
    }

    /// Sequence of the in-flight run
    pub fn current_sequence(&self) -> Option<&Arc<Sequence>> {
        self.run.as_ref().map(|run| &run.sequence)
    }

    /// Step index of the in-flight run
    pub fn current_step_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.index)
    }

    /// Completed passes of the in-flight run
    pub fn repetitions(&self) -> Option<u32> {
        self.run.as_ref().map(|run| run.repetitions)
    }

    /// Target state of the last completed step
    pub fn last_completed_state(&self) -> Option<TargetState> {
        self.last_completed
    }

    /// Events produced by the last advance
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Access the animated target
    pub fn target(&self) -> &dyn AnimationTarget {
        self.target.as_ref()
    }

    /// Mutable access to the animated target
    pub fn target_mut(&mut self) -> &mut dyn AnimationTarget {
        self.target.as_mut()
    }
}

impl std::fmt::Debug for AnimationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationPlayer")
            .field("name", &self.name)
            .field("is_playing", &self.is_playing)
            .field("current_id", &self.current_id)
            .field("step", &self.current_step_index())
            .finish_non_exhaustive()
    }
}
