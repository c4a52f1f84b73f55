// SPDX-License-Identifier: MIT OR Apache-2.0
//! Primary screen transition animations.
//!
//! A transition closes the previous primary screen and opens the next one,
//! optionally hiding the swap behind the transition overlay. Runs are task
//! state machines: the controller calls [`TransitionRun::start`] once and then
//! [`TransitionRun::advance`] every tick with the unscaled delta, acting on the
//! returned [`TransitionProgress`] cues.

use crate::host::OverlayView;
use screenflow_animation::{lerp01, Color, ColorChannels, Ease, Interpolation, TaskStatus};
use serde::{Deserialize, Serialize};

/// How the swap between two primary screens is presented
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ScreenTransition {
    /// Close then open in the same tick
    #[default]
    None,
    /// Fade to black, swap, hold, fade back in
    BlinkFade {
        /// Fade-out duration in seconds
        #[serde(default = "default_fade_out_time")]
        fade_out_time: f32,
        /// Fade-out easing
        #[serde(default)]
        fade_out_ease: Ease,
        /// Time spent on black before opening the next screen
        #[serde(default = "default_wait_before_fade_in")]
        wait_before_fade_in: f32,
        /// Fade-in duration in seconds
        #[serde(default = "default_fade_in_time")]
        fade_in_time: f32,
        /// Fade-in easing
        #[serde(default)]
        fade_in_ease: Ease,
    },
}

fn default_fade_out_time() -> f32 {
    0.05
}

fn default_wait_before_fade_in() -> f32 {
    0.15
}

fn default_fade_in_time() -> f32 {
    0.2
}

impl ScreenTransition {
    /// Blink fade with the default timings
    pub fn blink_fade() -> Self {
        Self::BlinkFade {
            fade_out_time: default_fade_out_time(),
            fade_out_ease: Ease::Linear,
            wait_before_fade_in: default_wait_before_fade_in(),
            fade_in_time: default_fade_in_time(),
            fade_in_ease: Ease::Linear,
        }
    }
}

/// Cues produced by one step of a transition run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionProgress {
    /// Close the previous screen now
    pub close_previous: bool,
    /// Open the next screen now (after any close)
    pub open_next: bool,
    /// Whether the run has finished
    pub status: TaskStatus,
}

impl TransitionProgress {
    fn running() -> Self {
        Self {
            close_previous: false,
            open_next: false,
            status: TaskStatus::Running,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Start,
    FadeOut { elapsed: f32 },
    Hold { elapsed: f32 },
    FadeIn { elapsed: f32 },
    Done,
}

/// An in-flight transition animation
#[derive(Debug, Clone)]
pub struct TransitionRun {
    transition: ScreenTransition,
    phase: Phase,
}

fn fade(overlay: &mut dyn OverlayView, from: Color, to: Color, progress: f32, ease: Ease) {
    // Overshooting curves still stay between the two colors
    let t = lerp01(progress, ease).clamp(0.0, 1.0);
    overlay.set_color(Interpolation::lerp_color(from, to, t, ColorChannels::ALL));
}

impl TransitionRun {
    /// Prepare a run
    pub fn new(transition: ScreenTransition) -> Self {
        Self {
            transition,
            phase: Phase::Start,
        }
    }

    /// Transition being played
    pub fn transition(&self) -> ScreenTransition {
        self.transition
    }

    /// Run the part of the transition that happens before its first yield
    pub fn start(&mut self, overlay: &mut dyn OverlayView) -> TransitionProgress {
        if self.phase != Phase::Start {
            return TransitionProgress::running();
        }
        match self.transition {
            ScreenTransition::None => {
                self.phase = Phase::Done;
                TransitionProgress {
                    close_previous: true,
                    open_next: true,
                    status: TaskStatus::Completed,
                }
            }
            ScreenTransition::BlinkFade { fade_out_time, .. } => {
                if fade_out_time > 0.0 {
                    self.phase = Phase::FadeOut { elapsed: 0.0 };
                    TransitionProgress::running()
                } else {
                    self.begin_hold(overlay)
                }
            }
        }
    }

    fn begin_hold(&mut self, overlay: &mut dyn OverlayView) -> TransitionProgress {
        overlay.set_color(Color::BLACK);
        self.phase = Phase::Hold { elapsed: 0.0 };
        TransitionProgress {
            close_previous: true,
            ..TransitionProgress::running()
        }
    }

    /// Advance by one tick of unscaled time
    pub fn advance(&mut self, dt: f32, overlay: &mut dyn OverlayView) -> TransitionProgress {
        let ScreenTransition::BlinkFade {
            fade_out_time,
            fade_out_ease,
            wait_before_fade_in,
            fade_in_time,
            fade_in_ease,
        } = self.transition
        else {
            return match self.phase {
                Phase::Start => self.start(overlay),
                _ => TransitionProgress {
                    status: TaskStatus::Completed,
                    ..TransitionProgress::running()
                },
            };
        };

        match self.phase {
            Phase::Start => self.start(overlay),
            Phase::FadeOut { elapsed } => {
                let elapsed = elapsed + dt;
                fade(overlay, Color::CLEAR, Color::BLACK, elapsed / fade_out_time, fade_out_ease);
                if elapsed < fade_out_time {
                    self.phase = Phase::FadeOut { elapsed };
                    TransitionProgress::running()
                } else {
                    self.begin_hold(overlay)
                }
            }
            Phase::Hold { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed < wait_before_fade_in {
                    self.phase = Phase::Hold { elapsed };
                    return TransitionProgress::running();
                }
                let status = if fade_in_time > 0.0 {
                    self.phase = Phase::FadeIn { elapsed: 0.0 };
                    TaskStatus::Running
                } else {
                    overlay.set_color(Color::CLEAR);
                    self.phase = Phase::Done;
                    TaskStatus::Completed
                };
                TransitionProgress {
                    close_previous: false,
                    open_next: true,
                    status,
                }
            }
            Phase::FadeIn { elapsed } => {
                let elapsed = elapsed + dt;
                fade(overlay, Color::BLACK, Color::CLEAR, elapsed / fade_in_time, fade_in_ease);
                if elapsed < fade_in_time {
                    self.phase = Phase::FadeIn { elapsed };
                    TransitionProgress::running()
                } else {
                    overlay.set_color(Color::CLEAR);
                    self.phase = Phase::Done;
                    TransitionProgress {
                        status: TaskStatus::Completed,
                        ..TransitionProgress::running()
                    }
                }
            }
            Phase::Done => TransitionProgress {
                status: TaskStatus::Completed,
                ..TransitionProgress::running()
            },
        }
    }

    /// Whether the run has finished
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}
