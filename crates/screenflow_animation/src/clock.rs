// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame timing shared by every tick-driven task.

use serde::{Deserialize, Serialize};

/// Elapsed time for one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Delta affected by the host's time scale (seconds)
    pub scaled: f32,
    /// Real delta, ignoring time scale (seconds)
    pub unscaled: f32,
}

impl FrameTime {
    /// Create a frame time from both deltas
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self { scaled, unscaled }
    }

    /// Frame time with a time scale of 1
    pub fn uniform(delta: f32) -> Self {
        Self::new(delta, delta)
    }

    /// Delta for the given time mode
    pub fn delta(&self, mode: TimeMode) -> f32 {
        match mode {
            TimeMode::Scaled => self.scaled,
            TimeMode::Unscaled => self.unscaled,
        }
    }
}

/// Which clock a task reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeMode {
    /// Follow the host's time scale
    #[default]
    Scaled,
    /// Real time (keeps running while the game is paused)
    Unscaled,
}

/// Result of advancing a task by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task yielded and wants another tick
    Running,
    /// The task has nothing left to do
    Completed,
}

impl TaskStatus {
    /// Check if the task is finished
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}
