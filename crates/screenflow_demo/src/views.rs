// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless host implementations that log what a renderer would draw.

use screenflow_animation::Color;
use screenflow_navigation::{FocusTarget, HitResult, InputHost, OverlayPlacement, OverlayView, ScreenId, ScreenView};
use std::collections::HashMap;

/// Screen view that only logs visibility and interaction changes
#[derive(Debug)]
pub struct LoggingView {
    name: String,
    visible: bool,
    interactable: bool,
}

impl LoggingView {
    /// Create a view for a named screen
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: false,
            interactable: false,
        }
    }
}

impl ScreenView for LoggingView {
    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::info!("[{}] {}", self.name, if visible { "shown" } else { "hidden" });
        }
        self.visible = visible;
    }

    fn set_interactable(&mut self, interactable: bool) {
        if self.interactable != interactable {
            tracing::debug!("[{}] interactable = {}", self.name, interactable);
        }
        self.interactable = interactable;
    }

    fn set_alpha(&mut self, _alpha: f32) {}

    fn attach_to(&mut self, parent: ScreenId) {
        tracing::info!("[{}] moved under {}", self.name, parent);
    }
}

/// Overlay that logs state changes, skipping per-frame color updates
#[derive(Debug)]
pub struct LoggingOverlay {
    name: &'static str,
    enabled: bool,
    blocks_input: bool,
}

impl LoggingOverlay {
    /// Create an overlay
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            enabled: false,
            blocks_input: false,
        }
    }
}

impl OverlayView for LoggingOverlay {
    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::debug!("[{}] enabled = {}", self.name, enabled);
        }
        self.enabled = enabled;
    }

    fn set_color(&mut self, color: Color) {
        if color == Color::BLACK || color == Color::CLEAR {
            tracing::debug!("[{}] color = {:?}", self.name, color);
        }
    }

    fn set_blocks_input(&mut self, blocks: bool) {
        if self.blocks_input != blocks {
            tracing::debug!("[{}] blocks input = {}", self.name, blocks);
        }
        self.blocks_input = blocks;
    }

    fn place(&mut self, placement: OverlayPlacement) {
        tracing::trace!("[{}] placed {:?}", self.name, placement);
    }
}

/// A rectangular widget known to the scripted input
#[derive(Debug, Clone, Copy)]
pub struct Widget {
    /// Widget handle
    pub target: FocusTarget,
    /// Screen the widget belongs to
    pub screen: ScreenId,
    /// Section the widget belongs to, if any
    pub section: Option<ScreenId>,
    /// `[x, y, width, height]` in screen pixels
    pub rect: [f32; 4],
}

impl Widget {
    fn contains(&self, [x, y]: [f32; 2]) -> bool {
        let [left, top, width, height] = self.rect;
        x >= left && x <= left + width && y >= top && y <= top + height
    }
}

/// Input host backed by a fixed widget layout
#[derive(Debug, Default)]
pub struct ScriptedInput {
    widgets: HashMap<FocusTarget, Widget>,
    selected: Option<FocusTarget>,
    activations: Vec<FocusTarget>,
}

impl ScriptedInput {
    /// Add a widget to the layout
    pub fn add_widget(&mut self, widget: Widget) {
        self.widgets.insert(widget.target, widget);
    }

    /// Widgets activated through back/cancel, in order
    pub fn activations(&self) -> &[FocusTarget] {
        &self.activations
    }

    /// Currently selected widget
    pub fn selected(&self) -> Option<FocusTarget> {
        self.selected
    }
}

impl InputHost for ScriptedInput {
    fn current_selection(&self) -> Option<FocusTarget> {
        self.selected
    }

    fn select(&mut self, target: FocusTarget) {
        tracing::debug!("Selected widget {:?}", target);
        self.selected = Some(target);
    }

    fn is_active(&self, target: FocusTarget) -> bool {
        self.widgets.contains_key(&target)
    }

    fn owner_screen(&self, target: FocusTarget) -> Option<ScreenId> {
        self.widgets.get(&target).map(|widget| widget.screen)
    }

    fn simulate_activation(&mut self, target: FocusTarget) {
        tracing::info!("Activated widget {:?}", target);
        self.activations.push(target);
    }

    fn hit_test(&self, position: [f32; 2]) -> Vec<HitResult> {
        self.widgets
            .values()
            .filter(|widget| widget.contains(position))
            .map(|widget| HitResult {
                target: widget.target,
                section: widget.section,
                valid: true,
            })
            .collect()
    }
}
