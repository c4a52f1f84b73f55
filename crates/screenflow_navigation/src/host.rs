// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interfaces the host application implements for the navigation controller.
//!
//! The controller never draws, lays out or raycasts anything itself. Screens
//! are shown through a [`ScreenView`], the transition and raycast-filter
//! overlays through an [`OverlayView`], and focus and pointer queries go
//! through an [`InputHost`].

use crate::screen::{FocusTarget, ScreenId};
use screenflow_animation::Color;
use std::cell::RefCell;
use std::rc::Rc;

/// Rendering side of one screen
pub trait ScreenView {
    /// Enable or disable drawing of the screen
    fn set_visible(&mut self, visible: bool);

    /// Allow or block interaction with the screen's widgets
    fn set_interactable(&mut self, interactable: bool);

    /// Set the screen's group alpha
    fn set_alpha(&mut self, alpha: f32);

    /// Include or exclude the screen from pointer raycasts
    fn set_raycast_target(&mut self, _enabled: bool) {}

    /// Move the screen under another screen in the hierarchy
    fn attach_to(&mut self, _parent: ScreenId) {}
}

/// Where an overlay sits relative to the screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPlacement {
    /// Directly behind a section, inside the section's parent
    BehindSection {
        /// Section drawn in front of the overlay
        section: ScreenId,
        /// Parent primary screen of the section
        parent: ScreenId,
    },
    /// First child of a primary screen, covering it
    UnderPrimary {
        /// Primary screen holding the overlay
        primary: ScreenId,
    },
}

/// A full-screen image used for fades and input blocking
pub trait OverlayView {
    /// Show or hide the overlay
    fn set_enabled(&mut self, enabled: bool);

    /// Set the overlay color
    fn set_color(&mut self, color: Color);

    /// Whether the overlay swallows pointer input
    fn set_blocks_input(&mut self, blocks: bool);

    /// Re-parent the overlay
    fn place(&mut self, _placement: OverlayPlacement) {}
}

/// One hit from a pointer raycast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    /// Widget that was hit
    pub target: FocusTarget,
    /// Nearest section screen containing the widget
    pub section: Option<ScreenId>,
    /// Whether the hit is usable
    pub valid: bool,
}

/// Focus, activation and pointer queries
pub trait InputHost {
    /// Currently selected widget
    fn current_selection(&self) -> Option<FocusTarget>;

    /// Select a widget
    fn select(&mut self, target: FocusTarget);

    /// Whether a widget exists and is active in the hierarchy
    fn is_active(&self, target: FocusTarget) -> bool;

    /// Nearest screen containing a widget
    fn owner_screen(&self, target: FocusTarget) -> Option<ScreenId>;

    /// Send a full pointer down, click and up sequence to a widget
    fn simulate_activation(&mut self, target: FocusTarget);

    /// Raycast all widgets under a screen position
    fn hit_test(&self, position: [f32; 2]) -> Vec<HitResult>;
}

impl<T: ScreenView + ?Sized> ScreenView for Rc<RefCell<T>> {
    fn set_visible(&mut self, visible: bool) {
        self.borrow_mut().set_visible(visible);
    }

    fn set_interactable(&mut self, interactable: bool) {
        self.borrow_mut().set_interactable(interactable);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.borrow_mut().set_alpha(alpha);
    }

    fn set_raycast_target(&mut self, enabled: bool) {
        self.borrow_mut().set_raycast_target(enabled);
    }

    fn attach_to(&mut self, parent: ScreenId) {
        self.borrow_mut().attach_to(parent);
    }
}

impl<T: OverlayView + ?Sized> OverlayView for Rc<RefCell<T>> {
    fn set_enabled(&mut self, enabled: bool) {
        self.borrow_mut().set_enabled(enabled);
    }

    fn set_color(&mut self, color: Color) {
        self.borrow_mut().set_color(color);
    }

    fn set_blocks_input(&mut self, blocks: bool) {
        self.borrow_mut().set_blocks_input(blocks);
    }

    fn place(&mut self, placement: OverlayPlacement) {
        self.borrow_mut().place(placement);
    }
}

impl<T: InputHost + ?Sized> InputHost for Rc<RefCell<T>> {
    fn current_selection(&self) -> Option<FocusTarget> {
        self.borrow().current_selection()
    }

    fn select(&mut self, target: FocusTarget) {
        self.borrow_mut().select(target);
    }

    fn is_active(&self, target: FocusTarget) -> bool {
        self.borrow().is_active(target)
    }

    fn owner_screen(&self, target: FocusTarget) -> Option<ScreenId> {
        self.borrow().owner_screen(target)
    }

    fn simulate_activation(&mut self, target: FocusTarget) {
        self.borrow_mut().simulate_activation(target);
    }

    fn hit_test(&self, position: [f32; 2]) -> Vec<HitResult> {
        self.borrow().hit_test(position)
    }
}
