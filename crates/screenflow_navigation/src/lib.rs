// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen navigation for Screen Flow.
//!
//! This crate tracks and drives the screens of an interactive application:
//! - Primary screens on a LIFO stack with animated transitions
//! - Section screens (panels) with open/close animations
//! - Back/cancel and outside-touch handling
//! - Focus restoration and the dimming raycast filter
//!
//! ## Architecture
//!
//! The [`NavigationController`] owns every registered [`Screen`] and is
//! advanced by the host once per frame. Rendering, focus and pointer queries
//! are delegated to the host through the traits in [`host`].

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod screen;
pub mod transition;

pub use config::{ScreenFlowConfig, CONFIG_FORMAT_VERSION};
pub use controller::{NavigationController, PrimaryTransition, RAYCAST_FILTER_COLOR};
pub use error::{NavigationError, Result};
pub use host::{HitResult, InputHost, OverlayPlacement, OverlayView, ScreenView};
pub use screen::{
    ExitAction, FocusTarget, Screen, ScreenConfig, ScreenId, ScreenKind, SectionConfig, SubscriptionId,
};
pub use transition::{ScreenTransition, TransitionProgress, TransitionRun};
