// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen models for primary screens and section overlays.

use crate::host::{InputHost, ScreenView};
use screenflow_animation::GroupPlayer;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(pub Uuid);

impl ScreenId {
    /// Create a new random screen ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a focusable widget owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocusTarget(pub u64);

/// Token returned by [`Screen::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What the back/cancel input does while a screen is the most recent one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExitAction {
    /// Skip this screen and look further down the history
    Ignore,
    /// Close the screen (transition back for primary screens)
    #[default]
    CloseScreen,
    /// Activate the configured widget
    ExecuteButtonClick,
    /// Consume the input and do nothing
    Nothing,
}

/// Authoring settings shared by every screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Screen name
    pub name: String,
    /// Widget selected when the screen gains focus
    pub default_selection: Option<FocusTarget>,
    /// Fallback when the default selection is missing or inactive
    pub secondary_selection: Option<FocusTarget>,
    /// Restore the last selected widget instead of the default
    pub resume_from_last_selection: bool,
    /// Close the screen at registration
    pub start_closed: bool,
    /// Show the dimming raycast filter behind the screen
    pub has_raycast_filter: bool,
    /// Back/cancel behaviour
    pub exit_action: ExitAction,
    /// Widget activated by [`ExitAction::ExecuteButtonClick`]
    pub execute_target: Option<FocusTarget>,
}

impl ScreenConfig {
    /// Create a config with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the default selection
    pub fn with_default_selection(mut self, target: FocusTarget) -> Self {
        self.default_selection = Some(target);
        self
    }

    /// Set the secondary selection
    pub fn with_secondary_selection(mut self, target: FocusTarget) -> Self {
        self.secondary_selection = Some(target);
        self
    }

    /// Enable or disable resuming from the last selection
    pub fn with_resume_from_last_selection(mut self, resume: bool) -> Self {
        self.resume_from_last_selection = resume;
        self
    }

    /// Open or close the screen at registration
    pub fn with_start_closed(mut self, closed: bool) -> Self {
        self.start_closed = closed;
        self
    }

    /// Show the raycast filter behind the screen
    pub fn with_raycast_filter(mut self, enabled: bool) -> Self {
        self.has_raycast_filter = enabled;
        self
    }

    /// Set the back/cancel behaviour
    pub fn with_exit_action(mut self, action: ExitAction) -> Self {
        self.exit_action = action;
        self
    }

    /// Set the widget activated on back/cancel
    pub fn with_execute_target(mut self, target: FocusTarget) -> Self {
        self.execute_target = Some(target);
        self
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Screen".to_string(),
            default_selection: None,
            secondary_selection: None,
            resume_from_last_selection: true,
            start_closed: true,
            has_raycast_filter: false,
            exit_action: ExitAction::CloseScreen,
            execute_target: None,
        }
    }
}

/// Section-only settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Close without animation when the parent screen closes
    pub auto_close_on_parent_close: bool,
    /// Move under the current primary screen every time the section opens
    pub dynamic_parent: bool,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            auto_close_on_parent_close: true,
            dynamic_parent: false,
        }
    }
}

/// Primary or section
#[derive(Debug)]
pub enum ScreenKind {
    /// Full view tracked on the primary stack
    Primary,
    /// Overlay scoped to a primary screen
    Section {
        /// Parent primary screen
        parent: ScreenId,
        /// Section settings
        config: SectionConfig,
        /// Players animating the open/close of the panel
        group: Option<GroupPlayer>,
    },
}

type StateObserver = Box<dyn FnMut(bool)>;

/// A registered screen: state, selection memory and view
pub struct Screen {
    /// Unique screen ID
    pub id: ScreenId,
    /// Authoring settings
    pub config: ScreenConfig,
    kind: ScreenKind,
    is_open: bool,
    last_selection: Option<FocusTarget>,
    view: Box<dyn ScreenView>,
    observers: Vec<(SubscriptionId, StateObserver)>,
    next_subscription: u64,
}

impl Screen {
    fn with_kind(config: ScreenConfig, kind: ScreenKind, view: impl ScreenView + 'static) -> Self {
        Self {
            id: ScreenId::new(),
            config,
            kind,
            is_open: false,
            last_selection: None,
            view: Box::new(view),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a primary screen
    pub fn primary(config: ScreenConfig, view: impl ScreenView + 'static) -> Self {
        Self::with_kind(config, ScreenKind::Primary, view)
    }

    /// Create a section screen under `parent`
    pub fn section(
        config: ScreenConfig,
        section: SectionConfig,
        parent: ScreenId,
        view: impl ScreenView + 'static,
    ) -> Self {
        let kind = ScreenKind::Section {
            parent,
            config: section,
            group: None,
        };
        Self::with_kind(config, kind, view)
    }

    /// Attach the group animating this section's open and close
    pub fn with_group(mut self, player: GroupPlayer) -> Self {
        match &mut self.kind {
            ScreenKind::Section { group, .. } => *group = Some(player),
            ScreenKind::Primary => {
                tracing::warn!("Primary screen '{}' cannot own a panel animation", self.config.name);
            }
        }
        self
    }

    /// Screen name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Primary or section
    pub fn kind(&self) -> &ScreenKind {
        &self.kind
    }

    /// Whether this is a primary screen
    pub fn is_primary(&self) -> bool {
        matches!(self.kind, ScreenKind::Primary)
    }

    /// Parent primary screen of a section
    pub fn parent(&self) -> Option<ScreenId> {
        match self.kind {
            ScreenKind::Section { parent, .. } => Some(parent),
            ScreenKind::Primary => None,
        }
    }

    /// Section settings
    pub fn section_config(&self) -> Option<SectionConfig> {
        match self.kind {
            ScreenKind::Section { config, .. } => Some(config),
            ScreenKind::Primary => None,
        }
    }

    pub(crate) fn set_parent(&mut self, new_parent: ScreenId) {
        if let ScreenKind::Section { parent, .. } = &mut self.kind {
            *parent = new_parent;
            self.view.attach_to(new_parent);
        }
    }

    /// Panel animation group of a section
    pub fn group(&self) -> Option<&GroupPlayer> {
        match &self.kind {
            ScreenKind::Section { group, .. } => group.as_ref(),
            ScreenKind::Primary => None,
        }
    }

    /// Mutable panel animation group of a section
    pub fn group_mut(&mut self) -> Option<&mut GroupPlayer> {
        match &mut self.kind {
            ScreenKind::Section { group, .. } => group.as_mut(),
            ScreenKind::Primary => None,
        }
    }

    /// Whether the screen is open
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Last widget selected while the screen had focus
    pub fn last_selection(&self) -> Option<FocusTarget> {
        self.last_selection
    }

    /// Remember the host's current selection if it belongs to this screen.
    ///
    /// Screens without a default or secondary selection are visual only and
    /// keep no selection memory.
    pub fn update_last_selection(&mut self, input: &dyn InputHost) {
        if self.config.default_selection.is_none() && self.config.secondary_selection.is_none() {
            return;
        }
        if let Some(current) = input.current_selection() {
            if input.owner_screen(current) == Some(self.id) {
                self.last_selection = Some(current);
            }
        }
    }

    /// Widget to focus when the screen regains focus
    pub fn preferred_selection(&self, input: &dyn InputHost) -> Option<FocusTarget> {
        let usable = |target: &FocusTarget| input.is_active(*target);
        self.last_selection
            .filter(|_| self.config.resume_from_last_selection)
            .filter(usable)
            .or_else(|| self.config.default_selection.filter(usable))
            .or_else(|| self.config.secondary_selection.filter(usable))
    }

    /// Enable or disable interaction and raycasting together
    pub fn set_interactability(&mut self, enabled: bool) {
        self.view.set_interactable(enabled);
        self.view.set_raycast_target(enabled);
    }

    pub(crate) fn view_mut(&mut self) -> &mut dyn ScreenView {
        self.view.as_mut()
    }

    /// Open or close the view and notify observers
    pub(crate) fn change_state(&mut self, open: bool) {
        self.is_open = open;
        self.view.set_visible(open);
        self.view.set_alpha(if open { 1.0 } else { 0.0 });
        self.set_interactability(open);
        for (_, observer) in &mut self.observers {
            observer(open);
        }
    }

    /// Observe open/close changes
    pub fn subscribe(&mut self, observer: impl FnMut(bool) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Stop observing; returns whether the subscription existed
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("kind", &self.kind)
            .field("is_open", &self.is_open)
            .finish_non_exhaustive()
    }
}
