// SPDX-License-Identifier: MIT OR Apache-2.0
//! The navigation controller.
//!
//! Tracks which screens are open, the primary screen stack and the screen
//! history, runs primary transitions one at a time, animates section panels
//! and routes back/cancel and pointer input.
//!
//! The history is an ordered list rather than a stack: UI events give no
//! guarantee about open/close ordering, so closes remove arbitrary entries.

use crate::config::ScreenFlowConfig;
use crate::error::{NavigationError, Result};
use crate::host::{InputHost, OverlayPlacement, OverlayView};
use crate::screen::{ExitAction, FocusTarget, Screen, ScreenId, SubscriptionId};
use crate::transition::{ScreenTransition, TransitionProgress, TransitionRun};
use indexmap::IndexMap;
use screenflow_animation::{Color, FrameTime, GroupWait, TaskStatus};
use std::collections::VecDeque;

/// Color of the raycast filter while visible
pub const RAYCAST_FILTER_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.85);

/// The pair of primary screens involved in the latest transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryTransition {
    /// Screen being left
    pub previous: ScreenId,
    /// Screen being entered
    pub next: ScreenId,
}

#[derive(Debug)]
struct TransitionTask {
    screens: PrimaryTransition,
    run: TransitionRun,
}

struct CloseSectionTask {
    section: ScreenId,
    wait: GroupWait,
    on_closed: Option<Box<dyn FnOnce()>>,
}

/// Screen navigation state machine
pub struct NavigationController {
    config: ScreenFlowConfig,
    screens: IndexMap<ScreenId, Screen>,
    history: Vec<ScreenId>,
    primary_stack: Vec<ScreenId>,
    raycast_filter_count: usize,
    is_transitioning: bool,
    current_transition: Option<PrimaryTransition>,
    active: Option<TransitionTask>,
    pending: VecDeque<TransitionTask>,
    closing: Vec<CloseSectionTask>,
    transition_overlay: Box<dyn OverlayView>,
    raycast_filter: Box<dyn OverlayView>,
    input: Box<dyn InputHost>,
}

impl NavigationController {
    /// Create a controller over the host's overlays and input
    pub fn new(
        config: ScreenFlowConfig,
        transition_overlay: impl OverlayView + 'static,
        raycast_filter: impl OverlayView + 'static,
        input: impl InputHost + 'static,
    ) -> Self {
        Self {
            config,
            screens: IndexMap::new(),
            history: Vec::new(),
            primary_stack: Vec::new(),
            raycast_filter_count: 0,
            is_transitioning: false,
            current_transition: None,
            active: None,
            pending: VecDeque::new(),
            closing: Vec::new(),
            transition_overlay: Box::new(transition_overlay),
            raycast_filter: Box::new(raycast_filter),
            input: Box::new(input),
        }
    }

    /// Controller settings
    pub fn config(&self) -> &ScreenFlowConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a screen and apply its starting state.
    ///
    /// The starting state does not touch the history. Registering the same
    /// screen ID twice is a no-op.
    pub fn register(&mut self, mut screen: Screen) -> Result<ScreenId> {
        let id = screen.id;
        if self.screens.contains_key(&id) {
            tracing::warn!("Screen '{}' is already registered", screen.name());
            return Ok(id);
        }
        if let Some(parent) = screen.parent() {
            match self.screens.get(&parent) {
                None => {
                    return Err(NavigationError::UnknownParent {
                        section: screen.name().to_string(),
                    })
                }
                Some(parent) if !parent.is_primary() => {
                    return Err(NavigationError::NotAPrimary(parent.name().to_string()));
                }
                Some(_) => {}
            }
        }
        if let Some(group) = screen.group_mut() {
            for player in group.players_mut() {
                player.time_mode = self.config.panel_time_mode;
            }
        }

        let open = !screen.config.start_closed;
        screen.change_state(open);
        tracing::debug!("Registered screen '{}' ({})", screen.name(), if open { "open" } else { "closed" });
        self.screens.insert(id, screen);
        Ok(id)
    }

    /// Remove a screen, forgetting it in the history, the stack and any pending work
    pub fn unregister(&mut self, id: ScreenId) -> Option<Screen> {
        let screen = self.screens.shift_remove(&id)?;
        self.history.retain(|s| *s != id);
        self.primary_stack.retain(|s| *s != id);
        self.closing.retain(|task| task.section != id);
        self.pending
            .retain(|task| task.screens.previous != id && task.screens.next != id);
        tracing::debug!("Unregistered screen '{}'", screen.name());
        Some(screen)
    }

    /// Find a screen by name
    pub fn screen_by_name(&self, name: &str) -> Option<ScreenId> {
        self.screens
            .values()
            .find(|screen| screen.name() == name)
            .map(|screen| screen.id)
    }

    /// Get a screen
    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(&id)
    }

    /// Get a mutable screen
    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.get_mut(&id)
    }

    /// All registered screens in registration order
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.screens.values()
    }

    /// Transition to the configured initial screen, if enabled
    pub fn start(&mut self) -> Result<()> {
        if !self.config.transition_on_start {
            return Ok(());
        }
        let Some(name) = self.config.initial_screen.clone() else {
            tracing::warn!("No initial screen configured");
            return Ok(());
        };
        let id = self
            .screen_by_name(&name)
            .ok_or_else(|| NavigationError::UnknownScreen(name.clone()))?;
        if !self.screens.get(&id).is_some_and(Screen::is_primary) {
            return Err(NavigationError::NotAPrimary(name));
        }
        self.transition_to(id, self.config.initial_transition, false);
        Ok(())
    }

    // ------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------

    /// Whether a screen is open
    pub fn is_open(&self, id: ScreenId) -> bool {
        self.screens.get(&id).is_some_and(Screen::is_open)
    }

    /// Screen history, oldest first
    pub fn history(&self) -> &[ScreenId] {
        &self.history
    }

    /// Primary screen stack, bottom first
    pub fn primary_stack(&self) -> &[ScreenId] {
        &self.primary_stack
    }

    /// Whether a primary transition is animating
    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    /// Number of open screens showing the raycast filter
    pub fn raycast_filter_count(&self) -> usize {
        self.raycast_filter_count
    }

    /// Latest started primary transition
    pub fn current_transition(&self) -> Option<PrimaryTransition> {
        self.current_transition
    }

    /// Primary screen entered by the latest transition
    pub fn current_primary(&self) -> Option<ScreenId> {
        self.current_transition.map(|t| t.next)
    }

    /// Transitions waiting for the active one
    pub fn pending_transitions(&self) -> usize {
        self.pending.len()
    }

    /// Whether a section has an unfinished close
    pub fn is_closing(&self, id: ScreenId) -> bool {
        self.closing.iter().any(|task| task.section == id)
    }

    // ------------------------------------------------------------------
    // Primary transitions
    // ------------------------------------------------------------------

    /// Push a primary screen and transition to it
    pub fn transition_to(&mut self, next: ScreenId, transition: ScreenTransition, override_previous: bool) {
        match self.screens.get(&next) {
            Some(screen) if screen.is_primary() => {}
            Some(screen) => {
                tracing::warn!("Cannot transition to section '{}'", screen.name());
                return;
            }
            None => {
                tracing::warn!("Cannot transition to unregistered screen {}", next);
                return;
            }
        }
        let top = self.primary_stack.last().copied();
        if top == Some(next) {
            tracing::warn!("Trying to transition to the same open screen!");
            return;
        }
        // The first transition has no previous screen
        let previous = top.unwrap_or(next);
        self.primary_stack.push(next);
        self.history.push(next);
        self.begin_transition(PrimaryTransition { previous, next }, transition, override_previous);
    }

    /// Pop the top primary screen and transition back to the one below
    pub fn transition_back(&mut self, transition: ScreenTransition, override_previous: bool) {
        if self.primary_stack.len() <= 1 {
            tracing::warn!("Trying to transition to a previous screen that doesn't exist!");
            return;
        }
        let Some(previous) = self.primary_stack.pop() else {
            return;
        };
        self.remove_from_history(previous);
        let Some(&next) = self.primary_stack.last() else {
            return;
        };
        self.begin_transition(PrimaryTransition { previous, next }, transition, override_previous);
    }

    fn begin_transition(&mut self, screens: PrimaryTransition, transition: ScreenTransition, override_previous: bool) {
        let task = TransitionTask {
            screens,
            run: TransitionRun::new(transition),
        };
        if override_previous {
            let cancelled: Vec<TransitionTask> = self.active.take().into_iter().chain(self.pending.drain(..)).collect();
            if !cancelled.is_empty() {
                tracing::debug!("Overriding {} unfinished transitions", cancelled.len());
                self.transition_overlay.set_color(Color::CLEAR);
            }
            self.transition_overlay.set_blocks_input(false);
            self.is_transitioning = false;
            // Screens a cancelled transition was about to close
            for stale in cancelled.iter().map(|t| t.screens.previous) {
                if stale != screens.next {
                    self.try_close_instant(stale);
                }
            }
            self.try_close_instant(screens.previous);
            self.start_transition(task);
        } else if self.active.is_some() {
            self.pending.push_back(task);
        } else {
            self.start_transition(task);
        }
    }

    fn start_transition(&mut self, mut task: TransitionTask) {
        tracing::debug!(
            "Transition {:?} from {} to {}",
            task.run.transition(),
            self.screen_name(task.screens.previous),
            self.screen_name(task.screens.next)
        );
        self.is_transitioning = true;
        self.transition_overlay.set_blocks_input(true);
        self.current_transition = Some(task.screens);
        let progress = task.run.start(self.transition_overlay.as_mut());
        self.active = Some(task);
        self.apply_transition_progress(progress);
    }

    fn apply_transition_progress(&mut self, progress: TransitionProgress) {
        let Some(screens) = self.active.as_ref().map(|task| task.screens) else {
            return;
        };
        if progress.close_previous {
            self.try_close_instant(screens.previous);
        }
        if progress.open_next {
            self.try_open_instant(screens.next);
        }
        if progress.status.is_completed() {
            self.active = None;
            self.transition_overlay.set_blocks_input(false);
            self.is_transitioning = false;
            tracing::debug!("Transition to {} finished", self.screen_name(screens.next));
            if let Some(next) = self.pending.pop_front() {
                self.start_transition(next);
            }
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance panel animations, pending closes and the active transition
    pub fn tick(&mut self, frame: FrameTime) {
        for screen in self.screens.values_mut() {
            if let Some(group) = screen.group_mut() {
                group.advance(frame);
            }
        }

        self.poll_closing();

        if let Some(task) = self.active.as_mut() {
            let progress = task.run.advance(frame.unscaled, self.transition_overlay.as_mut());
            self.apply_transition_progress(progress);
        }
    }

    fn poll_closing(&mut self) {
        let tasks = std::mem::take(&mut self.closing);
        let mut still_waiting = Vec::new();
        for task in tasks {
            let Some(screen) = self.screens.get(&task.section) else {
                continue;
            };
            let Some(group) = screen.group() else {
                self.finish_close(task.section, task.on_closed);
                continue;
            };
            if task.wait.poll(group) == TaskStatus::Running {
                still_waiting.push(task);
            } else {
                self.finish_close(task.section, task.on_closed);
            }
        }
        // Closes started while finishing others go after the survivors
        still_waiting.append(&mut self.closing);
        self.closing = still_waiting;
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    /// Open a section screen above the current history
    pub fn open_section(&mut self, id: ScreenId, animate: bool) {
        let Some(screen) = self.screens.get(&id) else {
            tracing::warn!("Cannot open unregistered section {}", id);
            return;
        };
        if screen.is_primary() {
            tracing::warn!("'{}' is a primary screen, use transition_to", screen.name());
            return;
        }
        let reopening = screen.is_open() && self.is_closing(id);
        if screen.is_open() && !reopening {
            return;
        }
        let has_filter = screen.config.has_raycast_filter;

        if let Some(&last) = self.history.last() {
            if let Some(last) = self.screens.get_mut(&last) {
                last.update_last_selection(self.input.as_ref());
                if has_filter {
                    // The screen behind must not take input while the section is in front
                    last.view_mut().set_interactable(false);
                }
            }
        }
        self.history.push(id);

        if reopening {
            tracing::debug!("Re-opening section '{}'", self.screen_name(id));
            // The pending close and its callback are withdrawn
            self.closing.retain(|task| task.section != id);
            if let Some(screen) = self.screens.get_mut(&id) {
                screen.set_interactability(true);
            }
            self.select_proper_target();
            self.place_raycast_filter();
        } else {
            self.try_open_instant(id);
        }

        let open_id = self.config.open_panel_id.clone();
        if let Some(group) = self.screens.get_mut(&id).and_then(Screen::group_mut) {
            if animate {
                group.stop();
                group.play_with_id(&open_id);
            }
        }
    }

    /// Close a section screen, optionally animating it first.
    ///
    /// `on_closed` runs once the section is actually closed; it is dropped if
    /// the section is re-opened before the close animation ends.
    pub fn close_section(&mut self, id: ScreenId, animate: bool, on_closed: Option<Box<dyn FnOnce()>>) {
        let Some(screen) = self.screens.get_mut(&id) else {
            tracing::warn!("Cannot close unregistered section {}", id);
            return;
        };
        if screen.is_primary() {
            tracing::warn!("'{}' is a primary screen, use transition_back", screen.name());
            return;
        }
        if !screen.is_open() {
            return;
        }
        // No spam-closing or interaction once closing starts
        screen.set_interactability(false);

        let close_id = self.config.close_panel_id.clone();
        let wait = match screen.group_mut() {
            Some(group) if animate => {
                group.stop();
                Some(group.play_and_wait_all(&close_id))
            }
            _ => None,
        };
        self.remove_from_history(id);

        match wait {
            Some(wait) => self.closing.push(CloseSectionTask {
                section: id,
                wait,
                on_closed,
            }),
            None => self.finish_close(id, on_closed),
        }
    }

    fn finish_close(&mut self, id: ScreenId, on_closed: Option<Box<dyn FnOnce()>>) {
        self.try_close_instant(id);
        if let Some(callback) = on_closed {
            callback();
        }
        self.select_proper_target();
    }

    // ------------------------------------------------------------------
    // Instant open/close
    // ------------------------------------------------------------------

    fn try_open_instant(&mut self, id: ScreenId) {
        let Some(screen) = self.screens.get(&id) else {
            return;
        };
        if screen.is_open() {
            return;
        }
        let has_filter = screen.config.has_raycast_filter;
        self.apply_state(id, true);
        self.select_proper_target();
        if has_filter {
            self.show_raycast_filter();
        }
        self.place_raycast_filter();
    }

    fn try_close_instant(&mut self, id: ScreenId) {
        let input = self.input.as_ref();
        let Some(screen) = self.screens.get_mut(&id) else {
            return;
        };
        if !screen.is_open() {
            return;
        }
        screen.update_last_selection(input);
        let has_filter = screen.config.has_raycast_filter;
        self.apply_state(id, false);
        if has_filter {
            self.hide_raycast_filter();
            // The screen behind gets its interaction back
            if let Some(last) = self.history.last().and_then(|last| self.screens.get_mut(last)) {
                last.view_mut().set_interactable(true);
            }
        }
        self.place_raycast_filter();
    }

    /// Change a screen's state, with section re-parenting and parent propagation
    fn apply_state(&mut self, id: ScreenId, open: bool) {
        let current_primary = self.current_primary();
        let Some(screen) = self.screens.get_mut(&id) else {
            return;
        };
        if open && screen.section_config().is_some_and(|c| c.dynamic_parent) {
            if let Some(primary) = current_primary {
                screen.set_parent(primary);
            }
        }
        screen.change_state(open);
        tracing::debug!("Screen '{}' {}", screen.name(), if open { "opened" } else { "closed" });
        if screen.is_primary() {
            self.propagate_parent_state(id, open);
        }
    }

    fn propagate_parent_state(&mut self, parent: ScreenId, open: bool) {
        let children: Vec<ScreenId> = self
            .screens
            .values()
            .filter(|screen| screen.parent() == Some(parent))
            .map(|screen| screen.id)
            .collect();
        for child in children {
            let auto_close = self
                .screens
                .get(&child)
                .and_then(Screen::section_config)
                .is_some_and(|c| c.auto_close_on_parent_close);
            if auto_close && !open {
                self.close_section(child, false, None);
            }
            // A still-open child follows its parent's interactability
            if let Some(screen) = self.screens.get_mut(&child) {
                if screen.is_open() {
                    screen.set_interactability(open);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Raycast filter
    // ------------------------------------------------------------------

    fn show_raycast_filter(&mut self) {
        self.raycast_filter_count += 1;
        if self.raycast_filter_count >= 1 {
            self.raycast_filter.set_enabled(true);
            self.raycast_filter.set_color(RAYCAST_FILTER_COLOR);
            self.raycast_filter.set_blocks_input(true);
        }
        self.place_raycast_filter();
    }

    fn hide_raycast_filter(&mut self) {
        if self.raycast_filter_count == 0 {
            tracing::warn!("Raycast filter hidden more times than shown");
        }
        self.raycast_filter_count = self.raycast_filter_count.saturating_sub(1);
        if self.raycast_filter_count == 0 {
            self.raycast_filter.set_enabled(false);
            self.raycast_filter.set_color(Color::CLEAR);
            self.raycast_filter.set_blocks_input(false);
        }
    }

    /// Put the filter behind the most recent screen that owns one, or under the primary below it
    fn place_raycast_filter(&mut self) {
        let placement = self.history.iter().rev().find_map(|id| {
            let screen = self.screens.get(id)?;
            match screen.parent() {
                None => Some(OverlayPlacement::UnderPrimary { primary: *id }),
                Some(parent) if screen.config.has_raycast_filter => {
                    Some(OverlayPlacement::BehindSection { section: *id, parent })
                }
                Some(_) => None,
            }
        });
        if let Some(placement) = placement {
            self.raycast_filter.place(placement);
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Select a widget, refusing widgets under closed screens
    pub fn select(&mut self, target: FocusTarget) {
        if let Some(owner) = self.input.owner_screen(target) {
            if let Some(screen) = self.screens.get(&owner) {
                if !screen.is_open() {
                    tracing::warn!(
                        "Trying to select a widget that's under a closed screen: {} {:?}",
                        screen.name(),
                        target
                    );
                    return;
                }
            }
        }
        self.input.select(target);
    }

    /// Focus the preferred widget of the most recent open screen
    pub fn select_proper_target(&mut self) {
        let target = self
            .history
            .iter()
            .rev()
            .filter_map(|id| self.screens.get(id))
            .find(|screen| screen.is_open())
            .and_then(|screen| screen.preferred_selection(self.input.as_ref()));
        if let Some(target) = target {
            self.select(target);
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Handle the back/cancel input
    pub fn handle_back(&mut self) {
        let Some(screen) = self
            .history
            .iter()
            .rev()
            .filter_map(|id| self.screens.get(id))
            .find(|screen| screen.config.exit_action != ExitAction::Ignore)
        else {
            return;
        };
        if screen.is_primary() && self.is_transitioning {
            return;
        }

        let id = screen.id;
        let is_primary = screen.is_primary();
        let action = screen.config.exit_action;
        let execute_target = screen.config.execute_target;
        match action {
            ExitAction::CloseScreen if is_primary => {
                let transition = self.config.default_back_transition;
                self.transition_back(transition, false);
            }
            ExitAction::CloseScreen => self.close_section(id, true, None),
            ExitAction::ExecuteButtonClick => match execute_target {
                Some(target) if self.input.is_active(target) => self.input.simulate_activation(target),
                Some(target) => tracing::warn!("The target {:?} is inactive!", target),
                None => tracing::warn!("Screen '{}' has no button to execute on back", self.screen_name(id)),
            },
            ExitAction::Nothing | ExitAction::Ignore => {}
        }
    }

    /// Handle a pointer press, closing the top section when touched outside it
    pub fn handle_pointer_down(&mut self, position: [f32; 2]) {
        let Some(screen) = self.history.last().and_then(|id| self.screens.get(id)) else {
            return;
        };
        if screen.is_primary() || screen.config.exit_action != ExitAction::CloseScreen {
            return;
        }
        let id = screen.id;
        let touched_inside = self
            .input
            .hit_test(position)
            .iter()
            .any(|hit| hit.valid && hit.section == Some(id));
        if !touched_inside {
            self.close_section(id, true, None);
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Observe a screen's open/close changes
    pub fn subscribe(&mut self, id: ScreenId, observer: impl FnMut(bool) + 'static) -> Option<SubscriptionId> {
        self.screens.get_mut(&id).map(|screen| screen.subscribe(observer))
    }

    /// Stop observing a screen
    pub fn unsubscribe(&mut self, id: ScreenId, subscription: SubscriptionId) -> bool {
        self.screens
            .get_mut(&id)
            .is_some_and(|screen| screen.unsubscribe(subscription))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn remove_from_history(&mut self, id: ScreenId) {
        if let Some(index) = self.history.iter().position(|s| *s == id) {
            self.history.remove(index);
        }
    }

    fn screen_name(&self, id: ScreenId) -> &str {
        self.screens.get(&id).map_or("<unregistered>", Screen::name)
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("screens", &self.screens.len())
            .field("history", &self.history)
            .field("primary_stack", &self.primary_stack)
            .field("is_transitioning", &self.is_transitioning)
            .field("raycast_filter_count", &self.raycast_filter_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HitResult, ScreenView};
    use crate::screen::{ScreenConfig, SectionConfig};
    use screenflow_animation::{AnimationPlayer, GroupPlayer, Sequence, SimpleTarget, TransitionStep};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct ViewLog {
        visible: bool,
        interactable: bool,
        raycast: bool,
        parent: Option<ScreenId>,
    }

    impl ScreenView for ViewLog {
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }

        fn set_interactable(&mut self, interactable: bool) {
            self.interactable = interactable;
        }

        fn set_alpha(&mut self, _alpha: f32) {}

        fn set_raycast_target(&mut self, enabled: bool) {
            self.raycast = enabled;
        }

        fn attach_to(&mut self, parent: ScreenId) {
            self.parent = Some(parent);
        }
    }

    #[derive(Debug, Default)]
    struct OverlayLog {
        enabled: bool,
        color: Option<Color>,
        blocks_input: bool,
        placement: Option<OverlayPlacement>,
    }

    impl OverlayView for OverlayLog {
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn set_color(&mut self, color: Color) {
            self.color = Some(color);
        }

        fn set_blocks_input(&mut self, blocks: bool) {
            self.blocks_input = blocks;
        }

        fn place(&mut self, placement: OverlayPlacement) {
            self.placement = Some(placement);
        }
    }

    #[derive(Debug, Default)]
    struct InputLog {
        selected: Option<FocusTarget>,
        owners: HashMap<FocusTarget, ScreenId>,
        inactive: Vec<FocusTarget>,
        activated: Vec<FocusTarget>,
        hits: Vec<HitResult>,
    }

    impl InputHost for InputLog {
        fn current_selection(&self) -> Option<FocusTarget> {
            self.selected
        }

        fn select(&mut self, target: FocusTarget) {
            self.selected = Some(target);
        }

        fn is_active(&self, target: FocusTarget) -> bool {
            !self.inactive.contains(&target)
        }

        fn owner_screen(&self, target: FocusTarget) -> Option<ScreenId> {
            self.owners.get(&target).copied()
        }

        fn simulate_activation(&mut self, target: FocusTarget) {
            self.activated.push(target);
        }

        fn hit_test(&self, _position: [f32; 2]) -> Vec<HitResult> {
            self.hits.clone()
        }
    }

    const DT: f32 = 1.0 / 64.0;

    struct Harness {
        nav: NavigationController,
        fade: Rc<RefCell<OverlayLog>>,
        filter: Rc<RefCell<OverlayLog>>,
        input: Rc<RefCell<InputLog>>,
        views: HashMap<ScreenId, Rc<RefCell<ViewLog>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(ScreenFlowConfig::default())
        }

        fn with_config(config: ScreenFlowConfig) -> Self {
            let fade = Rc::new(RefCell::new(OverlayLog::default()));
            let filter = Rc::new(RefCell::new(OverlayLog::default()));
            let input = Rc::new(RefCell::new(InputLog::default()));
            let nav = NavigationController::new(config, fade.clone(), filter.clone(), input.clone());
            Self {
                nav,
                fade,
                filter,
                input,
                views: HashMap::new(),
            }
        }

        fn primary(&mut self, config: ScreenConfig) -> ScreenId {
            let view = Rc::new(RefCell::new(ViewLog::default()));
            let id = self.nav.register(Screen::primary(config, view.clone())).unwrap();
            self.views.insert(id, view);
            id
        }

        fn section(&mut self, config: ScreenConfig, parent: ScreenId, group: Option<GroupPlayer>) -> ScreenId {
            self.section_with(config, SectionConfig::default(), parent, group)
        }

        fn section_with(
            &mut self,
            config: ScreenConfig,
            section: SectionConfig,
            parent: ScreenId,
            group: Option<GroupPlayer>,
        ) -> ScreenId {
            let view = Rc::new(RefCell::new(ViewLog::default()));
            let mut screen = Screen::section(config, section, parent, view.clone());
            if let Some(group) = group {
                screen = screen.with_group(group);
            }
            let id = self.nav.register(screen).unwrap();
            self.views.insert(id, view);
            id
        }

        fn view(&self, id: ScreenId) -> std::cell::Ref<'_, ViewLog> {
            self.views[&id].borrow()
        }

        fn tick(&mut self, count: usize) {
            for _ in 0..count {
                self.nav.tick(FrameTime::uniform(DT));
            }
        }
    }

    /// A panel group whose open and close each last `duration` seconds
    fn panel(duration: f32) -> GroupPlayer {
        let step = TransitionStep::to_scale([1.0, 1.0, 1.0]).with_duration(duration);
        let player = AnimationPlayer::new("panel", SimpleTarget::new())
            .with_named("open", Sequence::new("open").with_step(step).shared())
            .with_named("close", Sequence::new("close").with_step(step).shared());
        GroupPlayer::new("panel").with_player(player)
    }

    #[test]
    fn test_transition_to_same_screen_keeps_depth() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(a, ScreenTransition::None, false);

        assert_eq!(h.nav.primary_stack(), [a]);
        assert_eq!(h.nav.history(), [a]);
        assert!(h.nav.is_open(a));
        assert!(h.view(a).visible);
    }

    #[test]
    fn test_transition_back_at_root_is_noop() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_back(ScreenTransition::None, false);

        assert_eq!(h.nav.primary_stack(), [a]);
        assert!(h.nav.is_open(a));
    }

    #[test]
    fn test_transition_forward_and_back() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::None, false);
        assert!(!h.nav.is_open(a));
        assert!(h.nav.is_open(b));
        assert_eq!(h.nav.current_primary(), Some(b));

        h.nav.transition_back(ScreenTransition::None, false);
        assert!(h.nav.is_open(a));
        assert!(!h.nav.is_open(b));
        assert_eq!(h.nav.primary_stack(), [a]);
        assert_eq!(h.nav.history(), [a]);
    }

    #[test]
    fn test_blink_fade_blocks_input_until_done() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        h.nav.transition_to(a, ScreenTransition::None, false);

        h.nav.transition_to(b, ScreenTransition::blink_fade(), false);
        assert!(h.nav.is_transitioning());
        assert!(h.fade.borrow().blocks_input);
        assert!(h.nav.is_open(a));

        // 0.05s fade out, 0.15s hold, 0.2s fade in, at 64 ticks per second
        let mut closed_at = None;
        let mut opened_at = None;
        let mut finished_at = None;
        for frame in 1..=60 {
            h.tick(1);
            if closed_at.is_none() && !h.nav.is_open(a) {
                closed_at = Some(frame);
                assert!(!h.nav.is_open(b));
                assert_eq!(h.fade.borrow().color, Some(Color::BLACK));
            }
            if opened_at.is_none() && h.nav.is_open(b) {
                opened_at = Some(frame);
            }
            if finished_at.is_none() && !h.nav.is_transitioning() {
                finished_at = Some(frame);
            }
        }
        assert_eq!(closed_at, Some(4));
        assert_eq!(opened_at, Some(14));
        assert_eq!(finished_at, Some(27));
        assert!(h.nav.is_open(b));
        assert!(!h.fade.borrow().blocks_input);
        assert_eq!(h.fade.borrow().color, Some(Color::CLEAR));
    }

    #[test]
    fn test_queued_transitions_run_in_order() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        let c = h.primary(ScreenConfig::new("c"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::blink_fade(), false);
        h.nav.transition_to(c, ScreenTransition::None, false);

        assert_eq!(h.nav.pending_transitions(), 1);
        assert!(!h.nav.is_open(c));
        assert_eq!(h.nav.primary_stack(), [a, b, c]);

        h.tick(60);
        assert_eq!(h.nav.pending_transitions(), 0);
        assert!(!h.nav.is_open(a));
        assert!(!h.nav.is_open(b));
        assert!(h.nav.is_open(c));
        assert!(!h.nav.is_transitioning());
    }

    #[test]
    fn test_override_cancels_running_transition() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        let c = h.primary(ScreenConfig::new("c"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::blink_fade(), false);
        h.tick(1);

        h.nav.transition_to(c, ScreenTransition::None, true);
        assert!(!h.nav.is_open(a));
        assert!(!h.nav.is_open(b));
        assert!(h.nav.is_open(c));
        assert!(!h.nav.is_transitioning());
        assert!(!h.fade.borrow().blocks_input);

        // The cancelled fade never opens b later
        h.tick(60);
        assert!(!h.nav.is_open(b));
    }

    #[test]
    fn test_back_swallowed_while_transitioning() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::blink_fade(), false);

        h.nav.handle_back();
        assert_eq!(h.nav.primary_stack(), [a, b]);

        h.tick(60);
        h.nav.handle_back();
        assert_eq!(h.nav.primary_stack(), [a]);
        assert!(h.nav.is_open(a));
    }

    #[test]
    fn test_back_skips_ignored_screens_and_executes_buttons() {
        let mut h = Harness::new();
        let ok = FocusTarget(7);
        let a = h.primary(
            ScreenConfig::new("a")
                .with_exit_action(ExitAction::ExecuteButtonClick)
                .with_execute_target(ok),
        );
        let hud = h.section(ScreenConfig::new("hud").with_exit_action(ExitAction::Ignore), a, None);
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(hud, false);

        h.nav.handle_back();
        assert_eq!(h.input.borrow().activated, [ok]);
        assert!(h.nav.is_open(hud));

        h.input.borrow_mut().inactive.push(ok);
        h.nav.handle_back();
        assert_eq!(h.input.borrow().activated.len(), 1);
    }

    #[test]
    fn test_back_nothing_consumes_input() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b").with_exit_action(ExitAction::Nothing));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::None, false);

        h.nav.handle_back();
        assert_eq!(h.nav.primary_stack(), [a, b]);
    }

    #[test]
    fn test_back_closes_section_with_animation() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, Some(panel(0.1)));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, true);
        h.tick(10);

        h.nav.handle_back();
        assert_eq!(h.nav.history(), [a]);
        assert!(h.nav.is_open(popup));
        assert!(!h.view(popup).interactable);

        h.tick(30);
        assert!(!h.nav.is_open(popup));
        assert_eq!(h.nav.primary_stack(), [a]);
    }

    #[test]
    fn test_close_then_reopen_stays_open() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, Some(panel(0.5)));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, true);
        h.tick(40);

        let closed = Rc::new(RefCell::new(false));
        let flag = closed.clone();
        h.nav.close_section(popup, true, Some(Box::new(move || *flag.borrow_mut() = true)));
        h.tick(5);
        assert!(h.nav.is_closing(popup));
        h.nav.open_section(popup, true);

        h.tick(60);
        assert!(h.nav.is_open(popup));
        assert!(!h.nav.is_closing(popup));
        assert!(!*closed.borrow());
        assert_eq!(h.nav.history(), [a, popup]);
        assert!(h.view(popup).interactable);
    }

    #[test]
    fn test_instant_reopen_withdraws_close() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, Some(panel(0.5)));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, true);
        h.tick(40);

        let closed = Rc::new(RefCell::new(false));
        let flag = closed.clone();
        h.nav.close_section(popup, true, Some(Box::new(move || *flag.borrow_mut() = true)));
        h.tick(5);
        h.nav.open_section(popup, false);
        assert!(!h.nav.is_closing(popup));

        h.tick(60);
        assert!(h.nav.is_open(popup));
        assert!(!*closed.borrow());
        assert_eq!(h.nav.history(), [a, popup]);
        assert!(h.view(popup).interactable);
    }

    #[test]
    fn test_superseded_close_callback_is_dropped() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, Some(panel(0.25)));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, true);
        h.tick(40);

        let calls = Rc::new(RefCell::new(Vec::new()));
        let first = calls.clone();
        h.nav.close_section(popup, true, Some(Box::new(move || first.borrow_mut().push(1))));
        h.tick(5);
        h.nav.open_section(popup, true);
        let second = calls.clone();
        h.nav.close_section(popup, true, Some(Box::new(move || second.borrow_mut().push(2))));

        h.tick(60);
        assert_eq!(*calls.borrow(), [2]);
        assert!(!h.nav.is_open(popup));
        assert_eq!(h.nav.history(), [a]);
    }

    #[test]
    fn test_close_callback_runs_after_animation() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, Some(panel(0.25)));
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, true);

        let closed = Rc::new(RefCell::new(0));
        let count = closed.clone();
        h.nav.close_section(popup, true, Some(Box::new(move || *count.borrow_mut() += 1)));
        h.tick(5);
        assert_eq!(*closed.borrow(), 0);
        h.tick(60);
        assert_eq!(*closed.borrow(), 1);
        assert!(!h.nav.is_open(popup));
    }

    #[test]
    fn test_raycast_filter_refcount_and_placement() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let first = h.section(ScreenConfig::new("first").with_raycast_filter(true), a, None);
        let second = h.section(ScreenConfig::new("second").with_raycast_filter(true), a, None);
        let plain = h.section(ScreenConfig::new("plain"), a, None);
        h.nav.transition_to(a, ScreenTransition::None, false);
        assert_eq!(h.filter.borrow().placement, Some(OverlayPlacement::UnderPrimary { primary: a }));

        h.nav.open_section(first, false);
        assert_eq!(h.nav.raycast_filter_count(), 1);
        assert!(h.filter.borrow().enabled && h.filter.borrow().blocks_input);
        assert_eq!(h.filter.borrow().color, Some(RAYCAST_FILTER_COLOR));
        assert!(!h.view(a).interactable);

        h.nav.open_section(second, false);
        h.nav.open_section(plain, false);
        assert_eq!(h.nav.raycast_filter_count(), 2);
        assert_eq!(
            h.filter.borrow().placement,
            Some(OverlayPlacement::BehindSection { section: second, parent: a })
        );

        h.nav.close_section(second, false, None);
        assert_eq!(h.nav.raycast_filter_count(), 1);
        assert!(h.filter.borrow().enabled);
        assert_eq!(
            h.filter.borrow().placement,
            Some(OverlayPlacement::BehindSection { section: first, parent: a })
        );

        h.nav.close_section(first, false, None);
        assert_eq!(h.nav.raycast_filter_count(), 0);
        assert!(!h.filter.borrow().enabled);
        assert_eq!(h.filter.borrow().color, Some(Color::CLEAR));
        assert!(!h.filter.borrow().blocks_input);
    }

    #[test]
    fn test_outside_touch_closes_section() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let popup = h.section(ScreenConfig::new("popup"), a, None);
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(popup, false);

        h.input.borrow_mut().hits = vec![HitResult {
            target: FocusTarget(1),
            section: Some(popup),
            valid: true,
        }];
        h.nav.handle_pointer_down([10.0, 10.0]);
        assert!(h.nav.is_open(popup));

        h.input.borrow_mut().hits = vec![HitResult {
            target: FocusTarget(2),
            section: None,
            valid: true,
        }];
        h.nav.handle_pointer_down([500.0, 10.0]);
        assert!(!h.nav.is_open(popup));

        // Primary screens ignore outside touches
        h.nav.handle_pointer_down([500.0, 10.0]);
        assert!(h.nav.is_open(a));
    }

    #[test]
    fn test_pointer_down_with_empty_history() {
        let mut h = Harness::new();
        h.primary(ScreenConfig::new("a"));
        h.nav.handle_pointer_down([0.0, 0.0]);
        h.nav.handle_back();
        assert!(h.nav.history().is_empty());
    }

    #[test]
    fn test_sections_follow_parent() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        let auto = h.section(ScreenConfig::new("auto"), a, None);
        let sticky = h.section_with(
            ScreenConfig::new("sticky"),
            SectionConfig {
                auto_close_on_parent_close: false,
                dynamic_parent: false,
            },
            a,
            None,
        );
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.open_section(auto, false);
        h.nav.open_section(sticky, false);

        h.nav.transition_to(b, ScreenTransition::None, false);
        assert!(!h.nav.is_open(auto));
        assert!(h.nav.is_open(sticky));
        assert!(!h.view(sticky).interactable && !h.view(sticky).raycast);

        h.nav.transition_back(ScreenTransition::None, false);
        assert!(h.view(sticky).interactable && h.view(sticky).raycast);
    }

    #[test]
    fn test_dynamic_parent_follows_current_primary() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        let toast = h.section_with(
            ScreenConfig::new("toast"),
            SectionConfig {
                auto_close_on_parent_close: true,
                dynamic_parent: true,
            },
            a,
            None,
        );
        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::None, false);
        h.nav.open_section(toast, false);

        assert_eq!(h.nav.screen(toast).and_then(Screen::parent), Some(b));
        assert_eq!(h.view(toast).parent, Some(b));

        // Now owned by b, so closing b closes it
        h.nav.transition_back(ScreenTransition::None, false);
        assert!(!h.nav.is_open(toast));
    }

    #[test]
    fn test_focus_restored_on_close() {
        let mut h = Harness::new();
        let play = FocusTarget(1);
        let options = FocusTarget(2);
        let a = h.primary(ScreenConfig::new("a").with_default_selection(play));
        let popup = h.section(ScreenConfig::new("popup").with_default_selection(options), a, None);
        {
            let mut input = h.input.borrow_mut();
            input.owners.insert(play, a);
            input.owners.insert(options, popup);
        }

        h.nav.transition_to(a, ScreenTransition::None, false);
        assert_eq!(h.input.borrow().selected, Some(play));

        h.nav.open_section(popup, false);
        assert_eq!(h.input.borrow().selected, Some(options));

        h.nav.close_section(popup, false, None);
        assert_eq!(h.input.borrow().selected, Some(play));
        assert_eq!(h.nav.screen(a).and_then(Screen::last_selection), Some(play));
    }

    #[test]
    fn test_selection_falls_back_to_secondary() {
        let mut h = Harness::new();
        let gone = FocusTarget(1);
        let fallback = FocusTarget(2);
        let a = h.primary(
            ScreenConfig::new("a")
                .with_default_selection(gone)
                .with_secondary_selection(fallback),
        );
        h.input.borrow_mut().inactive.push(gone);
        h.nav.transition_to(a, ScreenTransition::None, false);
        assert_eq!(h.input.borrow().selected, Some(fallback));
    }

    #[test]
    fn test_select_refuses_closed_screens() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let hidden = FocusTarget(9);
        h.input.borrow_mut().owners.insert(hidden, a);

        h.nav.select(hidden);
        assert_eq!(h.input.borrow().selected, None);
    }

    #[test]
    fn test_observers_and_unsubscribe() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a"));
        let b = h.primary(ScreenConfig::new("b"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let sub = h.nav.subscribe(a, move |open| log.borrow_mut().push(open)).unwrap();

        h.nav.transition_to(a, ScreenTransition::None, false);
        h.nav.transition_to(b, ScreenTransition::None, false);
        assert!(h.nav.unsubscribe(a, sub));
        h.nav.transition_back(ScreenTransition::None, false);

        assert_eq!(*seen.borrow(), [true, false]);
    }

    #[test]
    fn test_registration_rules() {
        let mut h = Harness::new();
        let a = h.primary(ScreenConfig::new("a").with_start_closed(false));
        assert!(h.nav.is_open(a));
        assert!(h.nav.history().is_empty());

        let popup = h.section(ScreenConfig::new("popup"), a, None);
        let orphan = Screen::section(ScreenConfig::new("orphan"), SectionConfig::default(), ScreenId::new(), ViewLog::default());
        assert!(matches!(h.nav.register(orphan), Err(NavigationError::UnknownParent { .. })));
        let nested = Screen::section(ScreenConfig::new("nested"), SectionConfig::default(), popup, ViewLog::default());
        assert!(matches!(h.nav.register(nested), Err(NavigationError::NotAPrimary(_))));

        assert_eq!(h.nav.screen_by_name("popup"), Some(popup));
        assert!(h.nav.unregister(popup).is_some());
        assert!(h.nav.screen_by_name("popup").is_none());
    }

    #[test]
    fn test_start_transitions_to_initial_screen() {
        let config = ScreenFlowConfig {
            initial_screen: Some("title".to_string()),
            ..ScreenFlowConfig::default()
        };
        let mut h = Harness::with_config(config);
        let title = h.primary(ScreenConfig::new("title"));
        h.nav.start().unwrap();
        assert!(h.nav.is_open(title));
        assert_eq!(h.nav.primary_stack(), [title]);

        let missing = ScreenFlowConfig {
            initial_screen: Some("missing".to_string()),
            ..ScreenFlowConfig::default()
        };
        let mut h = Harness::with_config(missing);
        assert!(matches!(h.nav.start(), Err(NavigationError::UnknownScreen(_))));
    }
}
