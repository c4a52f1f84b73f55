// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted walk through the screen flow of a small game menu.

use crate::views::{LoggingOverlay, LoggingView, ScriptedInput, Widget};
use screenflow_animation::{AnimationPlayer, FrameTime, GroupPlayer, SequenceError, SequenceLibrary, SimpleTarget};
use screenflow_navigation::{
    ExitAction, FocusTarget, NavigationController, NavigationError, Screen, ScreenConfig, ScreenFlowConfig, ScreenId,
    ScreenTransition, SectionConfig,
};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Demo tick rate
pub const FRAME_RATE: f32 = 60.0;

/// Errors raised while setting up or running the scenario
#[derive(Debug, Error)]
pub enum DemoError {
    /// Screen registration or config error
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Sequence library error
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// A sequence the scenario needs is not in the library
    #[error("Missing sequence: {0}")]
    MissingSequence(String),

    /// A scripted action names an unregistered screen
    #[error("Unknown screen in script: {0}")]
    UnknownScreen(String),
}

/// One scripted input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Open a section with its panel animation
    OpenSection(&'static str),
    /// Close a section with its panel animation
    CloseSection(&'static str),
    /// Push a primary screen with a blink fade
    TransitionTo(&'static str),
    /// Back/cancel input
    Back,
    /// Pointer press at a screen position
    PointerDown([f32; 2]),
}

/// An action fired at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedAction {
    /// Seconds since the scenario started
    pub at: f32,
    /// The action
    pub action: Action,
}

const fn at(at: f32, action: Action) -> TimedAction {
    TimedAction { at, action }
}

/// Title -> options (dismissed by an outside touch) -> game with a toast and a
/// confirm dialog -> back to the title.
pub const DEFAULT_SCRIPT: &[TimedAction] = &[
    at(0.75, Action::OpenSection("options")),
    at(1.5, Action::PointerDown([20.0, 20.0])),
    at(2.25, Action::TransitionTo("game")),
    at(3.0, Action::OpenSection("toast")),
    at(3.25, Action::OpenSection("confirm")),
    at(3.5, Action::Back),
    at(3.75, Action::CloseSection("confirm")),
    at(4.0, Action::Back),
];

/// What the scenario ended with
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Ticks run
    pub frames: u32,
    /// Primary screen entered last
    pub final_primary: Option<String>,
    /// Screens still open, in registration order
    pub open_screens: Vec<String>,
    /// Every open/close change, in order
    pub state_changes: Vec<(String, bool)>,
    /// Widgets activated through back/cancel
    pub activations: Vec<FocusTarget>,
    /// Widget selected at the end
    pub selection: Option<FocusTarget>,
}

/// A configured scenario
pub struct Scenario {
    config: ScreenFlowConfig,
    library: SequenceLibrary,
    script: Vec<TimedAction>,
    duration: f32,
}

impl Scenario {
    /// Create a scenario running the default script
    pub fn new(config: ScreenFlowConfig, library: SequenceLibrary) -> Self {
        Self {
            config,
            library,
            script: DEFAULT_SCRIPT.to_vec(),
            duration: 5.0,
        }
    }

    /// Replace the script
    #[cfg(test)]
    pub fn with_script(mut self, script: Vec<TimedAction>, duration: f32) -> Self {
        self.script = script;
        self.duration = duration;
        self
    }

    fn sequence_player(&self, name: &str, open: &str, close: Option<&str>) -> Result<AnimationPlayer, DemoError> {
        let lookup = |sequence: &str| {
            self.library
                .get(sequence)
                .ok_or_else(|| DemoError::MissingSequence(sequence.to_string()))
        };
        let mut player =
            AnimationPlayer::new(name, SimpleTarget::new()).with_named(self.config.open_panel_id.clone(), lookup(open)?);
        if let Some(close) = close {
            player = player.with_named(self.config.close_panel_id.clone(), lookup(close)?);
        }
        Ok(player)
    }

    /// Run the script to the end and report the final state
    pub fn run(self) -> Result<Report, DemoError> {
        let input = Rc::new(RefCell::new(ScriptedInput::default()));
        let mut nav = NavigationController::new(
            self.config.clone(),
            LoggingOverlay::new("transition"),
            LoggingOverlay::new("raycast filter"),
            Rc::clone(&input),
        );

        let title = nav.register(Screen::primary(
            ScreenConfig::new("title").with_default_selection(FocusTarget(1)),
            LoggingView::new("title"),
        ))?;
        let game = nav.register(Screen::primary(
            ScreenConfig::new("game").with_default_selection(FocusTarget(20)),
            LoggingView::new("game"),
        ))?;

        let panel = GroupPlayer::new("options panel")
            .with_player(self.sequence_player("options frame", "panel_open", Some("panel_close"))?)
            .with_player(self.sequence_player("options content", "panel_open", Some("panel_close"))?);
        let options = nav.register(
            Screen::section(
                ScreenConfig::new("options")
                    .with_default_selection(FocusTarget(10))
                    .with_secondary_selection(FocusTarget(11))
                    .with_raycast_filter(true),
                SectionConfig::default(),
                title,
                LoggingView::new("options"),
            )
            .with_group(panel),
        )?;

        nav.register(
            Screen::section(
                ScreenConfig::new("toast").with_exit_action(ExitAction::Ignore),
                SectionConfig {
                    dynamic_parent: true,
                    ..SectionConfig::default()
                },
                title,
                LoggingView::new("toast"),
            )
            .with_group(GroupPlayer::new("toast").with_player(self.sequence_player("toast", "toast_pulse", None)?)),
        )?;

        let confirm = nav.register(Screen::section(
            ScreenConfig::new("confirm")
                .with_default_selection(FocusTarget(30))
                .with_raycast_filter(true)
                .with_exit_action(ExitAction::ExecuteButtonClick)
                .with_execute_target(FocusTarget(31)),
            SectionConfig::default(),
            game,
            LoggingView::new("confirm"),
        ))?;

        {
            let mut input = input.borrow_mut();
            let widget = |target, screen: ScreenId, section: Option<ScreenId>, rect| Widget {
                target: FocusTarget(target),
                screen,
                section,
                rect,
            };
            input.add_widget(widget(1, title, None, [540.0, 400.0, 200.0, 60.0]));
            input.add_widget(widget(2, title, None, [540.0, 480.0, 200.0, 60.0]));
            input.add_widget(widget(10, options, Some(options), [440.0, 200.0, 400.0, 60.0]));
            input.add_widget(widget(11, options, Some(options), [440.0, 280.0, 400.0, 60.0]));
            input.add_widget(widget(20, game, None, [20.0, 20.0, 80.0, 80.0]));
            input.add_widget(widget(30, confirm, Some(confirm), [440.0, 400.0, 180.0, 60.0]));
            input.add_widget(widget(31, confirm, Some(confirm), [660.0, 400.0, 180.0, 60.0]));
        }

        let changes = Rc::new(RefCell::new(Vec::new()));
        let ids: Vec<ScreenId> = nav.screens().map(|screen| screen.id).collect();
        for id in ids {
            let name = nav.screen(id).map(|s| s.name().to_string()).unwrap_or_default();
            let changes = Rc::clone(&changes);
            nav.subscribe(id, move |open| changes.borrow_mut().push((name.clone(), open)));
        }

        nav.start()?;

        let dt = 1.0 / FRAME_RATE;
        let frames = (self.duration * FRAME_RATE).round() as u32;
        let mut script = self.script.iter().peekable();
        for frame in 0..frames {
            let time = frame as f32 * dt;
            while let Some(timed) = script.next_if(|timed| timed.at <= time) {
                tracing::info!("t={:.2}s {:?}", time, timed.action);
                perform(&mut nav, timed.action)?;
            }
            nav.tick(FrameTime::uniform(dt));
        }

        let open_screens = nav
            .screens()
            .filter(|screen| screen.is_open())
            .map(|screen| screen.name().to_string())
            .collect();
        let final_primary = nav
            .current_primary()
            .and_then(|id| nav.screen(id))
            .map(|screen| screen.name().to_string());
        let input = input.borrow();
        let state_changes = changes.borrow().clone();
        Ok(Report {
            frames,
            final_primary,
            open_screens,
            state_changes,
            activations: input.activations().to_vec(),
            selection: input.selected(),
        })
    }
}

fn perform(nav: &mut NavigationController, action: Action) -> Result<(), DemoError> {
    let lookup = |nav: &NavigationController, name: &str| {
        nav.screen_by_name(name)
            .ok_or_else(|| DemoError::UnknownScreen(name.to_string()))
    };
    match action {
        Action::OpenSection(name) => {
            let id = lookup(nav, name)?;
            nav.open_section(id, true);
        }
        Action::CloseSection(name) => {
            let id = lookup(nav, name)?;
            nav.close_section(
                id,
                true,
                Some(Box::new(move || tracing::info!("Section '{}' finished closing", name))),
            );
        }
        Action::TransitionTo(name) => {
            let id = lookup(nav, name)?;
            nav.transition_to(id, ScreenTransition::blink_fade(), false);
        }
        Action::Back => nav.handle_back(),
        Action::PointerDown(position) => nav.handle_pointer_down(position),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = include_str!("../assets/config.ron");
    const SEQUENCES: &str = include_str!("../assets/sequences.ron");

    fn scenario() -> Scenario {
        let config = ScreenFlowConfig::from_ron(CONFIG).unwrap();
        let library = SequenceLibrary::from_ron(SEQUENCES).unwrap();
        Scenario::new(config, library)
    }

    fn changes_for<'a>(report: &'a Report, name: &str) -> Vec<bool> {
        report
            .state_changes
            .iter()
            .filter(|(screen, _)| screen == name)
            .map(|(_, open)| *open)
            .collect()
    }

    #[test]
    fn test_bundled_assets_load() {
        let config = ScreenFlowConfig::from_ron(CONFIG).unwrap();
        assert_eq!(config.initial_screen.as_deref(), Some("title"));
        let library = SequenceLibrary::from_ron(SEQUENCES).unwrap();
        let open = library.get("panel_open").unwrap();
        assert_eq!(open.chained().map(|s| s.name.as_str()), Some("panel_idle"));
        assert_eq!(library.len(), 4);
    }

    #[test]
    fn test_default_script_returns_to_title() {
        let report = scenario().run().unwrap();
        assert_eq!(report.frames, 300);
        assert_eq!(report.final_primary.as_deref(), Some("title"));
        assert_eq!(report.open_screens, ["title"]);
        // Back on the confirm dialog presses its "no" button
        assert_eq!(report.activations, [FocusTarget(31)]);
        assert_eq!(report.selection, Some(FocusTarget(1)));
    }

    #[test]
    fn test_default_script_state_changes() {
        let report = scenario().run().unwrap();
        // Observers are attached after registration
        assert_eq!(changes_for(&report, "options"), [true, false]);
        assert_eq!(changes_for(&report, "game"), [true, false]);
        assert_eq!(changes_for(&report, "confirm"), [true, false]);
        // Closed with the game screen it was moved under
        assert_eq!(changes_for(&report, "toast"), [true, false]);
    }

    #[test]
    fn test_unknown_screen_in_script() {
        let result = scenario()
            .with_script(vec![at(0.0, Action::OpenSection("missing"))], 0.1)
            .run();
        assert!(matches!(result, Err(DemoError::UnknownScreen(name)) if name == "missing"));
    }

    #[test]
    fn test_missing_sequence() {
        let config = ScreenFlowConfig::from_ron(CONFIG).unwrap();
        let result = Scenario::new(config, SequenceLibrary::default()).run();
        assert!(matches!(result, Err(DemoError::MissingSequence(name)) if name == "panel_open"));
    }
}
