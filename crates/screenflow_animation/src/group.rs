// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fan-out control over several players.

use crate::clock::{FrameTime, TaskStatus};
use crate::player::{AnimationPlayer, PlayerEvent};
use crate::sequence::AnimationId;

/// A set of players driven together by animation identifier
#[derive(Debug)]
pub struct GroupPlayer {
    /// Group name, used in logs
    pub name: String,
    players: Vec<AnimationPlayer>,
    default_id: Option<AnimationId>,
    play_on_enable: bool,
    last_played_id: Option<AnimationId>,
    events: Vec<(usize, PlayerEvent)>,
}

impl GroupPlayer {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
            default_id: None,
            play_on_enable: false,
            last_played_id: None,
            events: Vec::new(),
        }
    }

    /// Add a member player
    pub fn with_player(mut self, player: AnimationPlayer) -> Self {
        self.players.push(player);
        self
    }

    /// Identifier played by [`Self::play_default`]
    pub fn with_default_id(mut self, id: impl Into<AnimationId>) -> Self {
        self.default_id = Some(id.into());
        self
    }

    /// Play the default identifier on enable
    pub fn with_play_on_enable(mut self, enabled: bool) -> Self {
        self.play_on_enable = enabled;
        self
    }

    /// Add a member player
    pub fn add_player(&mut self, player: AnimationPlayer) {
        self.players.push(player);
    }

    /// Enable every member, then optionally play the default identifier
    pub fn on_enable(&mut self) {
        for player in &mut self.players {
            player.on_enable();
        }
        if self.play_on_enable {
            self.play_default();
        }
    }

    /// Play the default identifier on every member
    pub fn play_default(&mut self) {
        match self.default_id.clone() {
            Some(id) => self.play_with_id(&id),
            None => tracing::warn!("There is no default animation id assigned to group '{}'", self.name),
        }
    }

    /// Ask every member to play `id`; members without it stay as they are
    pub fn play_with_id(&mut self, id: &AnimationId) {
        self.last_played_id = Some(id.clone());
        for player in &mut self.players {
            player.play_with_id(id);
        }
    }

    /// Play `id` and return a wait handle over the members that started it
    pub fn play_and_wait_all(&mut self, id: &AnimationId) -> GroupWait {
        self.play_with_id(id);
        GroupWait {
            id: id.clone(),
            members: self
                .players
                .iter()
                .enumerate()
                .filter(|(_, player)| player.is_playing_with_id(id))
                .map(|(index, _)| index)
                .collect(),
        }
    }

    /// Stop every member
    pub fn stop(&mut self) {
        for player in &mut self.players {
            player.stop();
        }
    }

    /// Advance every member by one tick.
    ///
    /// Completes once no member is playing.
    pub fn advance(&mut self, frame: FrameTime) -> TaskStatus {
        self.events.clear();
        let mut status = TaskStatus::Completed;
        for (index, player) in self.players.iter_mut().enumerate() {
            if player.advance(frame) == TaskStatus::Running {
                status = TaskStatus::Running;
            }
            self.events
                .extend(player.take_events().into_iter().map(|event| (index, event)));
        }
        status
    }

    /// Whether any member is playing `id`
    pub fn is_playing_with_id(&self, id: &AnimationId) -> bool {
        self.players.iter().any(|player| player.is_playing_with_id(id))
    }

    /// Whether any member is playing
    pub fn is_playing(&self) -> bool {
        self.players.iter().any(AnimationPlayer::is_playing)
    }

    /// Identifier of the last [`Self::play_with_id`] call
    pub fn last_played_id(&self) -> Option<&AnimationId> {
        self.last_played_id.as_ref()
    }

    /// Member players
    pub fn players(&self) -> &[AnimationPlayer] {
        &self.players
    }

    /// Mutable member players
    pub fn players_mut(&mut self) -> &mut [AnimationPlayer] {
        &mut self.players
    }

    /// Member events from the last advance, tagged with the member index
    pub fn take_events(&mut self) -> Vec<(usize, PlayerEvent)> {
        std::mem::take(&mut self.events)
    }
}

/// Waits until every member that started an identifier has stopped playing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupWait {
    id: AnimationId,
    members: Vec<usize>,
}

impl GroupWait {
    /// Identifier being waited on
    pub fn id(&self) -> &AnimationId {
        &self.id
    }

    /// Indices of the members being waited on
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Check the group; completes once no tracked member still plays the identifier
    pub fn poll(&self, group: &GroupPlayer) -> TaskStatus {
        let waiting = self.members.iter().any(|&index| {
            group
                .players
                .get(index)
                .is_some_and(|player| player.is_playing_with_id(&self.id))
        });
        if waiting {
            TaskStatus::Running
        } else {
            TaskStatus::Completed
        }
    }
}
