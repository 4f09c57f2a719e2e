use std::collections::HashMap;

use glam::Vec2;
use log::{debug, warn};

use crate::{ClientInputUpdate, HostType, NetworkId};

use super::{InputMode, InputSource, InputState, InputUpdateType, PointerButton, PressState};

/// Answers whether a player currently has a menu open. `None` is the local
/// player.
pub trait ModalTracker {
    fn is_in_menu(&self, player: Option<NetworkId>) -> bool;
}

/// Tracker for games without menus.
pub struct NoModals;

impl ModalTracker for NoModals {
    fn is_in_menu(&self, _player: Option<NetworkId>) -> bool {
        false
    }
}

/// Input states of the local player and, on the server, of every remote
/// player. Players are addressed by the id of their player entity; `None`
/// always means the local player.
pub struct InputManager {
    host_type: HostType,
    actions: Vec<String>,
    local: InputState,
    local_player: Option<NetworkId>,
    remote: HashMap<NetworkId, InputState>,
}

impl InputManager {
    pub fn new(host_type: HostType, actions: &[String]) -> Self {
        Self {
            host_type,
            actions: actions.to_vec(),
            local: InputState::new(actions.iter().cloned()),
            local_player: None,
            remote: HashMap::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    // Players

    pub fn set_local_player(&mut self, player: NetworkId) {
        self.local_player = Some(player);
    }

    pub fn local_player(&self) -> Option<NetworkId> {
        self.local_player
    }

    /// Creates the input state of a remote player. The local player already
    /// has one and is skipped.
    pub fn register_player(&mut self, player: NetworkId) {
        if self.local_player == Some(player) {
            debug!("input: player {} is local, not registering a remote state", player);
            return;
        }
        let actions = &self.actions;
        self.remote
            .entry(player)
            .or_insert_with(|| InputState::new(actions.iter().cloned()));
    }

    pub fn unregister_player(&mut self, player: &NetworkId) -> bool {
        self.remote.remove(player).is_some()
    }

    pub fn is_registered(&self, player: &NetworkId) -> bool {
        self.remote.contains_key(player)
    }

    pub fn state(&self, player: Option<NetworkId>) -> Option<&InputState> {
        match player {
            None => Some(&self.local),
            Some(id) if self.local_player == Some(id) => Some(&self.local),
            Some(id) => self.remote.get(&id),
        }
    }

    pub fn state_mut(&mut self, player: Option<NetworkId>) -> Option<&mut InputState> {
        match player {
            None => Some(&mut self.local),
            Some(id) if self.local_player == Some(id) => Some(&mut self.local),
            Some(id) => self.remote.get_mut(&id),
        }
    }

    // Tick

    pub fn update_local(&mut self, source: &dyn InputSource) -> InputUpdateType {
        self.local.update(source)
    }

    /// The local player's outgoing message for `kind`, if there is a local
    /// player to send it for.
    pub fn outgoing_update(&self, kind: InputUpdateType) -> Option<ClientInputUpdate> {
        let owner = self.local_player?;
        self.local.outgoing(owner, kind)
    }

    /// Settles the edges every remote player produced last tick.
    pub fn settle_remote(&mut self) {
        for state in self.remote.values_mut() {
            state.settle();
        }
    }

    /// Applies a client's update to the state of its player. Returns false
    /// when the player is not registered.
    pub fn apply_remote_update(&mut self, update: &ClientInputUpdate, modals: &dyn ModalTracker) -> bool {
        let in_menu = modals.is_in_menu(Some(update.owner));
        let Some(state) = self.remote.get_mut(&update.owner) else {
            warn!("input update for unregistered player {}", update.owner);
            return false;
        };
        state.apply_remote(update, in_menu);
        true
    }

    // Queries

    fn query(&self, player: Option<NetworkId>, mode: InputMode, check: impl Fn(&InputState) -> bool) -> bool {
        let Some(state) = self.state(player) else {
            warn!("input query for unregistered player {:?}", player);
            return false;
        };
        state.mode() == mode && check(state)
    }

    pub fn action_just_pressed(&self, action: &str, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.action(action) == Some(PressState::JustPressed))
    }

    pub fn action_pressed(&self, action: &str, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.action(action) == Some(PressState::Pressed))
    }

    pub fn action_just_released(&self, action: &str, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.action(action) == Some(PressState::JustReleased))
    }

    pub fn pointer_just_pressed(&self, button: PointerButton, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.pointer(button) == PressState::JustPressed)
    }

    pub fn pointer_pressed(&self, button: PointerButton, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.pointer(button) == PressState::Pressed)
    }

    pub fn pointer_just_released(&self, button: PointerButton, mode: InputMode, player: Option<NetworkId>) -> bool {
        self.query(player, mode, |state| state.pointer(button) == PressState::JustReleased)
    }

    pub fn pointer_position(&self, player: Option<NetworkId>) -> Option<Vec2> {
        self.state(player).map(InputState::pointer_position)
    }

    pub fn mode(&self, player: Option<NetworkId>) -> Option<InputMode> {
        self.state(player).map(InputState::mode)
    }

    // Mode & resets

    pub fn set_mode(&mut self, player: Option<NetworkId>, mode: InputMode) {
        if let Some(state) = self.state_mut(player) {
            state.set_mode(mode);
        }
    }

    pub fn reset_action_input(&mut self, player: Option<NetworkId>, action: &str) {
        if let Some(state) = self.state_mut(player) {
            state.reset_action(action);
        }
    }

    pub fn reset_pointer_input(&mut self, player: Option<NetworkId>, button: PointerButton) {
        if let Some(state) = self.state_mut(player) {
            state.reset_pointer(button);
        }
    }

    pub fn reset_all_input(&mut self, player: Option<NetworkId>) {
        if let Some(state) = self.state_mut(player) {
            state.reset_all();
        }
    }

    pub fn on_menu_opened(&mut self, player: Option<NetworkId>) {
        self.set_mode(player, InputMode::Ui);
    }

    /// Returns to gameplay once the player has no menu left open.
    pub fn on_menu_closed(&mut self, player: Option<NetworkId>, modals: &dyn ModalTracker) {
        if modals.is_in_menu(player) {
            return;
        }
        if self.mode(player) == Some(InputMode::Ui) {
            self.set_mode(player, InputMode::Gameplay);
        }
    }
}
