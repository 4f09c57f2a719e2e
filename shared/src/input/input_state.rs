use std::{collections::BTreeMap, fmt, str::FromStr};

use glam::Vec2;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{ClientInputUpdate, NetworkId};

use super::{InputSource, PressState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

impl PointerButton {
    pub const ALL: [PointerButton; 3] = [PointerButton::Left, PointerButton::Middle, PointerButton::Right];

    pub fn code(self) -> u8 {
        match self {
            PointerButton::Left => 1,
            PointerButton::Right => 2,
            PointerButton::Middle => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PointerButton::Left),
            2 => Some(PointerButton::Right),
            3 => Some(PointerButton::Middle),
            _ => None,
        }
    }
}

impl fmt::Display for PointerButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PointerButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(PointerButton::from_code)
            .ok_or_else(|| format!("invalid pointer button `{}`", s))
    }
}

// Buttons key a map on the wire, so they travel as strings
impl Serialize for PointerButton {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PointerButton {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Whether a player's input drives menus or the game world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputMode {
    #[default]
    Ui,
    Gameplay,
}

impl Serialize for InputMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            InputMode::Ui => 0,
            InputMode::Gameplay => 1,
        })
    }
}

impl<'de> Deserialize<'de> for InputMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(InputMode::Ui),
            1 => Ok(InputMode::Gameplay),
            other => Err(de::Error::custom(format!("invalid input mode {}", other))),
        }
    }
}

/// How much of a local input state must be resent after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputUpdateType {
    None,
    /// A discrete transition happened: resend everything
    UpdateAll,
    /// Something is held: resend the pointer position only
    UpdateMouse,
}

/// Press states of one controller, plus its pointer and input mode.
#[derive(Clone, Debug, PartialEq)]
pub struct InputState {
    actions: BTreeMap<String, PressState>,
    pointers: BTreeMap<PointerButton, PressState>,
    pointer_position: Vec2,
    mode: InputMode,
    prior_mode: InputMode,
}

impl InputState {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions
                .into_iter()
                .map(|action| (action.into(), PressState::NotPressed))
                .collect(),
            pointers: PointerButton::ALL
                .into_iter()
                .map(|button| (button, PressState::NotPressed))
                .collect(),
            pointer_position: Vec2::ZERO,
            mode: InputMode::default(),
            prior_mode: InputMode::default(),
        }
    }

    // Local

    /// Advances every entry one step from the physical input and classifies
    /// what has to be resent.
    pub fn update(&mut self, source: &dyn InputSource) -> InputUpdateType {
        let mut changed = false;
        let mut held = false;

        for (action, state) in self.actions.iter_mut() {
            let pressed = source.action_pressed(action);
            held |= pressed;
            let next = state.step(pressed);
            changed |= next != *state;
            *state = next;
        }
        for (button, state) in self.pointers.iter_mut() {
            let pressed = source.pointer_pressed(*button);
            held |= pressed;
            let next = state.step(pressed);
            changed |= next != *state;
            *state = next;
        }
        self.pointer_position = source.pointer_position();

        if self.mode != self.prior_mode {
            self.prior_mode = self.mode;
            changed = true;
        }

        if changed {
            InputUpdateType::UpdateAll
        } else if held {
            InputUpdateType::UpdateMouse
        } else {
            InputUpdateType::None
        }
    }

    /// The message describing this state for `kind`, sent on behalf of the
    /// player entity `owner`.
    pub fn outgoing(&self, owner: NetworkId, kind: InputUpdateType) -> Option<ClientInputUpdate> {
        let mut update = ClientInputUpdate {
            owner,
            actions: BTreeMap::new(),
            pointers: BTreeMap::new(),
            mode: None,
            pointer_position: None,
        };
        match kind {
            InputUpdateType::None => return None,
            InputUpdateType::UpdateAll => {
                update.actions = self.actions.clone();
                update.pointers = self.pointers.clone();
                update.mode = Some(self.mode);
            }
            InputUpdateType::UpdateMouse => {}
        }
        update.pointer_position = Some(self.pointer_position);
        Some(update)
    }

    // Remote

    /// Settles edges after they have been visible for one server tick.
    pub fn settle(&mut self) {
        for state in self.actions.values_mut().chain(self.pointers.values_mut()) {
            *state = state.settle();
        }
    }

    /// Applies a client's update. Only edges are taken, the server derives
    /// the held states itself via [`settle`](Self::settle). A switch to
    /// gameplay is refused while the player is in a menu.
    pub fn apply_remote(&mut self, update: &ClientInputUpdate, in_menu: bool) {
        for (action, state) in &update.actions {
            if state.is_edge() {
                if let Some(slot) = self.actions.get_mut(action) {
                    *slot = *state;
                }
            }
        }
        for (button, state) in &update.pointers {
            if state.is_edge() {
                self.pointers.insert(*button, *state);
            }
        }

        if let Some(mode) = update.mode {
            if mode != self.mode {
                match mode {
                    InputMode::Ui => self.set_mode(InputMode::Ui),
                    InputMode::Gameplay if !in_menu => self.set_mode(InputMode::Gameplay),
                    InputMode::Gameplay => {}
                }
            }
        }

        if let Some(position) = update.pointer_position {
            self.pointer_position = position;
        }
    }

    // Mode & resets

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switches mode and parks every entry in `Reset`.
    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.reset_all();
    }

    pub fn reset_all(&mut self) {
        for state in self.actions.values_mut().chain(self.pointers.values_mut()) {
            *state = PressState::Reset;
        }
    }

    pub fn reset_action(&mut self, action: &str) {
        if let Some(state) = self.actions.get_mut(action) {
            *state = PressState::Reset;
        }
    }

    pub fn reset_pointer(&mut self, button: PointerButton) {
        self.pointers.insert(button, PressState::Reset);
    }

    // Queries

    pub fn action(&self, action: &str) -> Option<PressState> {
        self.actions.get(action).copied()
    }

    pub fn pointer(&self, button: PointerButton) -> PressState {
        self.pointers.get(&button).copied().unwrap_or_default()
    }

    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    pub fn actions(&self) -> &BTreeMap<String, PressState> {
        &self.actions
    }
}
