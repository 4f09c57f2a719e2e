use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Edge-aware state of one key or button.
///
/// Advances at most one step per tick. `Reset` is entered when an input
/// mode switch invalidates held input; it stays there until the physical
/// input is released, so a held key never leaks into the new mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PressState {
    #[default]
    NotPressed,
    JustPressed,
    Pressed,
    JustReleased,
    Reset,
}

impl PressState {
    /// One tick of the local state machine.
    pub fn step(self, pressed: bool) -> Self {
        match (self, pressed) {
            (PressState::NotPressed, true) => PressState::JustPressed,
            (PressState::JustPressed, true) => PressState::Pressed,
            (PressState::Pressed, true) => PressState::Pressed,
            (PressState::JustReleased, _) => PressState::NotPressed,
            (PressState::Reset, true) => PressState::Reset,
            (PressState::Reset, false) => PressState::NotPressed,
            (PressState::JustPressed, false) | (PressState::Pressed, false) => PressState::JustReleased,
            (PressState::NotPressed, false) => PressState::NotPressed,
        }
    }

    /// Server-side settling of a remote edge once it has been observed for a
    /// tick.
    pub fn settle(self) -> Self {
        match self {
            PressState::JustPressed => PressState::Pressed,
            PressState::JustReleased => PressState::NotPressed,
            other => other,
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(self, PressState::JustPressed | PressState::JustReleased)
    }

    pub fn is_down(self) -> bool {
        matches!(self, PressState::JustPressed | PressState::Pressed)
    }

    fn code(self) -> u8 {
        match self {
            PressState::NotPressed => 0,
            PressState::JustPressed => 1,
            PressState::Pressed => 2,
            PressState::JustReleased => 3,
            PressState::Reset => 4,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PressState::NotPressed),
            1 => Some(PressState::JustPressed),
            2 => Some(PressState::Pressed),
            3 => Some(PressState::JustReleased),
            4 => Some(PressState::Reset),
            _ => None,
        }
    }
}

impl Serialize for PressState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for PressState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        PressState::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("invalid press state {}", code)))
    }
}
