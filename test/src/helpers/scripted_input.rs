use std::collections::BTreeSet;

use arbor_shared::{InputSource, PointerButton, Vec2};

/// Input source whose state is set directly by a test.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    actions: BTreeSet<String>,
    pointers: BTreeSet<PointerButton>,
    position: Vec2,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: &str) -> &mut Self {
        self.actions.insert(action.to_string());
        self
    }

    pub fn release(&mut self, action: &str) -> &mut Self {
        self.actions.remove(action);
        self
    }

    pub fn press_pointer(&mut self, button: PointerButton) -> &mut Self {
        self.pointers.insert(button);
        self
    }

    pub fn release_pointer(&mut self, button: PointerButton) -> &mut Self {
        self.pointers.remove(&button);
        self
    }

    pub fn move_pointer(&mut self, position: Vec2) -> &mut Self {
        self.position = position;
        self
    }
}

impl InputSource for ScriptedInput {
    fn action_pressed(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    fn pointer_pressed(&self, button: PointerButton) -> bool {
        self.pointers.contains(&button)
    }

    fn pointer_position(&self) -> Vec2 {
        self.position
    }
}
