mod input_manager;
mod input_source;
mod input_state;
mod press_state;

pub use input_manager::{InputManager, ModalTracker, NoModals};
pub use input_source::InputSource;
pub use input_state::{InputMode, InputState, InputUpdateType, PointerButton};
pub use press_state::PressState;
