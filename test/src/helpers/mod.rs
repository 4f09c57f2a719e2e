pub mod scripted_input;
pub mod test_session;

pub use scripted_input::ScriptedInput;
pub use test_session::{StepEvents, TestSession};
