mod error;
mod save_backend;
mod save_record;

pub use error::PersistenceError;
pub use save_backend::{load_entity, save_entity, MemoryBackend, SaveBackend};
pub use save_record::SaveRecord;

cfg_if! {
    if #[cfg(not(target_arch = "wasm32"))] {
        pub use save_backend::FileBackend;
    }
}
