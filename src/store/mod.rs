//! Session-scoped persistence for completed wizard steps.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{StepPayload, StepStore, storage_key};
