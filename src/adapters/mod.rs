// Adapters layer: concrete storage backends for the engine.

pub mod storage;

pub use storage::{LocalStorage, MemoryStorage};
