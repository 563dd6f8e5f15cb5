pub mod collection;
pub mod id;
pub mod kv;
pub mod library;

pub use collection::{HistoryItem, SavedItem};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use library::{Library, Limits};
