mod catalog;
mod file_store;
mod key_value;
mod memory_store;
mod saved_recording;

pub use {
    catalog::{CATALOG_KEY, RecordingCatalog},
    file_store::FileStore,
    key_value::KeyValueStore,
    memory_store::MemoryStore,
    saved_recording::SavedRecording,
};
