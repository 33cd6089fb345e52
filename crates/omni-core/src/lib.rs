//! # omni-core
//!
//! Core types, traits, and abstractions for the Omni Notes data
//! synchronization layer.
//!
//! This crate provides the canonical note shape, the open metadata mapping,
//! the backend traits the persistence adapters implement, and the shared
//! error/configuration/event types the other crates depend on.

pub mod config;
pub mod defaults;
pub mod error;
pub mod events;
pub mod ids;
pub mod metadata;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::AppConfig;
pub use error::{Error, Result};
pub use events::{StoreEvent, StoreEventBus};
pub use ids::generate_id;
pub use metadata::{
    list_value, metadata_from_json, metadata_to_json, number_value, text_value, Metadata,
    MetadataValue,
};
pub use models::{Attachment, Catalog, FilterPatch, FilterState, Note, NoteType};
pub use traits::{
    AttachmentBackend, CatalogBackend, CatalogChanges, NewNote, NoteBackend, NoteChanges,
    TagSuggester, UploadFile,
};
