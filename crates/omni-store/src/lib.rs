//! # omni-store
//!
//! The reactive layer of Omni Notes: the [`NoteStore`] cache and CRUD
//! orchestrator, the [`NoteFormState`] editor state, the [`EditSession`]
//! binding a form to the store, and the [`AutosavePipeline`] persisting
//! in-progress edits behind a two-stage debounce.

pub mod autosave;
pub mod form;
pub mod session;
pub mod store;

pub use autosave::{AutosaveConfig, AutosaveEvent, AutosavePipeline, SaveTarget};
pub use form::{NoteFormState, Priority, SubType};
pub use session::EditSession;
pub use store::NoteStore;
