//! Centralized default constants for the Omni Notes sync layer.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// AUTOSAVE
// =============================================================================

/// Stage 1 debounce: quiet period after the last keystroke before an edit
/// burst counts as settled.
pub const AUTOSAVE_SETTLE_MS: u64 = 300;

/// Stage 2 debounce: quiet period after the last settled edit before the save
/// request is actually issued.
pub const AUTOSAVE_QUIET_MS: u64 = 5000;

// =============================================================================
// LOCAL BACKEND
// =============================================================================

/// Storage key for the serialized notes collection.
pub const NOTES_STORAGE_KEY: &str = "omni_notes_data";

/// Storage key for the serialized catalogs collection.
pub const CATALOGS_STORAGE_KEY: &str = "omni_catalogs_data";

/// Simulated latency for local list queries (milliseconds).
pub const LOCAL_LIST_LATENCY_MS: u64 = 400;

/// Simulated latency for local single-entity reads (milliseconds).
pub const LOCAL_GET_LATENCY_MS: u64 = 200;

/// Simulated latency for local creates (milliseconds).
pub const LOCAL_CREATE_LATENCY_MS: u64 = 400;

/// Simulated latency for local updates and deletes (milliseconds).
pub const LOCAL_WRITE_LATENCY_MS: u64 = 300;

/// Simulated latency for inline attachment encoding (milliseconds).
pub const LOCAL_UPLOAD_LATENCY_MS: u64 = 800;

// =============================================================================
// REMOTE BACKEND
// =============================================================================

/// Default base URL for the remote REST API.
pub const API_BASE_URL: &str = "http://localhost:7200";

// =============================================================================
// STORE
// =============================================================================

/// Name of the catalog auto-created when the remote backend has none.
pub const DEFAULT_CATALOG_NAME: &str = "Inbox";

/// Capacity of the store event broadcast channel.
pub const STORE_EVENT_CAPACITY: usize = 64;

// =============================================================================
// FORM
// =============================================================================

/// Default accent color for new notes.
pub const DEFAULT_THEME_COLOR: &str = "#6366f1";
