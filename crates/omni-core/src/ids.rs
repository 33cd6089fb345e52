//! Identifier generation for notes, catalogs, and attachments.

use uuid::Uuid;

/// Generate a globally unique identifier (random UUIDv4).
///
/// Ids are assigned client-side before the first persistence call so that a
/// draft keeps the same id across navigation and the eventual create.
pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}
