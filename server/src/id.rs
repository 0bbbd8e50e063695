//! Todo identifiers and the format they must follow.
//!
//! # Design
//! The service never assumes a concrete id shape. It asks an
//! `IdentifierValidator` whether a raw path segment is well formed before any
//! store lookup, which is what separates "malformed id" from "well-formed but
//! absent". The same capability mints ids for new records so that generated
//! and accepted ids always agree.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical identifier of a single todo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks and mints identifiers in the format of the backing store.
pub trait IdentifierValidator: Send + Sync {
    /// Returns the canonical id when `raw` is well formed.
    fn validate(&self, raw: &str) -> Option<TodoId>;

    /// Mints a fresh, never-reused id.
    fn generate(&self) -> TodoId;
}

/// Document-store style ids: 24 hex characters encoding 4 bytes of
/// big-endian epoch seconds followed by 8 random bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdFormat;

impl ObjectIdFormat {
    pub const LEN: usize = 24;
}

impl IdentifierValidator for ObjectIdFormat {
    fn validate(&self, raw: &str) -> Option<TodoId> {
        if raw.len() != Self::LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(TodoId(raw.to_ascii_lowercase()))
    }

    fn generate(&self) -> TodoId {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        let random = Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);

        TodoId(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_validate() {
        let format = ObjectIdFormat;
        let id = format.generate();
        assert_eq!(id.as_str().len(), ObjectIdFormat::LEN);
        assert_eq!(format.validate(id.as_str()), Some(id));
    }

    #[test]
    fn generated_ids_are_unique() {
        let format = ObjectIdFormat;
        let a = format.generate();
        let b = format.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn uppercase_is_canonicalized() {
        let id = ObjectIdFormat.validate("65A1B2C3D4E5F60718293A4B").unwrap();
        assert_eq!(id.as_str(), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        let format = ObjectIdFormat;
        assert!(format.validate("").is_none());
        assert!(format.validate("abc").is_none());
        assert!(format.validate("65a1b2c3d4e5f60718293a4b0").is_none());
        assert!(format.validate("65a1b2c3d4e5f60718293a4g").is_none());
        assert!(format.validate("00000000-0000-0000-0000-000000000000").is_none());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = ObjectIdFormat.validate("65a1b2c3d4e5f60718293a4b").unwrap();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, "65a1b2c3d4e5f60718293a4b");
    }
}
