//! Common record metadata embedded in domain models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier/timestamp triple shared by most data models. Field storage
/// only; uniqueness and monotonicity are enforced by the storage engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// Date at which the record was created.
    pub created_at: OffsetDateTime,
    /// Date at which the record was last updated. Empty on creation.
    pub updated_at: Option<OffsetDateTime>,
}

impl Metadata {
    pub fn new(id: Uuid, created_at: OffsetDateTime, updated_at: Option<OffsetDateTime>) -> Self {
        Self {
            id,
            created_at,
            updated_at,
        }
    }

    /// Metadata for a record created right now.
    pub fn create(id: Uuid) -> Self {
        Self {
            id,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn new_stores_the_triple() {
        let id = Uuid::new_v4();
        let created = datetime!(2026-01-02 03:04:05 UTC);
        let updated = datetime!(2026-02-02 03:04:05 UTC);

        let metadata = Metadata::new(id, created, Some(updated));
        assert_eq!(metadata.id, id);
        assert_eq!(metadata.created_at, created);
        assert_eq!(metadata.updated_at, Some(updated));
    }

    #[test]
    fn create_leaves_updated_at_empty() {
        let metadata = Metadata::create(Uuid::new_v4());
        assert!(metadata.updated_at.is_none());
    }
}
