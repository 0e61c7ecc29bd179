//! Unique test data, ULID-backed so parallel test runs never collide.

use ulid::Ulid;

/// A unique string in the format `{prefix}-{ulid}`.
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A unique email address in the format `{prefix}-{ulid}@example.test`.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new())
}
