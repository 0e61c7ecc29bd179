//! Test support utilities for database-backed test suites: fixture
//! transactions, unique test data, and a preconfigured Postgres client.

pub mod fixtures;
pub mod postgres;
pub mod test_logging;
pub mod unique;

pub use fixtures::with_fixtures;
pub use postgres::test_postgres;
pub use unique::{unique_email, unique_str};
