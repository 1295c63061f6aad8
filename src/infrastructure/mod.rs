//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! - [`database`] - PostgreSQL bootstrap (database creation, pool, migrations)
//! - [`persistence`] - URL repository implementations

pub mod database;
pub mod persistence;
