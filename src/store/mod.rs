//! Persistence layer — libSQL-backed storage for profiles, campaigns and
//! performance metrics.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::Database;
