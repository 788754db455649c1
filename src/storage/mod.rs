//! Persistence: flat record types, the SQLite backend, and the CSV backend.

pub mod csv;
pub mod models;
pub mod queries;
pub mod schema;

pub use schema::SyncDatabase;
