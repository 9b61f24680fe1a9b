//! `db` crate: persistence layer for companies and jobs.
//!
//! Provides a connection pool, typed row structs, the SQL fragment builders
//! used for partial updates and filtered listings, and one repository module
//! per table.

pub mod error;
pub mod filters;
pub mod models;
pub mod pool;
pub mod repository;
pub mod sql;
pub mod validate;

pub use error::DbError;
pub use filters::{CompanyFilter, JobFilter};
pub use pool::DbPool;
