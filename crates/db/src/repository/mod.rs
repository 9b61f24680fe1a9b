//! Repository functions, one function per database operation.
//!
//! Every function takes a `&PgPool` and returns a `Result<T, DbError>`.
//! Input is validated before any SQL is built.

pub mod companies;
pub mod jobs;
