//! Startup errors.

use thiserror::Error;
use trackem_core::TrackemError;
use trackem_db::DbError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("could not connect: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error(transparent)]
    Domain(#[from] TrackemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
