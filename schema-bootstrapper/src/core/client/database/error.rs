use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

use super::constant::{
    DUPLICATE_KEY_CODE, INDEX_KEY_SPECS_CONFLICT_CODE, INDEX_OPTIONS_CONFLICT_CODE, NAMESPACE_NOT_FOUND_CODE,
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to reach the database: {0}")]
    ConnectionError(String),

    #[error("Index on collection {collection} conflicts with an existing index: {message}")]
    IndexConflict { collection: String, message: String },

    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),
}

impl DatabaseError {
    /// Maps a driver error raised while working on `collection` onto the bootstrap taxonomy.
    /// Anything that is neither a connectivity problem nor an index clash stays a `MongoError`.
    pub fn from_mongo(collection: &str, err: mongodb::error::Error) -> Self {
        let classified = match err.kind.as_ref() {
            ErrorKind::ServerSelection { message, .. } => Some(Self::ConnectionError(message.clone())),
            ErrorKind::DnsResolve { message, .. } => Some(Self::ConnectionError(message.clone())),
            ErrorKind::Io(io_err) => Some(Self::ConnectionError(io_err.to_string())),
            ErrorKind::Command(command_err)
                if command_err.code == INDEX_OPTIONS_CONFLICT_CODE
                    || command_err.code == INDEX_KEY_SPECS_CONFLICT_CODE =>
            {
                Some(Self::IndexConflict { collection: collection.to_string(), message: command_err.message.clone() })
            }
            _ => None,
        };
        classified.unwrap_or_else(|| Self::MongoError(err))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

pub fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command_err) if command_err.code == NAMESPACE_NOT_FOUND_CODE)
}

/// Returns true when `err` is a unique index violation on a single write.
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command_err) => command_err.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
