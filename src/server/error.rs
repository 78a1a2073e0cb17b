//! Error types for the file server.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur while configuring or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The directory to serve does not exist.
    #[error("Specified directory {} doesn't exist", .0.display())]
    RootNotFound(PathBuf),

    /// The path to serve exists but is not a directory.
    #[error("Specified path {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    /// The listing template failed to compile or render.
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),
}
