use thiserror::Error;

/// Errors produced while building a symbol database.
///
/// `MalformedInput`, `Xml`, `Io` and `NoInput` abort the whole build.
/// `Declaration` is scoped to a single member declaration: the fragment
/// processor logs it and moves on unless strict mode is enabled.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Malformed fragment: {0}")]
    MalformedInput(String),

    #[error("Invalid declaration: {0}")]
    Declaration(String),

    #[error("No namespace fragments found in {0}")]
    NoInput(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
