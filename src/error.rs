//! Discriminated error types for every engine component (SPEC_FULL.md §7).
//!
//! Each component gets its own small enum so callers can match on exactly what
//! went wrong; [`Error`] unifies them for code that just wants to propagate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading a byte from the lexer's source, with a byte offset
/// into the stream where it was first noticed.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("premature end of file at byte {offset} while inside a quoted string")]
    PrematureEofInQuote { offset: u64 },

    #[error("premature end of file at byte {offset} while inside a /* */ comment")]
    UnterminatedComment { offset: u64 },
}

/// Failure while parsing a dotted path expression (`a.b.c` or `a.b=v`).
#[derive(Debug, Error)]
pub enum PathError {
    #[error("empty segment in path expression `{expr}`")]
    EmptySegment { expr: String },

    #[error("unterminated escape sequence at end of path expression `{expr}`")]
    UnterminatedEscape { expr: String },

    #[error("path expression `{expr}` must not specify a value")]
    ValueSpecified { expr: String },
}

/// Failure while merging a path-derived chain into the tree.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot replace container node `{name}` with a leaf value")]
    TypeConflict { name: String },
}

/// Failure while removing a path-derived chain from the tree.
#[derive(Debug, Error)]
pub enum RemoveError {
    #[error("path to remove must not specify a value: `{expr}`")]
    ValueSpecified { expr: String },
}

/// Failure while applying a filter chain.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter path must not specify a value: `{expr}`")]
    ValueSpecified { expr: String },
}

/// File I/O and locking failures, always tagged with the offending path.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot fsync {path}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot replace {path}: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to create temporary file next to {path}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The crate's unified error type. Every fallible public entry point returns
/// `Result<T, Error>`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Remove(#[from] RemoveError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;
