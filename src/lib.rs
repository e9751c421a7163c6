//! `brconf`: a format-preserving editor for brace-delimited hierarchical
//! configuration files (SPEC_FULL.md §1–§2).
//!
//! The public surface is the engine: [`lexer::parse`] a byte slice into a
//! [`node::Tree`], apply [`merge`], [`remove`], or [`filter`] against a
//! [`path::PathExpr`], run [`reindent::materialize`] to fill in trivia for
//! anything the edit touched, then [`writer::emit`] it back out. [`io`]
//! and [`cli`] are the file-I/O and argument-parsing collaborators the
//! binary is built from; they only ever reach the engine through this API.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod escape;
pub mod filter;
pub mod io;
pub mod lexer;
pub mod merge;
pub mod node;
pub mod path;
pub mod reindent;
pub mod remove;
pub mod writer;

pub use config::SyntaxConfig;
pub use error::{Error, Result};
pub use node::{NodeId, Tree};
