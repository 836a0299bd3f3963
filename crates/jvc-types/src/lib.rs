//! Foundation types for JVC (JSON version control).
//!
//! This crate provides the data model shared by the differ, the patcher and
//! the commit ledger. Every other JVC crate depends on `jvc-types`.
//!
//! # Key Types
//!
//! - [`DocPath`] -- Dotted location inside a document, plus the `get`/`put`/`delete` accessors
//! - [`ChangeOp`] / [`ArrayOp`] -- A single typed edit of a document
//! - [`ChangeSet`] -- An ordered list of change ops (the unit stored on a commit)
//! - [`DiffOptions`] -- Array identity configuration (`idKey`)
//! - [`CommitId`] -- Opaque commit identifier (UUID v7 when generated)
//! - [`Timestamp`] -- Wall-clock milliseconds

pub mod change;
pub mod error;
pub mod id;
pub mod options;
pub mod path;
pub mod temporal;

pub use change::{ArrayOp, ChangeOp, ChangeSet};
pub use error::TypeError;
pub use id::CommitId;
pub use options::DiffOptions;
pub use path::DocPath;
pub use temporal::Timestamp;
