//! Reverse-delta commit chain for JVC.
//!
//! A [`VersionedDocument`] owns the current document and a [`Repository`] of
//! commits. Each commit stores the change list that turns the document as of
//! that commit back into the document as of its parent, so the newest state
//! is kept whole and every older state is reached by walking towards the
//! root and patching on the way.
//!
//! - [`Commit`] / [`CommitMeta`] -- Commit record and caller-supplied metadata
//! - [`Repository`] -- Commit map, head pointer, diff options, validation
//! - [`VersionedDocument`] -- `init`, `load`, `update`, `restore`, `checkout`, `history`

pub mod commit;
pub mod document;
pub mod error;
pub mod repository;

pub use commit::{Commit, CommitMeta, RESERVED_KEYS};
pub use document::VersionedDocument;
pub use error::{LedgerError, LedgerResult};
pub use repository::{Ancestors, Repository};
