//! Patcher for JVC.
//!
//! Replays an ordered change list against a document. The patcher depends
//! only on the change-op model in `jvc-types`; it never consults the differ
//! or the id-key configuration.
//!
//! # Key Items
//!
//! - [`patch`] -- Apply a [`ChangeSet`] to an owned document
//! - [`patch_in_place`] -- Apply ops to a borrowed document
//! - [`patch_json`] -- Decode an untrusted change list, then apply it
//! - [`apply_array_ops`] -- The live/pre-image array step
//!
//! [`ChangeSet`]: jvc_types::ChangeSet

pub mod error;
pub mod patcher;

pub use error::{PatchError, PatchResult};
pub use patcher::{apply_array_ops, patch, patch_in_place, patch_json};
