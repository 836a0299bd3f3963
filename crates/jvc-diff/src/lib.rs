//! Structural differ for JVC.
//!
//! Computes the ordered list of [`ChangeOp`]s that turns one JSON document
//! into another. Mappings are compared key by key, scalars by strict
//! equality, and arrays by an edit-distance alignment that recognises moved
//! elements.
//!
//! # Key Types
//!
//! - [`Differ`] -- Configured differ (carries the [`DiffOptions`])
//! - [`IdentityResolver`] -- "Same element?" rule used inside array alignment
//! - [`diff`] -- One-shot convenience over [`Differ::diff`]
//!
//! [`ChangeOp`]: jvc_types::ChangeOp
//! [`DiffOptions`]: jvc_types::DiffOptions

pub mod array_diff;
pub mod differ;
pub mod identity;

pub use differ::{diff, Differ};
pub use identity::{is_scalar, strict_eq, IdentityResolver};
