use jvc_diff::Differ;
use jvc_patch::patch;
use jvc_types::{CommitId, DiffOptions};
use serde_json::Value;
use tracing::debug;

use crate::commit::{Commit, CommitMeta};
use crate::error::{LedgerError, LedgerResult};
use crate::repository::Repository;

/// A document together with its commit history.
///
/// `doc` is always the document as of `repository.head`. Mutators append at
/// most one commit and update `doc` and head together after the commit is
/// stored, so a failed call leaves the document untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionedDocument {
    doc: Value,
    repository: Repository,
}

impl VersionedDocument {
    /// Start a history for `doc` with a single root commit.
    pub fn init(doc: Value, options: DiffOptions) -> Self {
        let root = Commit::root(CommitMeta::new());
        debug!(root = %root.id, "initialized document history");
        Self {
            doc,
            repository: Repository::new(root, options),
        }
    }

    /// Attach a previously dumped document and repository as-is.
    ///
    /// Nothing is recomputed or checked; call [`Repository::validate`] first
    /// when the pair comes from an untrusted source.
    pub fn load(doc: Value, repository: Repository) -> Self {
        Self { doc, repository }
    }

    pub fn doc(&self) -> &Value {
        &self.doc
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn head(&self) -> &CommitId {
        &self.repository.head
    }

    pub fn options(&self) -> &DiffOptions {
        &self.repository.options
    }

    /// The configured id key, `None` when identity matching is disabled.
    pub fn id_key(&self) -> Option<&str> {
        self.repository.options.id_key()
    }

    /// Change the id key used by later commits. Stored diffs are unaffected.
    pub fn set_id_key(&mut self, id_key: Option<String>) {
        self.repository.options.id_key = id_key;
    }

    /// Record `new_doc` as the current state.
    ///
    /// Returns the new head, or `None` when `new_doc` equals the current
    /// document and nothing was committed.
    pub fn update(&mut self, new_doc: Value, meta: CommitMeta) -> Option<CommitId> {
        if new_doc == self.doc {
            return None;
        }

        let differ = Differ::new(self.repository.options.clone());
        let reverse = differ.diff(&new_doc, &self.doc);
        if reverse.is_empty() {
            return None;
        }

        let commit = Commit::child(self.repository.head.clone(), reverse, meta);
        let id = commit.id.clone();
        debug!(
            commit = %id,
            parent = %self.repository.head,
            changes = commit.diff.len(),
            "committed"
        );
        self.repository.push(commit);
        self.doc = new_doc;
        Some(id)
    }

    /// The document as it was at `commit_id`.
    ///
    /// Walks from head towards the root, replaying each reverse delta, until
    /// `commit_id` is reached. Fails with [`LedgerError::CommitNotFound`] when
    /// the id is absent or not an ancestor of head.
    pub fn checkout(&self, commit_id: &CommitId) -> LedgerResult<Value> {
        if !self.repository.contains(commit_id) {
            return Err(LedgerError::CommitNotFound(commit_id.clone()));
        }

        let mut working = self.doc.clone();
        for (steps, commit) in self.repository.ancestors(&self.repository.head).enumerate() {
            if commit.id == *commit_id {
                debug!(target_commit = %commit_id, steps, "reconstructed document");
                return Ok(working);
            }
            working = patch(&commit.diff, working)?;
        }

        Err(LedgerError::CommitNotFound(commit_id.clone()))
    }

    /// Make the document as of `commit_id` the current state again.
    ///
    /// History is never rewritten: the restored state is appended as a new
    /// commit on top of head. Returns that commit's id, or `None` when the
    /// target state equals the current one.
    pub fn restore(
        &mut self,
        commit_id: &CommitId,
        meta: CommitMeta,
    ) -> LedgerResult<Option<CommitId>> {
        let restored = self.checkout(commit_id)?;
        debug!(target_commit = %commit_id, "restoring");
        Ok(self.update(restored, meta))
    }

    /// Commits from head back to the root.
    pub fn history(&self) -> Vec<&Commit> {
        self.repository.ancestors(&self.repository.head).collect()
    }

    pub fn dump(&self) -> &Repository {
        &self.repository
    }

    pub fn dump_doc(&self) -> &Value {
        &self.doc
    }

    pub fn into_parts(self) -> (Value, Repository) {
        (self.doc, self.repository)
    }
}
