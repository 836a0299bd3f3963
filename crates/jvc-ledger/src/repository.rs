use std::collections::BTreeMap;

use jvc_types::{CommitId, DiffOptions};
use serde::{Deserialize, Serialize};

use crate::commit::Commit;
use crate::error::{LedgerError, LedgerResult};

/// Commit store plus head pointer and diff options.
///
/// Serialized as `{commits, head, options}` with `commits` keyed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub commits: BTreeMap<CommitId, Commit>,
    pub head: CommitId,
    #[serde(default)]
    pub options: DiffOptions,
}

impl Repository {
    /// A repository holding only `root`, with head pointing at it.
    pub fn new(root: Commit, options: DiffOptions) -> Self {
        let head = root.id.clone();
        let mut commits = BTreeMap::new();
        commits.insert(head.clone(), root);
        Self {
            commits,
            head,
            options,
        }
    }

    pub fn get(&self, id: &CommitId) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.commits.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn head_commit(&self) -> Option<&Commit> {
        self.commits.get(&self.head)
    }

    /// Resolve a full id, or an abbreviation matching exactly one id as a
    /// prefix or as a suffix (the form [`CommitId::short_id`] prints).
    pub fn resolve(&self, abbrev: &str) -> Option<&Commit> {
        if let Some(commit) = self.commits.get(abbrev) {
            return Some(commit);
        }
        if abbrev.is_empty() {
            return None;
        }
        let mut matches = self.commits.values().filter(|c| {
            let id = c.id.as_str();
            id.starts_with(abbrev) || id.ends_with(abbrev)
        });
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Walk parent links starting at `from` (inclusive).
    ///
    /// Stops at the root, at a dangling parent, or after visiting as many
    /// commits as the repository holds, so a cyclic chain still terminates.
    pub fn ancestors(&self, from: &CommitId) -> Ancestors<'_> {
        Ancestors {
            repository: self,
            next: self.commits.get(from),
            remaining: self.commits.len(),
        }
    }

    /// Append `commit` and move head to it.
    pub(crate) fn push(&mut self, commit: Commit) {
        self.head = commit.id.clone();
        self.commits.insert(commit.id.clone(), commit);
    }

    /// Check the structural invariants of the chain:
    /// - head references a stored commit;
    /// - every commit is stored under its own id;
    /// - exactly one root, with an empty diff;
    /// - every other commit has a stored parent and a non-empty diff;
    /// - following parents from any commit reaches the root.
    pub fn validate(&self) -> LedgerResult<()> {
        if !self.contains(&self.head) {
            return Err(LedgerError::HeadNotFound(self.head.clone()));
        }

        let roots = self.commits.values().filter(|c| c.is_root()).count();
        if roots != 1 {
            return Err(LedgerError::RootCount(roots));
        }

        for (key, commit) in &self.commits {
            let violation = |reason: &str| LedgerError::IntegrityViolation {
                commit: commit.id.clone(),
                reason: reason.into(),
            };
            if *key != commit.id {
                return Err(violation("stored under a different id"));
            }
            match &commit.parent {
                None if !commit.diff.is_empty() => return Err(violation("root has a diff")),
                None => {}
                Some(parent) if !self.contains(parent) => {
                    return Err(violation("parent is missing"));
                }
                Some(_) if commit.diff.is_empty() => return Err(violation("empty diff")),
                Some(_) => {}
            }
            let reaches_root = self
                .ancestors(&commit.id)
                .last()
                .is_some_and(Commit::is_root);
            if !reaches_root {
                return Err(violation("parent chain does not reach the root"));
            }
        }

        Ok(())
    }
}

/// Iterator over a commit and its ancestors, newest first.
pub struct Ancestors<'a> {
    repository: &'a Repository,
    next: Option<&'a Commit>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Commit;

    fn next(&mut self) -> Option<&'a Commit> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current
            .parent
            .as_ref()
            .and_then(|p| self.repository.commits.get(p));
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitMeta;
    use jvc_types::{ChangeOp, ChangeSet, Timestamp};
    use serde_json::{json, Map};

    fn commit(id: &str, parent: Option<&str>) -> Commit {
        let diff = match parent {
            Some(_) => ChangeSet::from(vec![ChangeOp::delete("x".into())]),
            None => ChangeSet::new(),
        };
        Commit {
            id: CommitId::new(id),
            parent: parent.map(CommitId::new),
            diff,
            created_at: Timestamp::from_millis(0),
            metadata: Map::new(),
        }
    }

    fn chain() -> Repository {
        let mut repo = Repository::new(commit("r", None), DiffOptions::default());
        repo.push(commit("a", Some("r")));
        repo.push(commit("b", Some("a")));
        repo
    }

    #[test]
    fn push_moves_head() {
        let repo = chain();
        assert_eq!(repo.head, CommitId::new("b"));
        assert_eq!(repo.len(), 3);
        assert!(repo.validate().is_ok());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let repo = chain();
        let ids: Vec<&str> = repo.ancestors(&repo.head).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "r"]);
        assert_eq!(repo.ancestors(&CommitId::new("nope")).count(), 0);
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let mut repo = chain();
        repo.commits.insert(CommitId::new("r"), commit("r", Some("b")));
        assert_eq!(repo.ancestors(&repo.head).count(), 3);
        assert!(matches!(repo.validate(), Err(LedgerError::RootCount(0))));
    }

    #[test]
    fn resolve_abbreviations() {
        let mut repo = chain();
        repo.push(commit("abc", Some("b")));
        repo.push(commit("xyz", Some("abc")));
        assert_eq!(repo.resolve("b").map(|c| c.id.as_str()), Some("b"));
        assert_eq!(repo.resolve("ab").map(|c| c.id.as_str()), Some("abc"));
        assert_eq!(repo.resolve("yz").map(|c| c.id.as_str()), Some("xyz"));
        assert!(repo.resolve("q").is_none());
        assert!(repo.resolve("").is_none());

        repo.push(commit("bc", Some("xyz")));
        assert_eq!(repo.resolve("bc").map(|c| c.id.as_str()), Some("bc"));
        assert!(repo.resolve("c").is_none());
    }

    #[test]
    fn validate_rejects_dangling_head() {
        let mut repo = chain();
        repo.head = CommitId::new("gone");
        assert_eq!(repo.validate(), Err(LedgerError::HeadNotFound(CommitId::new("gone"))));
    }

    #[test]
    fn validate_rejects_missing_parent() {
        let mut repo = chain();
        repo.commits.insert(CommitId::new("o"), commit("o", Some("ghost")));
        assert!(matches!(
            repo.validate(),
            Err(LedgerError::IntegrityViolation { reason, .. }) if reason == "parent is missing"
        ));
    }

    #[test]
    fn validate_rejects_mislabelled_commit() {
        let mut repo = chain();
        repo.commits.insert(CommitId::new("k"), commit("a", Some("r")));
        assert!(matches!(
            repo.validate(),
            Err(LedgerError::IntegrityViolation { commit, .. }) if commit.as_str() == "a"
        ));
    }

    #[test]
    fn validate_rejects_empty_child_diff() {
        let mut repo = chain();
        let mut empty = commit("e", Some("b"));
        empty.diff = ChangeSet::new();
        repo.push(empty);
        assert!(repo.validate().is_err());
    }

    #[test]
    fn serde_shape() {
        let repo = Repository::new(Commit::root(CommitMeta::new()), DiffOptions::without_id_key());
        let value = serde_json::to_value(&repo).unwrap();
        assert_eq!(value["head"], json!(repo.head.as_str()));
        assert_eq!(value["options"], json!({"idKey": null}));
        assert!(value["commits"][repo.head.as_str()].is_object());

        let back: Repository = serde_json::from_value(value).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn missing_options_default_to_id() {
        let repo: Repository = serde_json::from_value(json!({
            "commits": {"r": {"id": "r", "parent": null, "diff": [], "createdAt": 0}},
            "head": "r"
        }))
        .unwrap();
        assert_eq!(repo.options.id_key(), Some("id"));
        assert!(repo.validate().is_ok());
    }
}
