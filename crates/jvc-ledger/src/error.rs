use jvc_patch::PatchError;
use jvc_types::CommitId;

/// Errors produced by commit-chain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The commit is absent, or is not an ancestor of head.
    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    #[error("head {0} does not reference a commit")]
    HeadNotFound(CommitId),

    #[error("repository has {0} root commits, expected exactly one")]
    RootCount(usize),

    #[error("integrity violation at commit {commit}: {reason}")]
    IntegrityViolation { commit: CommitId, reason: String },

    /// A stored diff could not be replayed.
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),
}

/// Convenience alias for ledger results.
pub type LedgerResult<T> = Result<T, LedgerError>;
