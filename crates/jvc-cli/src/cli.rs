use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jvc",
    about = "JSON version control: structural diff, patch, and document history",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository file (default: doc.jvc.json)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// TOML configuration file (default: jvc.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the change list between two JSON files
    Diff(DiffArgs),
    /// Apply a change list to a JSON file
    Patch(PatchArgs),
    /// Start a repository tracking a JSON file
    Init(InitArgs),
    /// Record a new version of the document
    Commit(CommitArgs),
    /// Make an earlier version current again
    Restore(RestoreArgs),
    /// Show commit history
    Log(LogArgs),
    /// Print the document as of a commit
    Show(ShowArgs),
    /// Print the current document
    Cat,
    /// Check repository integrity
    Verify,
}

/// Id-key selection shared by commands that diff.
#[derive(Args, Clone, Debug, Default)]
pub struct IdKeyArgs {
    /// Field that identifies array elements across positions
    #[arg(long, conflicts_with = "no_id_key")]
    pub id_key: Option<String>,
    /// Disable identity matching of array elements
    #[arg(long)]
    pub no_id_key: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub before: PathBuf,
    pub after: PathBuf,
    #[command(flatten)]
    pub id: IdKeyArgs,
}

#[derive(Args)]
pub struct PatchArgs {
    pub changes: PathBuf,
    pub doc: PathBuf,
}

#[derive(Args)]
pub struct InitArgs {
    pub doc: PathBuf,
    #[command(flatten)]
    pub id: IdKeyArgs,
    /// Overwrite an existing repository file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CommitArgs {
    pub doc: PathBuf,
    #[arg(short, long)]
    pub message: Option<String>,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Commit id, or an unambiguous prefix or suffix of one
    pub commit: String,
    #[arg(short, long)]
    pub message: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Commit id, or an unambiguous prefix or suffix of one
    pub commit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["jvc", "diff", "a.json", "b.json", "--id-key", "key"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.before, PathBuf::from("a.json"));
            assert_eq!(args.after, PathBuf::from("b.json"));
            assert_eq!(args.id.id_key, Some("key".into()));
            assert!(!args.id.no_id_key);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn id_key_flags_conflict() {
        assert!(Cli::try_parse_from(["jvc", "diff", "a", "b", "--id-key", "k", "--no-id-key"]).is_err());
    }

    #[test]
    fn parse_patch() {
        let cli = Cli::try_parse_from(["jvc", "patch", "changes.json", "doc.json"]).unwrap();
        assert!(matches!(cli.command, Command::Patch(_)));
    }

    #[test]
    fn parse_init_no_id_key() {
        let cli = Cli::try_parse_from(["jvc", "init", "doc.json", "--no-id-key", "--force"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(args.id.no_id_key);
            assert!(args.force);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_commit() {
        let cli = Cli::try_parse_from(["jvc", "commit", "doc.json", "-m", "hello"]).unwrap();
        if let Command::Commit(args) = cli.command {
            assert_eq!(args.message, Some("hello".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_restore() {
        let cli = Cli::try_parse_from(["jvc", "restore", "0190abcd"]).unwrap();
        if let Command::Restore(args) = cli.command {
            assert_eq!(args.commit, "0190abcd");
            assert_eq!(args.message, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_log_oneline() {
        let cli = Cli::try_parse_from(["jvc", "log", "--oneline", "-n", "5"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert!(args.oneline);
            assert_eq!(args.limit, 5);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_cat_and_verify() {
        assert!(matches!(Cli::try_parse_from(["jvc", "cat"]).unwrap().command, Command::Cat));
        assert!(matches!(Cli::try_parse_from(["jvc", "verify"]).unwrap().command, Command::Verify));
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "jvc", "--verbose", "--format", "json", "--repo", "x.jvc.json", "log",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.repo, Some(PathBuf::from("x.jvc.json")));
    }
}
