use std::path::{Path, PathBuf};

use anyhow::Context;
use jvc_types::DiffOptions;
use serde::{Deserialize, Serialize};

use crate::cli::IdKeyArgs;

pub const DEFAULT_CONFIG_FILE: &str = "jvc.toml";
pub const DEFAULT_REPO_FILE: &str = "doc.jvc.json";

/// Settings read from `jvc.toml`. Command-line flags take precedence.
///
/// ```toml
/// id_key = "key"      # "" disables identity matching
/// repo = "data.jvc.json"
/// pretty = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub id_key: Option<String>,
    pub repo: Option<PathBuf>,
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            id_key: None,
            repo: None,
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Read `explicit` if given, else `jvc.toml` in the working directory if
    /// it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Repository file: the flag, then the config, then the default.
    pub fn repo_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.repo.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPO_FILE))
    }

    /// Diff options: the flags, then the config, then `"id"`.
    pub fn diff_options(&self, flags: &IdKeyArgs) -> DiffOptions {
        if flags.no_id_key {
            return DiffOptions::without_id_key();
        }
        match flags.id_key.as_deref().or(self.id_key.as_deref()) {
            Some("") => DiffOptions::without_id_key(),
            Some(key) => DiffOptions::with_id_key(key),
            None => DiffOptions::default(),
        }
    }
}
