//! File persistence for the CLI.
//!
//! A repository file holds `{"doc": <current document>, "repository":
//! {commits, head, options}}`. Writes go to a temporary file in the same
//! directory which then replaces the target, so an interrupted write never
//! leaves a truncated repository behind.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use jvc_ledger::{Repository, VersionedDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Deserialize)]
struct RepoFile {
    doc: Value,
    repository: Repository,
}

#[derive(Serialize)]
struct RepoFileRef<'a> {
    doc: &'a Value,
    repository: &'a Repository,
}

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
}

pub fn load_repo(path: &Path) -> anyhow::Result<VersionedDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading repository {}", path.display()))?;
    let file: RepoFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing repository {}", path.display()))?;
    debug!(path = %path.display(), commits = file.repository.len(), "loaded repository");
    Ok(VersionedDocument::load(file.doc, file.repository))
}

pub fn save_repo(path: &Path, vdoc: &VersionedDocument, pretty: bool) -> anyhow::Result<()> {
    let file = RepoFileRef {
        doc: vdoc.dump_doc(),
        repository: vdoc.dump(),
    };
    let text = if pretty {
        serde_json::to_string_pretty(&file)?
    } else {
        serde_json::to_string(&file)?
    };
    write_atomic(path, text.as_bytes())?;
    debug!(path = %path.display(), head = %vdoc.head(), "saved repository");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn render_json(value: &impl Serialize, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvc_ledger::CommitMeta;
    use jvc_types::DiffOptions;
    use serde_json::json;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.jvc.json");

        let mut vdoc = VersionedDocument::init(json!({"a": 1}), DiffOptions::default());
        vdoc.update(json!({"a": 2}), CommitMeta::message("bump")).unwrap();
        save_repo(&path, &vdoc, true).unwrap();

        let loaded = load_repo(&path).unwrap();
        assert_eq!(loaded, vdoc);

        let raw = read_json(&path).unwrap();
        assert_eq!(raw["doc"], json!({"a": 2}));
        assert_eq!(raw["repository"]["options"], json!({"idKey": "id"}));
    }

    #[test]
    fn overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.jvc.json");
        let vdoc = VersionedDocument::init(json!([1]), DiffOptions::default());
        save_repo(&path, &vdoc, false).unwrap();
        let other = VersionedDocument::init(json!([2]), DiffOptions::default());
        save_repo(&path, &other, false).unwrap();
        assert_eq!(load_repo(&path).unwrap().doc(), &json!([2]));
    }

    #[test]
    fn missing_and_malformed_files_fail_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = read_json(&missing).unwrap_err();
        assert!(err.to_string().contains("reading"));

        let bad = dir.path().join("bad.jvc.json");
        std::fs::write(&bad, "{\"doc\": 1}").unwrap();
        let err = load_repo(&bad).unwrap_err();
        assert!(err.to_string().contains("parsing repository"));
    }
}
