//! File I/O for native CLI

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use inkmark_core::{AnnotatorConfig, Document, SimplifiedSnapshot, Snapshot};

/// Sidecar holding the annotations of `path`: `<file>.annotations.json`
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".annotations.json");
    PathBuf::from(name)
}

/// Load a tagged markdown file, plus its annotations sidecar when present
pub fn load_file(path: &Path) -> Result<Document> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;

    let markdown = fs::read_to_string(&canonical)
        .with_context(|| format!("Failed to read file: {}", canonical.display()))?;

    let filepath = canonical.to_string_lossy().to_string();
    let title = canonical
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    let sidecar = sidecar_path(&canonical);
    if !sidecar.exists() {
        return Ok(Document::with_file_info(title, markdown, filepath));
    }

    let snapshot = read_snapshot(&sidecar)?;
    let mut doc = Document::from_parts(
        title,
        markdown,
        snapshot.annotations,
        snapshot.created_at,
        snapshot.updated_at,
    );
    doc.filepath = Some(filepath);

    let orphaned = doc.orphaned_annotations().len();
    if orphaned > 0 {
        tracing::warn!(target: "inkmark::persist", orphaned, path = %canonical.display(), "annotations without a mark");
    }
    Ok(doc)
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Snapshot::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the tagged text back to its file and the snapshot to the sidecar
pub fn save_document(doc: &Document, snapshot: &Snapshot) -> Result<()> {
    let path = doc
        .filepath
        .as_deref()
        .map(PathBuf::from)
        .context("Document has no file path")?;

    fs::write(&path, doc.markdown())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let sidecar = sidecar_path(&path);
    let json = snapshot.to_json().context("Failed to serialize snapshot")?;
    fs::write(&sidecar, json)
        .with_context(|| format!("Failed to write {}", sidecar.display()))?;

    tracing::debug!(target: "inkmark::persist", path = %sidecar.display(), "snapshot saved");
    Ok(())
}

/// Get the ~/.inkmark directory path, creating it if needed
pub fn inkmark_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let inkmark_dir = home.join(".inkmark");

    if !inkmark_dir.exists() {
        fs::create_dir_all(&inkmark_dir)
            .with_context(|| format!("Failed to create {}", inkmark_dir.display()))?;
    }

    Ok(inkmark_dir)
}

/// Load settings from `path`, or from ~/.inkmark/config.json when it exists
pub fn load_config(path: Option<&Path>) -> Result<AnnotatorConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match dirs::home_dir() {
            Some(home) => home.join(".inkmark").join("config.json"),
            None => return Ok(AnnotatorConfig::default()),
        },
    };
    if !path.exists() {
        return Ok(AnnotatorConfig::default());
    }

    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    AnnotatorConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

/// Export document snapshot, to ~/.inkmark/<title>.json unless `out` is given
pub fn export_document(
    doc: &Document,
    config: &AnnotatorConfig,
    out: Option<PathBuf>,
    simplified: bool,
) -> Result<PathBuf> {
    let export_path = match out {
        Some(path) => path,
        None => inkmark_dir()?.join(format!("{}.json", doc.title)),
    };

    let json = if simplified {
        SimplifiedSnapshot::from_document(doc, &config.snapshot_version).to_json()
    } else {
        Snapshot::from_document(doc, &config.snapshot_version).to_json()
    }
    .context("Failed to serialize document")?;

    fs::write(&export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    Ok(export_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/notes.md")),
            PathBuf::from("/tmp/notes.md.annotations.json")
        );
    }
}
