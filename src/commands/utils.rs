use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use webpresenter::daemon::DaemonClient;
use webpresenter::dom::{Document, MemoryDocument, NodeId, Snapshot};
use webpresenter::store::JsonFileStore;
use webpresenter::types::Viewport;

/// Require the background service for commands that talk to it
pub fn require_daemon() -> Result<()> {
    if !DaemonClient::is_daemon_running() {
        eprintln!("Error: The daemon is not running.");
        eprintln!("Start the daemon with: webpresenter daemon start");
        return Err(anyhow::anyhow!("Daemon not running"));
    }
    Ok(())
}

/// Store at `path`, or the default `~/.webpresenter/slides.json`
pub fn open_store(path: Option<PathBuf>) -> Result<JsonFileStore> {
    match path {
        Some(path) => Ok(JsonFileStore::new(path)),
        None => JsonFileStore::open_default(),
    }
}

/// Load a page snapshot, optionally resizing its viewport ("WIDTHxHEIGHT")
pub fn load_snapshot(path: &Path, viewport: Option<&str>) -> Result<MemoryDocument> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {:?}", path))?;
    let mut snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Snapshot {:?} is not valid", path))?;

    if let Some(viewport) = viewport {
        let size = Viewport::parse(viewport)?;
        snapshot.viewport.width = size.width;
        snapshot.viewport.height = size.height;
    }
    Ok(MemoryDocument::from_snapshot(&snapshot))
}

/// The `index`-th element (first by default) matching `selector`
pub fn locate(doc: &MemoryDocument, selector: &str, index: Option<usize>) -> Result<NodeId> {
    let matches = doc.query_selector_all(doc.root(), selector)?;
    debug!("{} element(s) match {:?}", matches.len(), selector);

    let index = index.unwrap_or(0);
    match matches.get(index) {
        Some(&node) => Ok(node),
        None if matches.is_empty() => {
            anyhow::bail!("No element matches selector: {}", selector)
        }
        None => anyhow::bail!(
            "No element matches selector: {} at index {} ({} found)",
            selector,
            index,
            matches.len()
        ),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
