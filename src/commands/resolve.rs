use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::commands::utils;
use webpresenter::dom::MemoryDocument;
use webpresenter::geometry::bounding_rect;
use webpresenter::resolver::{fold_candidates, resolve_path, resolve_selector};
use webpresenter::types::{OutputFormat, Rect};

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    /// Selector for the node alone, relative to its parent
    pub selector: String,
    /// Per-level selectors, innermost first
    pub path: Vec<String>,
    /// Selectors ranked from most specific to broadest
    pub candidates: Vec<String>,
    pub rect: Rect,
}

pub fn resolve_report(
    doc: &MemoryDocument,
    target: &str,
    index: Option<usize>,
) -> Result<ResolveReport> {
    let node = utils::locate(doc, target, index)?;
    let path = resolve_path(doc, node, None);

    Ok(ResolveReport {
        selector: resolve_selector(doc, node),
        candidates: fold_candidates(&path)
            .into_iter()
            .map(|candidate| candidate.selector)
            .collect(),
        path: path.into_iter().map(|segment| segment.selector).collect(),
        rect: bounding_rect(doc, node, None),
    })
}

pub fn handle_resolve(
    snapshot: &Path,
    target: &str,
    index: Option<usize>,
    viewport: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("Resolving {} in {:?}", target, snapshot);
    let doc = utils::load_snapshot(snapshot, viewport)?;
    let report = resolve_report(&doc, target, index)?;

    match format {
        OutputFormat::Json => utils::print_json(&report)?,
        OutputFormat::Simple => {
            println!("{}", report.selector);
            for (i, candidate) in report.candidates.iter().enumerate() {
                println!("  [{}] {}", i, candidate);
            }
            println!(
                "  at ({}, {}) {}x{}px",
                report.rect.left, report.rect.top, report.rect.width, report.rect.height
            );
        }
    }
    Ok(())
}
