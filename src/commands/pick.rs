use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

use crate::commands::utils;
use webpresenter::daemon::{Daemon, DaemonRequest, DaemonResponse};
use webpresenter::dom::{MemoryDocument, PointerEvent};
use webpresenter::host::ContentHost;
use webpresenter::messaging::Request;
use webpresenter::store::SlideStore;
use webpresenter::types::{OutputFormat, Slide};

/// Choices made on the picker panel
#[derive(Debug, Default)]
pub struct PickOptions {
    pub choose: usize,
    pub name: Option<String>,
    pub commit: bool,
}

#[derive(Debug, Serialize)]
pub struct PickReport {
    pub candidates: Vec<String>,
    pub chosen: usize,
    pub selector: String,
    /// Present once the slide has been committed and stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide: Option<Slide>,
}

/// Run one picker session: start, click the target, choose, then commit
pub fn run_pick(
    doc: MemoryDocument,
    target: &str,
    index: Option<usize>,
    options: PickOptions,
    store: &dyn SlideStore,
) -> Result<PickReport> {
    let node = utils::locate(&doc, target, index)?;
    let slides = store.get()?;
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let mut host = ContentHost::new(doc, slides, outbox);

    host.start_picker();
    host.handle_pointer(PointerEvent::click(node));

    let candidates = host
        .picker()
        .map(|picker| picker.candidates().to_vec())
        .unwrap_or_default();
    if candidates.is_empty() {
        host.quit_picker();
        anyhow::bail!("No selector could be derived for {}", target);
    }

    let selector = host
        .select_candidate(options.choose)
        .context("Failed to choose candidate")?;
    if let Some(name) = &options.name {
        host.set_display_name(name)?;
    }

    let mut slide = None;
    if options.commit {
        host.commit()?;
        // The committed slide reaches the store the same way a page message does
        while let Ok(request) = inbox.try_recv() {
            if let DaemonResponse::Error(e) =
                Daemon::handle_request(store, DaemonRequest::Message(request.clone()))
            {
                anyhow::bail!("Slide store rejected {}: {}", request.kind(), e);
            }
            if let Request::CreateSlide(created) = request {
                slide = Some(created);
            }
        }
    } else {
        host.quit_picker();
    }

    Ok(PickReport {
        candidates,
        chosen: options.choose,
        selector,
        slide,
    })
}

pub fn handle_pick(
    snapshot: &Path,
    target: &str,
    index: Option<usize>,
    options: PickOptions,
    store: &dyn SlideStore,
    format: OutputFormat,
) -> Result<()> {
    info!("Picking {} in {:?}", target, snapshot);
    let doc = utils::load_snapshot(snapshot, None)?;
    let report = run_pick(doc, target, index, options, store)?;

    match format {
        OutputFormat::Json => utils::print_json(&report)?,
        OutputFormat::Simple => {
            for (i, candidate) in report.candidates.iter().enumerate() {
                let marker = if i == report.chosen { '*' } else { ' ' };
                println!("{} [{}] {}", marker, i, candidate);
            }
            if let Some(slide) = &report.slide {
                println!("Created slide {:?} ({})", slide.display_name, slide.selector);
            }
        }
    }
    Ok(())
}
