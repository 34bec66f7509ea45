use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

use crate::commands::utils;
use webpresenter::dom::{KeyEvent, MemoryDocument};
use webpresenter::host::ContentHost;
use webpresenter::messaging::Request;
use webpresenter::types::{OutputFormat, Slide};

#[derive(Debug, Serialize)]
pub struct PresentReport {
    pub step: usize,
    pub visible: bool,
    pub slide: Option<Slide>,
    /// clip-path currently applied to the presentation frame
    pub mask: Option<String>,
    pub slide_count: usize,
}

/// Replay navigation against a loaded page
///
/// `keys` are pressed with Ctrl held, after jumping to `step`.
pub fn run_present(
    doc: MemoryDocument,
    slides: Vec<Slide>,
    step: Option<i64>,
    keys: &[String],
) -> PresentReport {
    let (outbox, _inbox) = mpsc::unbounded_channel();
    let mut host = ContentHost::new(doc, slides, outbox);

    if let Some(step) = step {
        host.handle_message(Request::GoSlide { step });
    }
    for key in keys {
        host.handle_key(&KeyEvent::ctrl(key.as_str()));
    }

    let presenter = host.presenter();
    PresentReport {
        step: presenter.step(),
        visible: host.is_presenting(),
        slide: presenter.current().cloned(),
        mask: presenter.mask(host.document()).map(str::to_string),
        slide_count: presenter.slides().len(),
    }
}

pub fn handle_present(
    snapshot: &Path,
    slides: Vec<Slide>,
    step: Option<i64>,
    keys: &[String],
    viewport: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("Presenting {} slide(s) on {:?}", slides.len(), snapshot);
    let doc = utils::load_snapshot(snapshot, viewport)?;
    let report = run_present(doc, slides, step, keys);

    match format {
        OutputFormat::Json => utils::print_json(&report)?,
        OutputFormat::Simple => {
            match &report.slide {
                Some(slide) => println!(
                    "Slide {}/{}: {} ({})",
                    report.step + 1,
                    report.slide_count,
                    slide.display_name,
                    slide.selector
                ),
                None => println!("No slides"),
            }
            println!("Visible: {}", report.visible);
            if let Some(mask) = &report.mask {
                println!("Mask: {}", mask);
            }
        }
    }
    Ok(())
}
