use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use crate::commands::utils;
use webpresenter::store::{SlideStore, append_slide, remove_slide};
use webpresenter::types::{OutputFormat, Slide};

#[derive(Subcommand)]
pub enum SlidesCommands {
    /// List stored slides
    List,

    /// Append a slide
    Add {
        /// Selector resolved on every step
        selector: String,

        /// Name shown in slide lists
        name: String,

        /// Ctrl+key jumping to this slide
        #[arg(short, long)]
        shortcut: Option<char>,
    },

    /// Remove the slide at INDEX (0-based)
    Remove { index: usize },

    /// Remove every slide
    Clear,
}

pub fn handle_slides(
    command: SlidesCommands,
    store: &dyn SlideStore,
    format: OutputFormat,
) -> Result<()> {
    match command {
        SlidesCommands::List => {
            let slides = store.get()?;
            print_slides(&slides, format)?;
        }
        SlidesCommands::Add {
            selector,
            name,
            shortcut,
        } => {
            let mut slide = Slide::new(selector, name);
            slide.shortcut = shortcut;
            let count = append_slide(store, slide)?;
            info!("Slide added, {} total", count);
            print_slides(&store.get()?, format)?;
        }
        SlidesCommands::Remove { index } => match remove_slide(store, index)? {
            Some(removed) => {
                info!("Removed slide {:?}", removed.display_name);
                print_slides(&store.get()?, format)?;
            }
            None => anyhow::bail!("No slide at index {}", index),
        },
        SlidesCommands::Clear => {
            store.set(&[])?;
            info!("Cleared slides");
            print_slides(&[], format)?;
        }
    }
    Ok(())
}

fn print_slides(slides: &[Slide], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => utils::print_json(slides)?,
        OutputFormat::Simple => {
            if slides.is_empty() {
                println!("No slides");
            }
            for (i, slide) in slides.iter().enumerate() {
                match slide.shortcut {
                    Some(key) => println!(
                        "[{}] {} - {} (ctrl+{})",
                        i, slide.display_name, slide.selector, key
                    ),
                    None => println!("[{}] {} - {}", i, slide.display_name, slide.selector),
                }
            }
        }
    }
    Ok(())
}
