//! Slide persistence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::types::Slide;

/// Ordered slide list with whole-list reads and writes
pub trait SlideStore: Send + Sync {
    fn get(&self) -> Result<Vec<Slide>>;

    fn set(&self, slides: &[Slide]) -> Result<()>;

    /// Read, edit and write back the list as one step
    ///
    /// Stores shared between threads override this so that concurrent edits
    /// cannot interleave between the read and the write.
    fn update(&self, edit: &mut dyn FnMut(&mut Vec<Slide>)) -> Result<Vec<Slide>> {
        let mut slides = self.get()?;
        edit(&mut slides);
        self.set(&slides)?;
        Ok(slides)
    }

    /// Prepare backing storage before first use
    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

/// Append `slide` and return the new slide count
pub fn append_slide(store: &dyn SlideStore, slide: Slide) -> Result<usize> {
    let mut pending = Some(slide);
    let slides = store.update(&mut |slides: &mut Vec<Slide>| slides.extend(pending.take()))?;
    Ok(slides.len())
}

/// Remove the slide at `index`, if there is one
pub fn remove_slide(store: &dyn SlideStore, index: usize) -> Result<Option<Slide>> {
    let mut removed = None;
    store.update(&mut |slides: &mut Vec<Slide>| {
        if index < slides.len() {
            removed = Some(slides.remove(index));
        }
    })?;
    Ok(removed)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slides: Mutex<Vec<Slide>>,
}

impl MemoryStore {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides: Mutex::new(slides),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("Slide store lock poisoned"))
}

impl SlideStore for MemoryStore {
    fn get(&self) -> Result<Vec<Slide>> {
        Ok(lock(&self.slides)?.clone())
    }

    fn set(&self, slides: &[Slide]) -> Result<()> {
        *lock(&self.slides)? = slides.to_vec();
        Ok(())
    }

    fn update(&self, edit: &mut dyn FnMut(&mut Vec<Slide>)) -> Result<Vec<Slide>> {
        let mut slides = lock(&self.slides)?;
        edit(&mut *slides);
        Ok(slides.clone())
    }
}

/// On-disk layout of the slide file
#[derive(Debug, Serialize, Deserialize)]
pub struct SlideFile {
    pub slides: Vec<Slide>,
    /// When the list was last written
    pub updated_at: DateTime<Utc>,
}

/// Pretty-printed JSON file, `~/.webpresenter/slides.json` by default
///
/// Clones share one write lock. Every write goes to a temporary file in the
/// same directory that then replaces the store file, so readers never see a
/// partially written list.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Unable to determine home directory")?;
        Ok(home_dir.join(".webpresenter").join("slides.json"))
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_file(&self) -> Result<Option<SlideFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read slide store {:?}", self.path))?;
        let file: SlideFile = serde_json::from_str(&json)
            .with_context(|| format!("Slide store {:?} is not valid", self.path))?;
        Ok(Some(file))
    }

    fn write_file(&self, slides: &[Slide]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        let file = SlideFile {
            slides: slides.to_vec(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        temp.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write slide store {:?}", self.path))?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to write slide store {:?}", self.path))?;

        debug!("Stored {} slide(s) in {:?}", slides.len(), self.path);
        Ok(())
    }
}

impl SlideStore for JsonFileStore {
    fn get(&self) -> Result<Vec<Slide>> {
        Ok(self.read_file()?.map(|file| file.slides).unwrap_or_default())
    }

    fn set(&self, slides: &[Slide]) -> Result<()> {
        let _guard = lock(&self.write_lock)?;
        self.write_file(slides)
    }

    fn update(&self, edit: &mut dyn FnMut(&mut Vec<Slide>)) -> Result<Vec<Slide>> {
        let _guard = lock(&self.write_lock)?;
        let mut slides = self.get()?;
        edit(&mut slides);
        self.write_file(&slides)?;
        Ok(slides)
    }

    /// Write an empty list if nothing has been stored yet
    fn initialize(&self) -> Result<()> {
        if !self.path.exists() {
            self.set(&[])?;
            info!("Initialized slide store at {:?}", self.path);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
