pub mod format;
pub mod init;
pub mod inspect;
pub mod types;
pub mod validate;

pub use format::{format, FormatArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use types::{types, TypesArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{Context, Result};
use pagebuilder_stage::{render, Registry, Stage};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use walkdir::WalkDir;

/// Read a markup file into a fresh stage named after the file
pub(crate) fn load_stage(path: &Path, registry: Rc<Registry>) -> Result<Stage> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut stage = Stage::new(path.display().to_string(), registry)?;
    render::load(&mut stage, &source).with_context(|| format!("loading {}", path.display()))?;
    Ok(stage)
}

/// Markup files under `dir`, sorted
pub(crate) fn find_markup_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|e| e == "html" || e == "htm")
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
