//! Static bundle builder - bakes the table root into flat assets
//!
//! Output layout under `out_dir`:
//! - `index.json`  - JSON array of every entry id
//! - `source/`     - verbatim copy of the table root (all files, not just tables)
//! - `tables.json` - entry id -> content map, only in [`BuildMode::Bundle`]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BuildError, ResolveError};
use crate::resolver::{EntryId, Resolver};

pub const INDEX_FILE: &str = "index.json";
pub const SOURCE_DIR: &str = "source";
pub const BUNDLE_FILE: &str = "tables.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Write the index and copy the raw tree
    #[default]
    Copy,
    /// Write the index and a single id -> content JSON object
    Bundle,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub out_dir: PathBuf,
    pub mode: BuildMode,
}

impl BuildOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            mode: BuildMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What a build wrote
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub entries: usize,
    pub copied_files: usize,
    pub index_path: PathBuf,
    pub source_dir: Option<PathBuf>,
    pub bundle_path: Option<PathBuf>,
}

/// Run a one-shot build of `resolver`'s root into `options.out_dir`.
pub fn build(resolver: &Resolver, options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let out_dir = &options.out_dir;
    fs::create_dir_all(out_dir).map_err(|e| BuildError::io(out_dir, e))?;

    // A nested output dir must not feed back into the index or the copy.
    let out_canonical = out_dir
        .canonicalize()
        .map_err(|e| BuildError::io(out_dir, e))?;

    let entries = resolver.index_excluding(Some(&out_canonical))?;
    let index_path = out_dir.join(INDEX_FILE);
    write_json(&index_path, &entries)?;
    info!(entries = entries.len(), path = %index_path.display(), "wrote index");

    let mut report = BuildReport {
        entries: entries.len(),
        index_path,
        ..Default::default()
    };

    match options.mode {
        BuildMode::Copy => {
            let source_dir = out_dir.join(SOURCE_DIR);
            report.copied_files = copy_tree(resolver.root(), &source_dir, &out_canonical)?;
            info!(files = report.copied_files, path = %source_dir.display(), "copied source tree");
            report.source_dir = Some(source_dir);
        }
        BuildMode::Bundle => {
            let bundle_path = out_dir.join(BUNDLE_FILE);
            let contents = collect_contents(resolver, &entries)?;
            write_json(&bundle_path, &contents)?;
            info!(path = %bundle_path.display(), "wrote content bundle");
            report.bundle_path = Some(bundle_path);
        }
    }

    Ok(report)
}

/// Read every entry in parallel into an ordered id -> content map
pub fn collect_contents(
    resolver: &Resolver,
    entries: &[EntryId],
) -> Result<BTreeMap<EntryId, String>, ResolveError> {
    entries
        .par_iter()
        .map(|entry| resolver.retrieve(entry).map(|content| (entry.clone(), content)))
        .collect()
}

/// Copy every regular file under `root` into `dest`, preserving layout.
///
/// Anything under the canonical `out_dir` is skipped so a build directory
/// nested inside the root is never copied into itself. Returns the number of
/// files copied.
fn copy_tree(root: &Path, dest: &Path, out_dir: &Path) -> Result<usize, BuildError> {
    fs::create_dir_all(dest).map_err(|e| BuildError::io(dest, e))?;

    let mut copied = 0;
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(out_dir));

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(|e| BuildError::io(&target, e))?;
            debug!(file = %relative.display(), "copied");
            copied += 1;
        }
    }

    Ok(copied)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), BuildError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BuildError::json(path, e))?;
    fs::write(path, json).map_err(|e| BuildError::io(path, e))
}
