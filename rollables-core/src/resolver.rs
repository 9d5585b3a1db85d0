//! Directory resolver - table root indexing and entry lookup
//!
//! The resolver owns a canonicalized root directory and answers two queries
//! against the live filesystem:
//! - `index()` walks the root and lists every content file as an entry id
//! - `retrieve()` maps an entry id back to the file's raw text
//!
//! Nothing is cached; every call re-reads the tree. Entry ids are relative,
//! `/`-separated and carry no suffix (`monsters/goblin` for
//! `<root>/monsters/goblin.yml`).

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{normalize_extension, RollablesConfig};
use crate::error::{ResolveError, Result};

/// Normalized, suffix-less relative path naming one content file
pub type EntryId = String;

#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    suffix: String,
}

impl Resolver {
    /// Create a resolver over `root`, recognizing files ending in `.<extension>`.
    ///
    /// The root is canonicalized once here; it must be an existing directory.
    pub fn new(root: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|e| ResolveError::root_unavailable(root, e))?;

        if !canonical.is_dir() {
            return Err(ResolveError::root_unavailable(
                root,
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let extension = normalize_extension(extension);
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        };

        debug!(root = %canonical.display(), suffix = %suffix, "resolver ready");
        Ok(Self {
            root: canonical,
            suffix,
        })
    }

    pub fn from_config(config: &RollablesConfig) -> Result<Self> {
        Self::new(&config.root, &config.extension)
    }

    /// Canonical table root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Content-file suffix including the dot (empty when every file counts)
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// List every content file under the root as an entry id.
    ///
    /// Depth-first, siblings in file-name order. Directories, symlinks and
    /// files without the suffix are skipped.
    pub fn index(&self) -> Result<Vec<EntryId>> {
        self.index_excluding(None)
    }

    /// Like [`Resolver::index`], but never descends into `excluded` (a build
    /// output directory nested under the root).
    pub fn index_excluding(&self, excluded: Option<&Path>) -> Result<Vec<EntryId>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| excluded.map_or(true, |dir| !entry.path().starts_with(dir)));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };

            if let Some(id) = self.entry_id(relative) {
                entries.push(id);
            }
        }

        debug!(count = entries.len(), "indexed table root");
        Ok(entries)
    }

    /// Read the raw text of `entry`.
    ///
    /// Leading slashes are ignored. Fails with `OutOfBounds` when the entry
    /// would land outside the root, `NotFound` when no content file exists.
    /// Bytes that are not valid UTF-8 decode to U+FFFD.
    pub fn retrieve(&self, entry: &str) -> Result<String> {
        let path = self.resolve(entry)?;

        match fs::read(&path) {
            Ok(bytes) => {
                debug!(entry, bytes = bytes.len(), "retrieved entry");
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ResolveError::not_found(entry)),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve `entry` to the canonical path of its content file.
    ///
    /// The candidate is checked twice: lexically after `.`/`..` folding, and
    /// again after canonicalization so symlinks cannot leave the root.
    /// Containment is per path component, so `<root>-evil/` never passes as
    /// part of `<root>/`.
    pub fn resolve(&self, entry: &str) -> Result<PathBuf> {
        let relative = entry.trim_start_matches('/');

        let mut candidate = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => candidate.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if candidate == self.root {
                        warn!(entry, "rejected entry escaping table root");
                        return Err(ResolveError::out_of_bounds(entry));
                    }
                    candidate.pop();
                }
                Component::RootDir | Component::Prefix(_) => {
                    warn!(entry, "rejected absolute entry");
                    return Err(ResolveError::out_of_bounds(entry));
                }
            }
        }

        // Resolving to the root itself would name `<root><suffix>`, a sibling.
        if candidate == self.root || !candidate.starts_with(&self.root) {
            return Err(ResolveError::out_of_bounds(entry));
        }

        let Some(file_name) = candidate.file_name() else {
            return Err(ResolveError::out_of_bounds(entry));
        };
        let mut file_name = OsString::from(file_name);
        file_name.push(&self.suffix);
        candidate.set_file_name(file_name);

        let canonical = match candidate.canonicalize() {
            Ok(path) => path,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(ResolveError::not_found(entry));
            }
            Err(e) => return Err(e.into()),
        };

        if !canonical.starts_with(&self.root) {
            warn!(entry, "rejected entry whose target leaves table root");
            return Err(ResolveError::out_of_bounds(entry));
        }
        if !canonical.is_file() {
            return Err(ResolveError::not_found(entry));
        }

        Ok(canonical)
    }

    /// Entry id for a root-relative file path, or `None` if it is not a
    /// content file (wrong suffix, empty or dot-only stem, non UTF-8 name).
    fn entry_id(&self, relative: &Path) -> Option<EntryId> {
        let mut parts = Vec::new();
        for component in relative.components() {
            let Component::Normal(part) = component else {
                return None;
            };
            match part.to_str() {
                Some(part) => parts.push(part),
                None => {
                    warn!(path = %relative.display(), "skipping non UTF-8 path");
                    return None;
                }
            }
        }

        let file_name = parts.pop()?;
        let stem = file_name.strip_suffix(self.suffix.as_str())?;
        if stem.is_empty() {
            return None;
        }
        // `..yml` would index as `.`, which lookup folds away as a path component.
        if stem == "." || stem == ".." {
            warn!(path = %relative.display(), "skipping table with dot-only name");
            return None;
        }

        parts.push(stem);
        Some(parts.join("/"))
    }
}

/// Keep entries containing at least one of `filters` as a substring.
///
/// An empty filter list keeps everything.
pub fn filter_entries(entries: Vec<EntryId>, filters: &[String]) -> Vec<EntryId> {
    if filters.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| filters.iter().any(|f| entry.contains(f.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, Resolver) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tables");
        write(&root, "monsters/goblin.yml", "name: goblin\nhp: 7\n");
        write(&root, "npcs/readme.txt", "not a table");
        let resolver = Resolver::new(&root, "yml").unwrap();
        (dir, resolver)
    }

    #[test]
    fn index_lists_content_files_only() {
        let (_dir, resolver) = fixture();
        assert_eq!(resolver.index().unwrap(), vec!["monsters/goblin".to_string()]);
    }

    #[test]
    fn index_walks_nested_directories() {
        let (_dir, resolver) = fixture();
        write(resolver.root(), "loot/gems/rare.yml", "- ruby");
        write(resolver.root(), "weather.yml", "- rain");
        write(resolver.root(), "loot/.keep", "");

        let mut entries = resolver.index().unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec!["loot/gems/rare", "monsters/goblin", "weather"]
        );
    }

    #[test]
    fn index_skips_directories_named_like_content() {
        let (_dir, resolver) = fixture();
        fs::create_dir_all(resolver.root().join("odd.yml")).unwrap();
        write(resolver.root(), "odd.yml/inner.yml", "x");

        let entries = resolver.index().unwrap();
        assert!(entries.contains(&"odd.yml/inner".to_string()));
        assert!(!entries.contains(&"odd".to_string()));
    }

    #[test]
    fn index_skips_bare_suffix_file() {
        let (_dir, resolver) = fixture();
        write(resolver.root(), ".yml", "x");

        assert_eq!(resolver.index().unwrap(), vec!["monsters/goblin".to_string()]);
    }

    #[test]
    fn index_skips_dot_only_names() {
        let (_dir, resolver) = fixture();
        write(resolver.root(), "..yml", "root dot");
        write(resolver.root(), "...yml", "root dot dot");
        write(resolver.root(), "x/..yml", "inner dot");
        write(resolver.root(), "x.yml", "x table");
        write(resolver.root(), "x/y..yml", "trailing dot");

        let entries = resolver.index().unwrap();
        assert!(!entries.iter().any(|e| e == "." || e == ".." || e == "x/."));
        assert!(entries.contains(&"x".to_string()));
        assert!(entries.contains(&"x/y.".to_string()));

        for entry in &entries {
            let expected =
                fs::read_to_string(resolver.root().join(format!("{}.yml", entry))).unwrap();
            assert_eq!(resolver.retrieve(entry).unwrap(), expected, "{}", entry);
        }
    }

    #[test]
    fn retrieve_decodes_invalid_utf8_lossily() {
        let (_dir, resolver) = fixture();
        fs::write(resolver.root().join("cafe.yml"), b"caf\xe9").unwrap();

        assert!(resolver.index().unwrap().contains(&"cafe".to_string()));
        assert_eq!(resolver.retrieve("cafe").unwrap(), "caf\u{FFFD}");
    }

    #[test]
    fn index_excluding_prunes_directory() {
        let (_dir, resolver) = fixture();
        write(resolver.root(), "_site/source/monsters/goblin.yml", "copy");

        let excluded = resolver.root().join("_site");
        assert_eq!(
            resolver.index_excluding(Some(&excluded)).unwrap(),
            vec!["monsters/goblin".to_string()]
        );
        assert_eq!(resolver.index().unwrap().len(), 2);
    }

    #[test]
    fn every_indexed_entry_resolves() {
        let (_dir, resolver) = fixture();
        write(resolver.root(), "a.b/c.d.yml", "dotted");
        write(resolver.root(), "with space/x.yml", "spaced");

        for entry in resolver.index().unwrap() {
            assert!(resolver.retrieve(&entry).is_ok(), "{} did not resolve", entry);
        }
        assert_eq!(resolver.retrieve("a.b/c.d").unwrap(), "dotted");
    }

    #[test]
    fn retrieve_returns_exact_content() {
        let (_dir, resolver) = fixture();
        assert_eq!(
            resolver.retrieve("monsters/goblin").unwrap(),
            "name: goblin\nhp: 7\n"
        );
    }

    #[test]
    fn retrieve_ignores_leading_slashes() {
        let (_dir, resolver) = fixture();
        let plain = resolver.retrieve("monsters/goblin").unwrap();
        assert_eq!(resolver.retrieve("/monsters/goblin").unwrap(), plain);
        assert_eq!(resolver.retrieve("///monsters/goblin").unwrap(), plain);
    }

    #[test]
    fn retrieve_is_idempotent() {
        let (_dir, resolver) = fixture();
        let first = resolver.retrieve("monsters/goblin").unwrap();
        let second = resolver.retrieve("monsters/goblin").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn retrieve_missing_is_not_found() {
        let (_dir, resolver) = fixture();
        let err = resolver.retrieve("monsters/troll").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));

        let err = resolver.retrieve("nowhere/troll").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn retrieve_does_not_serve_non_content_files() {
        let (_dir, resolver) = fixture();
        let err = resolver.retrieve("npcs/readme").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn retrieve_rejects_parent_escape() {
        let (dir, resolver) = fixture();
        write(dir.path(), "secrets.yml", "password: hunter2");

        let err = resolver.retrieve("../secrets").unwrap_err();
        assert!(matches!(err, ResolveError::OutOfBounds { .. }));

        let err = resolver.retrieve("monsters/../../secrets").unwrap_err();
        assert!(matches!(err, ResolveError::OutOfBounds { .. }));
    }

    #[test]
    fn retrieve_allows_parent_segments_that_stay_inside() {
        let (_dir, resolver) = fixture();
        assert!(resolver.retrieve("npcs/../monsters/goblin").is_ok());
        assert!(resolver.retrieve("./monsters/./goblin").is_ok());
    }

    #[test]
    fn retrieve_rejects_the_root_itself() {
        // `<root>` + suffix would name a file next to the root.
        let (dir, resolver) = fixture();
        write(dir.path(), "tables.yml", "sibling");

        for entry in ["", "/", "monsters/..", "."] {
            let err = resolver.retrieve(entry).unwrap_err();
            assert!(matches!(err, ResolveError::OutOfBounds { .. }), "{entry:?}");
        }
    }

    #[test]
    fn retrieve_rejects_sibling_sharing_root_prefix() {
        // A plain string-prefix check would accept `<root>-evil/loot`.
        let (dir, resolver) = fixture();
        write(dir.path(), "tables-evil/loot.yml", "stolen");

        let err = resolver.retrieve("../tables-evil/loot").unwrap_err();
        assert!(matches!(err, ResolveError::OutOfBounds { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn retrieve_rejects_symlink_escape() {
        let (dir, resolver) = fixture();
        write(dir.path(), "outside.yml", "private");
        std::os::unix::fs::symlink(
            dir.path().join("outside.yml"),
            resolver.root().join("link.yml"),
        )
        .unwrap();

        let err = resolver.retrieve("link").unwrap_err();
        assert!(matches!(err, ResolveError::OutOfBounds { .. }));
        assert!(!resolver.index().unwrap().contains(&"link".to_string()));
    }

    #[test]
    fn new_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = Resolver::new(dir.path().join("absent"), "yml").unwrap_err();
        assert!(matches!(err, ResolveError::RootUnavailable { .. }));
    }

    #[test]
    fn new_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "file.yml", "x");
        let err = Resolver::new(dir.path().join("file.yml"), "yml").unwrap_err();
        assert!(matches!(err, ResolveError::RootUnavailable { .. }));
    }

    #[test]
    fn extension_accepts_leading_dot() {
        let (_dir, resolver) = fixture();
        let dotted = Resolver::new(resolver.root(), ".yml").unwrap();
        assert_eq!(dotted.suffix(), ".yml");
        assert_eq!(dotted.index().unwrap(), resolver.index().unwrap());
    }

    #[test]
    fn filter_is_substring_union() {
        let entries: Vec<EntryId> = ["monsters/goblin", "monsters/troll", "npcs/innkeeper", "loot"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(filter_entries(entries.clone(), &[]), entries);
        assert_eq!(
            filter_entries(entries.clone(), &["gob".to_string()]),
            vec!["monsters/goblin"]
        );
        assert_eq!(
            filter_entries(entries.clone(), &["troll".to_string(), "npcs".to_string()]),
            vec!["monsters/troll", "npcs/innkeeper"]
        );
        assert!(filter_entries(entries, &["dragon".to_string()]).is_empty());
    }
}
