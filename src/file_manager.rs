//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sulle cartelle della libreria musicale.
//!
//! ## Responsabilità:
//! - Discovery delle cartelle a una profondità data (artisti, album)
//! - Vista "logica" dell'albero: gli spostamenti pianificati ma non eseguiti
//!   (dry run del deflat) vengono applicati ai path durante la discovery
//! - Rename e move sicuri: nessuna sovrascrittura, nessun merge
//! - Conversione degli errori di I/O nella tassonomia `RefoldError`
//!
//! ## Sicurezza operazioni:
//! - Se la destinazione esiste ed è un'altra cartella → `Collision`
//! - Permesso negato → `PermissionDenied`, il run prosegue
//! - Un rename che cambia solo maiuscole/minuscole su filesystem case-insensitive è permesso
//!
//! ## Esempio:
//! ```ignore
//! let albums = FileManager::find_folders_at_depth(&root, 2, &[])?;
//! for album in albums {
//!     FileManager::rename_folder(&album.path, &target).await?;
//! }
//! ```

use crate::error::RefoldError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A move that has been planned but not performed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRemap {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A folder found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Where the folder is on disk
    pub path: PathBuf,
    /// Where the folder is once pending remaps are applied
    pub logical: PathBuf,
}

impl FolderEntry {
    /// Name of the ancestor `distance` levels above, in the logical tree
    pub fn ancestor_name(&self, distance: usize) -> Option<String> {
        self.logical
            .ancestors()
            .nth(distance)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
    }

    pub fn name(&self) -> String {
        self.logical
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Manages folder discovery and moves
pub struct FileManager;

impl FileManager {
    /// Find all folders `depth` levels below `root` (0 = root itself), sorted by logical path
    pub fn find_folders_at_depth(
        root: &Path,
        depth: usize,
        remaps: &[PathRemap],
    ) -> Result<Vec<FolderEntry>> {
        let mut folders = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(0)
            .max_depth(depth)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Cannot read directory entry: {}", err);
                None
            }
        }) {
            if !entry.file_type().is_dir() {
                continue;
            }

            let logical = Self::remap(entry.path(), remaps);
            if Self::depth_below(root, &logical) == Some(depth) {
                folders.push(FolderEntry {
                    path: entry.path().to_path_buf(),
                    logical,
                });
            }
        }

        folders.sort_by(|a, b| a.logical.cmp(&b.logical));
        debug!("Found {} folders at depth {} under {}", folders.len(), depth, root.display());
        Ok(folders)
    }

    /// Apply the first matching remap to `path`
    pub fn remap(path: &Path, remaps: &[PathRemap]) -> PathBuf {
        for remap in remaps {
            if let Ok(rest) = path.strip_prefix(&remap.from) {
                return if rest.as_os_str().is_empty() {
                    remap.to.clone()
                } else {
                    remap.to.join(rest)
                };
            }
        }
        path.to_path_buf()
    }

    fn depth_below(root: &Path, path: &Path) -> Option<usize> {
        path.strip_prefix(root).ok().map(|rest| rest.components().count())
    }

    /// Path relative to the run root, for logs and messages
    pub fn relative_display(root: &Path, path: &Path) -> String {
        match path.strip_prefix(root) {
            Ok(rest) if !rest.as_os_str().is_empty() => rest.display().to_string(),
            _ => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// Rename a folder within the same parent, refusing to overwrite another folder
    pub async fn rename_folder(from: &Path, to: &Path) -> Result<(), RefoldError> {
        if to.exists() && !Self::is_same_folder(from, to).await {
            return Err(RefoldError::Collision { target: to.to_path_buf() });
        }

        fs::rename(from, to)
            .await
            .map_err(|err| Self::map_io_error(err, from))
    }

    /// Move a folder to a new parent, creating the parent if needed
    pub async fn move_folder(from: &Path, to: &Path) -> Result<(), RefoldError> {
        if to.exists() {
            return Err(RefoldError::Collision { target: to.to_path_buf() });
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| Self::map_io_error(err, parent))?;
        }

        fs::rename(from, to)
            .await
            .map_err(|err| Self::map_io_error(err, from))
    }

    async fn is_same_folder(a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn map_io_error(err: std::io::Error, path: &Path) -> RefoldError {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            RefoldError::PermissionDenied { path: path.to_path_buf() }
        } else {
            RefoldError::Io(err)
        }
    }
}
