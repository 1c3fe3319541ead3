//! # Deflat Module
//!
//! Pre-pass che divide le cartelle "piatte" `"Artista - Album"` in `Artista/Album`
//! prima del passaggio principale. Lavora solo sul primo livello del run (livello artista).
//!
//! ## Regole:
//! - Il nome viene normalizzato e diviso al primo `" - "`
//! - Se la parte sinistra è un anno o un intervallo di anni il nome è già un album: niente split
//! - La cartella artista viene creata se manca; una destinazione esistente è una `Collision`

use crate::engine::normalize;
use crate::error::RefoldError;
use crate::file_manager::{FileManager, PathRemap};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

static YEAR_OR_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}(?:\s*-\s*\d{4})?$").unwrap());

/// A planned `parent/"Artist - Album"` → `parent/Artist/Album` move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeflatMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl DeflatMove {
    pub fn as_remap(&self) -> PathRemap {
        PathRemap { from: self.from.clone(), to: self.to.clone() }
    }
}

/// Split a flat folder name into artist and album
pub fn split_flat_name(name: &str) -> Option<(String, String)> {
    let normalized = normalize(name);
    let (artist, album) = normalized.as_str().split_once(" - ")?;
    let (artist, album) = (artist.trim(), album.trim());

    if artist.is_empty() || album.is_empty() || YEAR_OR_RANGE.is_match(artist) {
        return None;
    }
    Some((artist.to_string(), album.to_string()))
}

/// Plan the moves for every flat folder at `depth`
pub fn plan(root: &Path, depth: usize) -> Result<Vec<DeflatMove>> {
    let moves = FileManager::find_folders_at_depth(root, depth, &[])?
        .into_iter()
        .filter_map(|folder| {
            let (artist, album) = split_flat_name(&folder.name())?;
            let parent = folder.path.parent()?.to_path_buf();
            Some(DeflatMove {
                from: folder.path,
                to: parent.join(artist).join(album),
            })
        })
        .collect();
    Ok(moves)
}

/// Refuse a move whose destination exists on disk or was already claimed by an earlier move
pub fn check_target(planned: &DeflatMove, claimed: &HashSet<PathBuf>) -> Result<(), RefoldError> {
    if planned.to.exists() || claimed.contains(&planned.to) {
        return Err(RefoldError::Collision { target: planned.to.clone() });
    }
    Ok(())
}
