//! # Journal Module
//!
//! File di log append-only, una riga per evento, in formato testo.
//!
//! ## File:
//! - `renamed.log`: Cartelle rinominate (o che verrebbero rinominate in dry run)
//! - `skipped.log`: Cartelle saltate con motivo, ed errori per-cartella
//! - `not_found.log`: Anni non trovati o lookup fallito
//! - `deflat.log`: Spostamenti del pre-pass deflat
//!
//! I log sono l'unico stato che sopravvive a un run: servono per un eventuale
//! ripristino manuale.

use crate::error::RefoldError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Renamed,
    Skipped,
    NotFound,
    Deflat,
}

impl LogKind {
    pub const ALL: [LogKind; 4] = [Self::Renamed, Self::Skipped, Self::NotFound, Self::Deflat];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Renamed => "renamed.log",
            Self::Skipped => "skipped.log",
            Self::NotFound => "not_found.log",
            Self::Deflat => "deflat.log",
        }
    }
}

/// The four decision logs of a run
pub struct Journal {
    dir: PathBuf,
    renamed: File,
    skipped: File,
    not_found: File,
    deflat: File,
}

impl Journal {
    /// Open (or create) the log files in `dir` for appending
    pub async fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            dir: dir.to_path_buf(),
            renamed: Self::open_log(dir, LogKind::Renamed).await?,
            skipped: Self::open_log(dir, LogKind::Skipped).await?,
            not_found: Self::open_log(dir, LogKind::NotFound).await?,
            deflat: Self::open_log(dir, LogKind::Deflat).await?,
        })
    }

    async fn open_log(dir: &Path, kind: LogKind) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(kind.file_name()))
            .await?;
        Ok(file)
    }

    pub fn path(&self, kind: LogKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Append one line to the given log
    pub async fn write(&mut self, kind: LogKind, line: &str) -> Result<(), RefoldError> {
        let file = match kind {
            LogKind::Renamed => &mut self.renamed,
            LogKind::Skipped => &mut self.skipped,
            LogKind::NotFound => &mut self.not_found,
            LogKind::Deflat => &mut self.deflat,
        };
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
