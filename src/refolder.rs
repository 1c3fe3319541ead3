//! # Refolder Orchestrator
//!
//! Orchestratore del run: collega la discovery, il motore di classificazione,
//! il lookup metadata e le operazioni sul filesystem.
//!
//! ## Flusso:
//! 1. Pre-pass deflat opzionale (`Artista - Album` → `Artista/Album`)
//! 2. Discovery delle cartelle album al livello configurato
//! 3. Per ogni cartella: classificazione, lookup se serve, rename
//! 4. Ogni decisione finisce in un file di log, in JSON o nei log `tracing`
//!
//! ## Dry run:
//! In dry run nulla viene toccato sul disco, ma la sequenza di decisioni è la stessa
//! di un run reale: gli spostamenti deflat diventano `PathRemap` e le collisioni sono
//! calcolate sulla vista logica dell'albero (destinazioni già occupate + cartelle liberate).
//!
//! Un errore su una cartella viene registrato e il run passa alla successiva.

use crate::config::Config;
use crate::deflat::{self, DeflatMove};
use crate::engine::{classify, classify_with_year, ClassifyOptions, Decision, LookupQuery, RawName, SkipReason};
use crate::error::RefoldError;
use crate::file_manager::{FileManager, FolderEntry, PathRemap};
use crate::journal::{Journal, LogKind};
use crate::json_output::JsonMessage;
use crate::lookup::{DiscogsClient, YearLookup};
use crate::progress::{ProgressManager, RunStats};
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

const DRY_RUN_MARKER: &str = "[DRY-RUN] ";

/// Renames the album folders below one root
pub struct Refolder {
    root: PathBuf,
    config: Config,
    options: ClassifyOptions,
    journal: Journal,
    lookup: Option<Box<dyn YearLookup>>,
    stats: RunStats,
    /// Logical paths that hold a folder after this run's moves
    claimed: HashSet<PathBuf>,
    /// Logical paths emptied by this run's moves
    vacated: HashSet<PathBuf>,
}

impl Refolder {
    /// Validate the configuration and open the logs
    pub async fn new(root: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        if !root.is_dir() {
            return Err(RefoldError::Validation(format!(
                "Library directory does not exist: {}",
                root.display()
            ))
            .into());
        }
        let root = tokio::fs::canonicalize(root).await?;

        let lookup = DiscogsClient::from_config(&config)?
            .map(|client| Box::new(client) as Box<dyn YearLookup>);
        let journal = Journal::open(&config.log_dir).await?;

        Ok(Self {
            root,
            options: config.classify_options(),
            config,
            journal,
            lookup,
            stats: RunStats::new(),
            claimed: HashSet::new(),
            vacated: HashSet::new(),
        })
    }

    /// Replace the metadata lookup, enabling it
    pub fn with_lookup(mut self, lookup: Box<dyn YearLookup>) -> Self {
        self.lookup = Some(lookup);
        self.options.lookup_enabled = true;
        self
    }

    /// Execute the run and return its statistics
    pub async fn run(&mut self) -> Result<RunStats> {
        let start_time = Instant::now();

        let remaps = self.deflat_pass().await?;
        let albums = FileManager::find_folders_at_depth(&self.root, self.config.album_depth(), &remaps)?;

        self.emit_start_message(albums.len());

        let progress = if self.config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(albums.len() as u64)
        };

        for album in &albums {
            let rel = FileManager::relative_display(&self.root, &album.logical);
            if let Err(err) = self.process_album(album, &rel).await {
                self.report_error(&rel, &err).await?;
            }
            progress.update(&rel);
        }

        progress.finish(&self.stats.format_summary());
        self.print_final_stats(start_time.elapsed().as_secs_f64());

        Ok(self.stats.clone())
    }

    fn emit_start_message(&self, total_folders: usize) {
        if self.config.json_output {
            JsonMessage::start(self.root.clone(), self.config.dry_run, total_folders).emit();
            return;
        }

        info!("🎵 Refolding library in: {}", self.root.display());
        info!(
            "Levels: artist {} / album {} | Edge cases renamed: {}",
            self.config.start_level,
            self.config.end_level,
            if self.config.edges.is_empty() {
                "none".to_string()
            } else {
                self.config.edges.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(",")
            }
        );
        if self.lookup.is_some() {
            info!("Year lookup: Discogs");
        } else {
            info!("Year lookup: disabled (no token)");
        }
        if self.config.dry_run {
            info!("Dry run mode: No folders will be modified");
        }
        info!("Found {} album folders to process", total_folders);
    }

    fn print_final_stats(&self, duration_seconds: f64) {
        if self.config.json_output {
            JsonMessage::complete(self.stats.clone(), duration_seconds).emit();
        } else {
            info!("✅ Run completed in {:.2}s", duration_seconds);
            info!("{}", self.stats.format_summary());
        }
    }

    fn marker(&self) -> &'static str {
        if self.config.dry_run {
            DRY_RUN_MARKER
        } else {
            ""
        }
    }

    fn relative(&self, path: &Path) -> String {
        FileManager::relative_display(&self.root, path)
    }

    /// Error text with paths shown relative to the root
    fn describe(&self, err: &RefoldError) -> String {
        match err {
            RefoldError::Collision { target } => format!("Target already exists: {}", self.relative(target)),
            RefoldError::PermissionDenied { path } => format!("Permission denied: {}", self.relative(path)),
            other => other.to_string(),
        }
    }

    /// Split flat `Artist - Album` folders; returns the moves a dry run only pretends to make
    async fn deflat_pass(&mut self) -> Result<Vec<PathRemap>> {
        let Some(depth) = self.config.deflat_depth() else {
            if self.config.deflat {
                warn!("Deflat needs an artist level of 1 or more, skipping it");
            }
            return Ok(Vec::new());
        };

        let moves = deflat::plan(&self.root, depth)?;
        debug!("Deflat: {} flat folders at depth {}", moves.len(), depth);

        let mut remaps = Vec::new();
        for planned in moves {
            match self.apply_deflat(&planned).await {
                Ok(()) => {
                    if self.config.dry_run {
                        remaps.push(planned.as_remap());
                    }
                }
                Err(err) => {
                    let rel = self.relative(&planned.from);
                    let line = format!("{}[ERROR] {}: {}", self.marker(), self.describe(&err), rel);
                    warn!("Deflat failed for {}: {}", rel, self.describe(&err));
                    self.journal.write(LogKind::Deflat, &line).await?;
                    self.stats.add_deflat_error();
                    if self.config.json_output {
                        JsonMessage::error(rel, self.describe(&err)).emit();
                    }
                }
            }
        }

        Ok(remaps)
    }

    async fn apply_deflat(&mut self, planned: &DeflatMove) -> Result<(), RefoldError> {
        deflat::check_target(planned, &self.claimed)?;
        if !self.config.dry_run {
            FileManager::move_folder(&planned.from, &planned.to).await?;
        }
        self.claimed.insert(planned.to.clone());

        let (from, to) = (self.relative(&planned.from), self.relative(&planned.to));
        let line = format!("{}Deflat: {} -> {}", self.marker(), from, to);
        self.journal.write(LogKind::Deflat, &line).await?;
        self.stats.add_deflated();

        if self.config.json_output {
            JsonMessage::deflat(from, to, self.config.dry_run).emit();
        } else {
            info!("📂 {}", line);
        }
        Ok(())
    }

    async fn process_album(&mut self, album: &FolderEntry, rel: &str) -> Result<(), RefoldError> {
        let artist = album.ancestor_name(self.config.artist_distance());
        let raw = RawName::new(album.name(), artist.as_deref(), self.config.end_level);

        let decision = match classify(&raw, &self.options) {
            Decision::NeedsLookup(query) => self.resolve_year(&raw, &query, rel).await?,
            decision => decision,
        };

        match decision {
            Decision::Rename(target) => self.rename(album, rel, &target).await,
            Decision::Skip(reason) => self.skip(rel, &reason).await,
            Decision::NeedsLookup(_) => self.skip(rel, &SkipReason::NoYearFound).await,
        }
    }

    /// Ask the lookup for a year and classify again with it
    async fn resolve_year(&mut self, raw: &RawName, query: &LookupQuery, rel: &str) -> Result<Decision, RefoldError> {
        let Some(lookup) = self.lookup.as_ref() else {
            return Ok(Decision::Skip(SkipReason::NoYearFound));
        };

        debug!("Looking up year for '{}'", query);
        match lookup.find_year(query).await {
            Ok(Some(year)) => {
                debug!("Found year {} for '{}'", year, query);
                Ok(classify_with_year(raw, &self.options, year))
            }
            Ok(None) => {
                let line = format!("{}[NOT-FOUND] {}: {}", self.marker(), query, rel);
                if !self.config.json_output {
                    info!("🔍 {}", line);
                }
                self.write_log(LogKind::NotFound, &line).await?;
                self.stats.add_not_found();
                Ok(Decision::Skip(SkipReason::NotFound))
            }
            Err(err) => {
                warn!("Year lookup failed for {}: {}", rel, err);
                let line = format!("{}[ERROR] {}: {}", self.marker(), err, rel);
                self.write_log(LogKind::NotFound, &line).await?;
                self.stats.add_not_found();
                Ok(Decision::Skip(SkipReason::NoYearFound))
            }
        }
    }

    async fn rename(&mut self, album: &FolderEntry, rel: &str, target: &str) -> Result<(), RefoldError> {
        let new_logical = album.logical.with_file_name(target);
        if self.is_taken(&new_logical) {
            return Err(RefoldError::Collision { target: new_logical });
        }

        if !self.config.dry_run {
            FileManager::rename_folder(&album.path, &album.path.with_file_name(target)).await?;
        }
        self.claimed.remove(&album.logical);
        self.vacated.insert(album.logical.clone());
        self.claimed.insert(new_logical.clone());

        let new_rel = self.relative(&new_logical);
        let line = format!("{}Rename: {} -> {}", self.marker(), rel, new_rel);
        self.write_log(LogKind::Renamed, &line).await?;
        self.stats.add_renamed();

        if self.config.json_output {
            JsonMessage::renamed(rel.to_string(), new_rel, self.config.dry_run).emit();
        } else {
            info!("✏️  {}", line);
        }
        Ok(())
    }

    async fn skip(&mut self, rel: &str, reason: &SkipReason) -> Result<(), RefoldError> {
        let line = format!("{}[SKIP] {}: {}", self.marker(), reason, rel);
        self.write_log(LogKind::Skipped, &line).await?;
        self.stats.add_skipped();

        if self.config.json_output {
            JsonMessage::skipped(rel.to_string(), reason.to_string(), self.config.dry_run).emit();
        } else {
            info!("⏭️  {}", line);
        }
        Ok(())
    }

    async fn report_error(&mut self, rel: &str, err: &RefoldError) -> Result<()> {
        let message = self.describe(err);
        warn!("❌ {}: {}", rel, message);

        let line = format!("{}[ERROR] {}: {}", self.marker(), message, rel);
        self.journal.write(LogKind::Skipped, &line).await?;
        self.stats.add_error();

        if self.config.json_output {
            JsonMessage::error(rel.to_string(), message).emit();
        }
        Ok(())
    }

    /// Whether a folder sits at `path` once this run's moves are accounted for
    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || (path.exists() && !self.vacated.contains(path))
    }

    async fn write_log(&mut self, kind: LogKind, line: &str) -> Result<(), RefoldError> {
        self.journal.write(kind, line).await
    }
}
