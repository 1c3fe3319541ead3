//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri del run
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Converte le liste della command line (`-e r,d`, `-l 1,2`)
//! - Deriva le `ClassifyOptions` immutabili passate al motore
//!
//! ## Parametri di configurazione:
//! - `dry_run`: Simulazione senza modifiche al filesystem (default: false)
//! - `edges`: Casi limite da processare invece di saltare (default: nessuno)
//! - `start_level`: Profondità delle cartelle artista (default: 1)
//! - `end_level`: Profondità delle cartelle album (default: 2)
//! - `deflat`: Divide `"Artista - Album"` in `Artista/Album` prima del run (default: false)
//! - `discogs_token`: Token Discogs, mai salvato su file (default: None = lookup disabilitato)
//! - `lookup_timeout_secs`: Timeout della richiesta Discogs (default: 10)
//! - `lookup_delay_ms`: Pausa prima di ogni richiesta, rate limit Discogs (default: 1100)
//! - `log_dir`: Directory dei file di log (default: ".")
//! - `skip_names`: Frammenti di nome sempre saltati (default: vuoto)
//! - `json_output`: Output JSON per uso programmatico (default: false)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     dry_run: true,
//!     edges: Config::parse_edges("r,m")?,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::engine::{ClassifyOptions, EdgeCategory, EdgeFlags};
use crate::error::RefoldError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a renaming run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dry run - don't actually rename folders
    pub dry_run: bool,
    /// Edge categories to process instead of skip
    pub edges: EdgeFlags,
    /// Depth of artist folders (root = 0)
    pub start_level: i32,
    /// Depth of album folders (root = 0)
    pub end_level: i32,
    /// Split flat "Artist - Album" folders before the main pass
    pub deflat: bool,
    /// Discogs API token
    #[serde(skip)]
    pub discogs_token: Option<String>,
    /// Discogs request timeout
    pub lookup_timeout_secs: u64,
    /// Pause before each Discogs request
    pub lookup_delay_ms: u64,
    /// Directory receiving renamed.log, skipped.log, not_found.log and deflat.log
    pub log_dir: PathBuf,
    /// Folder name fragments that are never touched
    pub skip_names: Vec<String>,
    /// Output progress and decisions as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: false,
            edges: EdgeFlags::default(),
            start_level: 1,
            end_level: 2,
            deflat: false,
            discogs_token: None,
            lookup_timeout_secs: 10,
            lookup_delay_ms: 1100,
            log_dir: PathBuf::from("."),
            skip_names: Vec::new(),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.end_level < 0 {
            return Err(RefoldError::Validation("Album level must be 0 or greater".to_string()).into());
        }

        if self.start_level >= self.end_level {
            return Err(RefoldError::Validation(format!(
                "Artist level ({}) must be lower than album level ({})",
                self.start_level, self.end_level
            ))
            .into());
        }

        if self.lookup_timeout_secs == 0 {
            return Err(RefoldError::Validation("Lookup timeout must be greater than 0".to_string()).into());
        }

        if !self.log_dir.is_dir() {
            return Err(RefoldError::Validation(format!(
                "Log directory does not exist: {}",
                self.log_dir.display()
            ))
            .into());
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("refoldr").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content).map_err(RefoldError::from)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Parse a comma-separated edge list such as `r,d,m` or `remaster,delux`
    pub fn parse_edges(list: &str) -> Result<EdgeFlags, RefoldError> {
        list.split(',')
            .map(str::trim)
            .filter(|option| !option.is_empty())
            .map(|option| {
                EdgeCategory::from_option(option)
                    .ok_or_else(|| RefoldError::Validation(format!("Unknown edge case: {}", option)))
            })
            .collect()
    }

    /// Parse a `start,end` level pair; values may be negative
    pub fn parse_levels(spec: &str) -> Result<(i32, i32), RefoldError> {
        let invalid = || RefoldError::Validation(format!("Invalid level format '{}', use start,end", spec));

        let (start, end) = spec.split_once(',').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        Ok((start, end))
    }

    pub fn lookup_enabled(&self) -> bool {
        self.discogs_token
            .as_deref()
            .map_or(false, |token| !token.trim().is_empty())
    }

    /// Depth of the folders that get renamed
    pub fn album_depth(&self) -> usize {
        self.end_level.max(0) as usize
    }

    /// How many levels above an album its artist folder sits
    pub fn artist_distance(&self) -> usize {
        (self.end_level - self.start_level).max(1) as usize
    }

    /// Depth at which the deflat pre-pass runs, if it runs at all
    pub fn deflat_depth(&self) -> Option<usize> {
        (self.deflat && self.start_level >= 1).then_some(self.start_level as usize)
    }

    /// Engine options for this run
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            enabled_edges: self.edges,
            lookup_enabled: self.lookup_enabled(),
            skip_names: self.skip_names.clone(),
        }
    }
}
