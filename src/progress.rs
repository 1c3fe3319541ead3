//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del run.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar principale con `indicatif`
//! - `RunStats`: Contatori cumulativi delle decisioni
//!
//! ## Statistiche tracciate:
//! - **processed**: Cartelle album esaminate
//! - **renamed**: Cartelle rinominate (o da rinominare in dry run)
//! - **skipped**: Cartelle saltate, qualunque sia il motivo
//! - **not_found**: Cartelle senza anno anche dopo il lookup
//! - **deflated**: Cartelle piatte divise in `Artista/Album`
//! - **errors**: Errori per-cartella (collisioni, permessi, I/O)
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:03] [========================>---------------] 150/240 (62%) Queen/Jazz (1978)
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Manages progress reporting over the album folders of a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_folders: u64) -> Self {
        let bar = ProgressBar::new(total_folders);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A progress manager that never draws
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Decision counters for a run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub processed: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub deflated: usize,
    pub errors: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renamed(&mut self) {
        self.processed += 1;
        self.renamed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    pub fn add_not_found(&mut self) {
        self.not_found += 1;
    }

    pub fn add_deflated(&mut self) {
        self.deflated += 1;
    }

    pub fn add_error(&mut self) {
        self.processed += 1;
        self.errors += 1;
    }

    /// Deflat failures are not album folders
    pub fn add_deflat_error(&mut self) {
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} folders | Renamed: {} | Skipped: {} | Not found: {} | Deflated: {} | Errors: {}",
            self.processed, self.renamed, self.skipped, self.not_found, self.deflated, self.errors
        )
    }
}
