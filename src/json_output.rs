//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (una riga per evento su stdout),
//! pensato per script e interfacce che pilotano `refoldr`.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON strutturati per ogni decisione
//! - Utilizza `RunStats` per il riepilogo finale
//! - In JSON mode la progress bar è nascosta e i log `tracing` vanno su stderr
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run
//! - `deflat`: Spostamento del pre-pass deflat
//! - `decision`: Decisione su una cartella album (rename o skip)
//! - `error`: Errore su una cartella, il run prosegue
//! - `complete`: Fine del run con statistiche finali

use crate::progress::RunStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del run
    #[serde(rename = "start")]
    Start {
        root: PathBuf,
        dry_run: bool,
        total_folders: usize,
    },

    #[serde(rename = "deflat")]
    Deflat {
        from: String,
        to: String,
        dry_run: bool,
    },

    /// Decisione su una cartella
    #[serde(rename = "decision")]
    Decision {
        path: String,
        decision: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        dry_run: bool,
    },

    /// Errore su una cartella
    #[serde(rename = "error")]
    Error {
        path: String,
        message: String,
    },

    /// Run completato
    #[serde(rename = "complete")]
    Complete {
        #[serde(flatten)]
        stats: RunStats,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(root: PathBuf, dry_run: bool, total_folders: usize) -> Self {
        Self::Start { root, dry_run, total_folders }
    }

    pub fn deflat(from: String, to: String, dry_run: bool) -> Self {
        Self::Deflat { from, to, dry_run }
    }

    pub fn renamed(path: String, target: String, dry_run: bool) -> Self {
        Self::Decision {
            path,
            decision: "rename".to_string(),
            reason: None,
            target: Some(target),
            dry_run,
        }
    }

    pub fn skipped(path: String, reason: String, dry_run: bool) -> Self {
        Self::Decision {
            path,
            decision: "skip".to_string(),
            reason: Some(reason),
            target: None,
            dry_run,
        }
    }

    pub fn error(path: String, message: String) -> Self {
        Self::Error { path, message }
    }

    pub fn complete(stats: RunStats, duration_seconds: f64) -> Self {
        Self::Complete { stats, duration_seconds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_message_shape() {
        let message = JsonMessage::skipped("Queen/Jazz".to_string(), "not-found".to_string(), true);
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "decision");
        assert_eq!(value["decision"], "skip");
        assert_eq!(value["reason"], "not-found");
        assert!(value.get("target").is_none());
    }

    #[test]
    fn test_complete_message_flattens_stats() {
        let mut stats = RunStats::new();
        stats.add_renamed();

        let value = serde_json::to_value(JsonMessage::complete(stats, 1.5)).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["renamed"], 1);
        assert_eq!(value["processed"], 1);
        assert_eq!(value["duration_seconds"], 1.5);
    }
}
