//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `RefoldError` enum per categorizzare gli errori per-cartella
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O generici
//! - `Collision`: La cartella di destinazione esiste già ed è un'altra cartella
//! - `PermissionDenied`: Rename negato dal filesystem
//! - `LookupUnavailable`: Rete, timeout o autenticazione verso il servizio metadata
//! - `Validation`: Parametri di configurazione non validi
//! - `Config`: File di configurazione illeggibile
//!
//! Nessuno di questi errori interrompe il run: l'orchestratore li registra e passa
//! alla cartella successiva. Le ambiguità di parsing non sono errori: vengono risolte
//! dall'estrattore (vedi `engine::extractor::Ambiguity`).
//!
//! ## Esempio:
//! ```ignore
//! if target.exists() {
//!     return Err(RefoldError::Collision { target });
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for folder renaming
#[derive(thiserror::Error, Debug)]
pub enum RefoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Target already exists: {}", target.display())]
    Collision { target: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Metadata lookup unavailable: {0}")]
    LookupUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Config file error: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RefoldError {
    fn from(err: reqwest::Error) -> Self {
        Self::LookupUnavailable(err.to_string())
    }
}
