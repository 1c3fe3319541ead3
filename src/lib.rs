//! # Refoldr Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `engine`: Classificazione pura dei nomi delle cartelle (nessun I/O)
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per-cartella
//! - `file_manager`: Discovery delle cartelle e rename sicuri
//! - `deflat`: Pre-pass `Artista - Album` → `Artista/Album`
//! - `lookup`: Anno di pubblicazione da Discogs
//! - `journal`: File di log delle decisioni
//! - `refolder`: Orchestratore del run
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use refoldr::{Config, Refolder};
//!
//! let config = Config { dry_run: true, ..Config::default() };
//! let mut refolder = Refolder::new(&path, config).await?;
//! let stats = refolder.run().await?;
//! ```

pub mod config;
pub mod deflat;
pub mod engine;
pub mod error;
pub mod file_manager;
pub mod journal;
pub mod json_output;
pub mod lookup;
pub mod progress;
pub mod refolder;

pub use config::Config;
pub use engine::{classify, classify_with_lookup, classify_with_year, ClassifyOptions, Decision, RawName, SkipReason};
pub use error::RefoldError;
pub use lookup::{DiscogsClient, YearLookup};
pub use progress::RunStats;
pub use refolder::Refolder;
