//! # Refoldr - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Caricamento di `.env` (token Discogs) con `dotenvy`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Unione di file di configurazione e flag CLI, poi avvio del `Refolder`
//!
//! ## Flusso di esecuzione:
//! 1. Carica `.env` se presente e parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` se impostato)
//! 3. Legge il file di configurazione (se esiste) e applica i flag sopra di esso
//! 4. Istanzia `Refolder` e avvia il run
//!
//! ## Esempio di utilizzo:
//! ```bash
//! refoldr /music --dry-run --edge r,d --level 1,2 --deflat --verbose
//! refoldr /music/Queen/Jazz --level=-1,0
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use refoldr::{Config, Refolder};

#[derive(Parser)]
#[command(name = "refoldr")]
#[command(about = "Rename album folders to 'YYYY - Title' across a music library")]
struct Args {
    /// Library root to process
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Dry run - log decisions without renaming anything
    #[arg(short, long)]
    dry_run: bool,

    /// Edge cases to rename instead of skip: r (remaster), d (deluxe), m (anthology)
    #[arg(short, long, value_name = "LIST")]
    edge: Option<String>,

    /// Artist and album levels as START,END (e.g. 1,2 or -1,0)
    #[arg(short, long, value_name = "START,END", allow_hyphen_values = true)]
    level: Option<String>,

    /// Split flat 'Artist - Album' folders into Artist/Album first
    #[arg(long)]
    deflat: bool,

    /// Discogs personal access token, enables the year lookup
    #[arg(long, env = "DISCOGS_TOKEN", hide_env_values = true)]
    discogs_token: Option<String>,

    /// Directory for renamed.log, skipped.log, not_found.log and deflat.log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file (default: <config dir>/refoldr/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit one JSON event per line on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Flags override whatever the configuration file says
    fn apply_to(self, config: &mut Config) -> Result<()> {
        config.dry_run |= self.dry_run;
        config.deflat |= self.deflat;
        config.json_output |= self.json;

        if let Some(edge) = self.edge {
            config.edges = Config::parse_edges(&edge)?;
        }
        if let Some(level) = self.level {
            let (start, end) = Config::parse_levels(&level)?;
            config.start_level = start;
            config.end_level = end;
        }
        if let Some(log_dir) = self.log_dir {
            config.log_dir = log_dir;
        }
        config.discogs_token = self.discogs_token;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if args.json {
        // stdout belongs to the JSON events
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    if let Some(path) = config_path.filter(|path| path.exists()) {
        info!("Loaded configuration from {}", path.display());
    }

    let root = args.root.clone();
    args.apply_to(&mut config)?;

    let mut refolder = Refolder::new(&root, config).await?;
    refolder.run().await?;

    Ok(())
}
