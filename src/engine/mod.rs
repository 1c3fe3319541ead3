//! # Engine Module
//!
//! Cuore puro della classificazione, separato in stadi testabili singolarmente:
//! - `normalizer`: Pulizia del testo grezzo
//! - `extractor`: Anni, disco, casi limite e residuo
//! - `artist`: Rimozione del prefisso artista
//! - `classifier`: Composizione degli stadi e decisione finale

pub mod artist;
pub mod classifier;
pub mod extractor;
pub mod normalizer;

pub use artist::strip_artist_prefix;
pub use classifier::{
    classify, classify_with_lookup, classify_with_year, ClassifyOptions, Decision, LookupQuery,
    RawName, SkipReason,
};
pub use extractor::{extract, EdgeCategory, EdgeFlags, ParsedFields};
pub use normalizer::{normalize, NormalizedName};
