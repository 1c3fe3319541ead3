//! # Metadata Lookup Module
//!
//! Recupera l'anno di pubblicazione di un album quando il nome della cartella non lo contiene.
//!
//! ## Responsabilità:
//! - Definisce il trait `YearLookup` usato dall'orchestratore
//! - Implementa `DiscogsClient` (ricerca `type=master` su api.discogs.com)
//! - Normalizza artista e titolo per la ricerca (ASCII, niente parentesi né punteggiatura)
//! - Rispetta il rate limit Discogs con una pausa prima di ogni richiesta
//!
//! Senza token il lookup è disabilitato: nessun errore, il motore non chiede mai l'anno.
//! Errori di rete, timeout o autenticazione diventano `LookupUnavailable` e l'orchestratore
//! li tratta come "anno non disponibile".

use crate::config::Config;
use crate::engine::LookupQuery;
use crate::error::RefoldError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

const DISCOGS_SEARCH_URL: &str = "https://api.discogs.com/database/search";
const USER_AGENT: &str = concat!("refoldr/", env!("CARGO_PKG_VERSION"));

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\(\[].*?[\)\]]").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["'_\-]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source of a fallback release year
#[async_trait]
pub trait YearLookup: Send + Sync {
    /// `Ok(None)` means the service answered but knows no year
    async fn find_year(&self, query: &LookupQuery) -> Result<Option<u16>, RefoldError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    year: Option<serde_json::Value>,
}

/// Discogs database search client
pub struct DiscogsClient {
    client: Client,
    base_url: String,
    token: String,
    delay: Duration,
}

impl DiscogsClient {
    pub fn new(token: impl Into<String>, timeout: Duration, delay: Duration) -> Result<Self, RefoldError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: DISCOGS_SEARCH_URL.to_string(),
            token: token.into(),
            delay,
        })
    }

    /// Build a client when a token is configured, `None` otherwise
    pub fn from_config(config: &Config) -> Result<Option<Self>, RefoldError> {
        if !config.lookup_enabled() {
            return Ok(None);
        }
        let token = config.discogs_token.clone().unwrap_or_default();
        Self::new(
            token.trim(),
            Duration::from_secs(config.lookup_timeout_secs),
            Duration::from_millis(config.lookup_delay_ms),
        )
        .map(Some)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl YearLookup for DiscogsClient {
    async fn find_year(&self, query: &LookupQuery) -> Result<Option<u16>, RefoldError> {
        let artist = normalize_query(query.artist.as_deref().unwrap_or_default());
        let title = normalize_query(&query.title);

        tokio::time::sleep(self.delay).await;
        debug!("Discogs search: artist='{}' release_title='{}'", artist, title);

        let params = [
            ("artist", artist.as_str()),
            ("release_title", title.as_str()),
            ("token", self.token.as_str()),
            ("type", "master"),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;

        Ok(first_year(&body))
    }
}

/// Year of the first result that carries a plausible one
fn first_year(body: &SearchResponse) -> Option<u16> {
    body.results
        .iter()
        .filter_map(|result| result.year.as_ref())
        .find_map(parse_year)
}

fn parse_year(value: &serde_json::Value) -> Option<u16> {
    let year = match value {
        serde_json::Value::Number(number) => number.as_u64()?,
        serde_json::Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    (1900..=2099).contains(&year).then_some(year as u16)
}

/// Fold a search term to plain ASCII words
pub fn normalize_query(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let text = BRACKETED.replace_all(&ascii, "");
    let text = PUNCTUATION.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("Motörhead"), "Motorhead");
        assert_eq!(normalize_query("Guns N' Roses"), "Guns N Roses");
        assert_eq!(normalize_query("Hits (Remastered) [Live]"), "Hits");
        assert_eq!(normalize_query("Blink-182  Enema_of"), "Blink 182 Enema of");
        assert_eq!(normalize_query("Björk – Post"), "Bjork Post");
    }

    #[test]
    fn test_first_year_from_search_body() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"results": [{"title": "no year"}, {"year": ""}, {"year": "1977"}, {"year": 1980}]}"#,
        )
        .unwrap();
        assert_eq!(first_year(&body), Some(1977));

        let body: SearchResponse = serde_json::from_str(r#"{"results": [{"year": 1980}]}"#).unwrap();
        assert_eq!(first_year(&body), Some(1980));

        let body: SearchResponse = serde_json::from_str(r#"{"pagination": {}}"#).unwrap();
        assert_eq!(first_year(&body), None);
    }

    #[test]
    fn test_implausible_years_ignored() {
        assert_eq!(parse_year(&serde_json::json!(0)), None);
        assert_eq!(parse_year(&serde_json::json!("1850")), None);
        assert_eq!(parse_year(&serde_json::json!(2024)), Some(2024));
    }

    #[test]
    fn test_lookup_disabled_without_token() {
        let config = Config::default();
        assert!(DiscogsClient::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let client = DiscogsClient::new("token", Duration::from_secs(2), Duration::ZERO)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/database/search");
        let query = LookupQuery {
            artist: Some("Queen".to_string()),
            title: "Jazz".to_string(),
        };

        let result = client.find_year(&query).await;
        assert!(matches!(result, Err(RefoldError::LookupUnavailable(_))));
    }
}
