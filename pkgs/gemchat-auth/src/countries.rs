//! Country dial codes for the phone form

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::AuthError;

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// Dial prefix such as `+44`
    pub dial: String,
}

impl Country {
    fn new(name: &str, code: &str, dial: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            dial: dial.to_string(),
        }
    }
}

/// Countries offered when the list cannot be fetched
pub fn fallback_countries() -> Vec<Country> {
    vec![
        Country::new("India", "IN", "+91"),
        Country::new("United States", "US", "+1"),
        Country::new("United Kingdom", "GB", "+44"),
        Country::new("Canada", "CA", "+1"),
        Country::new("Australia", "AU", "+61"),
        Country::new("Germany", "DE", "+49"),
    ]
}

#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<Country>, AuthError>;
}

/// Client for the restcountries.com v3.1 API
#[derive(Clone)]
pub struct RestCountriesClient {
    client: Client,
    url: String,
}

impl RestCountriesClient {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: url.into(),
        }
    }
}

impl Default for RestCountriesClient {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRIES_URL)
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<Country>, AuthError> {
        debug!("Fetching countries from {}", self.url);

        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_countries(&body)
    }
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    name: Option<RawName>,
    cca2: Option<String>,
    idd: Option<RawIdd>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIdd {
    root: Option<String>,
    suffixes: Option<Vec<String>>,
}

impl RawCountry {
    fn into_country(self) -> Option<Country> {
        let name = self.name.and_then(|n| n.common).filter(|n| !n.is_empty())?;
        let code = self.cca2.filter(|c| !c.is_empty())?;
        let idd = self.idd?;
        let root = idd.root.filter(|r| !r.is_empty())?;
        let suffix = idd.suffixes.and_then(|s| s.into_iter().next())?;

        Some(Country {
            name,
            code,
            dial: format!("{}{}", root, suffix),
        })
    }
}

/// Normalize a restcountries.com payload.
///
/// Entries without a name, code or dial prefix are dropped and the rest are
/// sorted by name. Anything other than a JSON array is an error.
pub fn parse_countries(body: &str) -> Result<Vec<Country>, AuthError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(AuthError::UnexpectedCountryPayload);
    };

    let mut countries: Vec<Country> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawCountry>(entry).ok())
        .filter_map(RawCountry::into_country)
        .collect();

    countries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(countries)
}

/// Fetch the country list, substituting [`fallback_countries`] on any failure
pub async fn load_countries(source: &dyn CountrySource) -> Vec<Country> {
    match source.fetch_countries().await {
        Ok(countries) if !countries.is_empty() => countries,
        Ok(_) => {
            warn!("Country list was empty, using fallback");
            fallback_countries()
        }
        Err(e) => {
            warn!("Failed to fetch countries: {}", e);
            fallback_countries()
        }
    }
}
