//! Country list parsing and fallback tests

use async_trait::async_trait;
use gemchat_auth::{
    fallback_countries, load_countries, parse_countries, AuthError, Country, CountrySource,
    RestCountriesClient,
};

const SAMPLE: &str = r#"[
    {"name": {"common": "Germany"}, "cca2": "DE", "idd": {"root": "+4", "suffixes": ["9"]}},
    {"name": {"common": "antarctica"}, "cca2": "AQ", "idd": {}},
    {"name": {"common": "Canada"}, "cca2": "CA", "idd": {"root": "+1", "suffixes": []}},
    {"name": {"common": "Brazil"}, "cca2": "BR", "idd": {"root": "+5", "suffixes": ["5"]}},
    {"cca2": "XX", "idd": {"root": "+9", "suffixes": ["9"]}},
    {"name": {"common": "Åland Islands"}, "cca2": "AX", "idd": {"root": "+3", "suffixes": ["5818"]}},
    "garbage"
]"#;

#[test]
fn test_parse_drops_incomplete_entries_and_sorts() {
    let countries = parse_countries(SAMPLE).unwrap();

    let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Brazil", "Germany", "Åland Islands"]);
    assert_eq!(
        countries[1],
        Country {
            name: "Germany".to_string(),
            code: "DE".to_string(),
            dial: "+49".to_string(),
        }
    );
    assert_eq!(countries[2].dial, "+35818");
}

#[test]
fn test_parse_rejects_non_array() {
    assert!(matches!(
        parse_countries(r#"{"status": 404, "message": "Not Found"}"#),
        Err(AuthError::UnexpectedCountryPayload)
    ));
    assert!(matches!(parse_countries("<html>"), Err(AuthError::Json(_))));
}

struct StaticSource(Result<Vec<Country>, ()>);

#[async_trait]
impl CountrySource for StaticSource {
    async fn fetch_countries(&self) -> Result<Vec<Country>, AuthError> {
        match &self.0 {
            Ok(countries) => Ok(countries.clone()),
            Err(()) => Err(AuthError::UnexpectedCountryPayload),
        }
    }
}

#[tokio::test]
async fn test_load_uses_fetched_list() {
    let fetched = parse_countries(SAMPLE).unwrap();
    let source = StaticSource(Ok(fetched.clone()));

    assert_eq!(load_countries(&source).await, fetched);
}

#[tokio::test]
async fn test_load_falls_back_on_failure() {
    let countries = load_countries(&StaticSource(Err(()))).await;

    assert_eq!(countries, fallback_countries());
    assert_eq!(countries.len(), 6);
    assert_eq!(countries[0].name, "India");
}

#[tokio::test]
async fn test_load_falls_back_on_bad_url() {
    let client = RestCountriesClient::new("not a url");

    assert_eq!(load_countries(&client).await, fallback_countries());
}
