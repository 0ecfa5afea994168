use crate::error::{FetchError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Fewer characters than this never triggers a lookup.
const MIN_QUERY_LEN: usize = 2;
const SUGGESTION_LIMIT: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionList {
    pub suggestions: Vec<Suggestion>,
}

/// Autocomplete client for the Wikipedia OpenSearch endpoint.
pub struct SuggestClient {
    client: Client,
    api_url: String,
}

impl SuggestClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("WikiGrapher/0.1 (https://github.com/wikigrapher/wikigrapher)")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: "https://en.wikipedia.org".to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Look up page title suggestions for a query prefix.
    ///
    /// Short queries and lookup faults both degrade to an empty list.
    pub async fn suggest(&self, query: &str) -> SuggestionList {
        if query.chars().count() < MIN_QUERY_LEN {
            return SuggestionList::default();
        }

        match self.lookup(query).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Suggestion lookup failed for '{}': {}", query, e);
                SuggestionList::default()
            }
        }
    }

    async fn lookup(&self, query: &str) -> Result<SuggestionList> {
        let base = Url::parse(&self.api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        let endpoint = base
            .join("/w/api.php")
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        debug!("Suggestion lookup for '{}'", query);
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("action", "opensearch"),
                ("search", query),
                ("limit", &SUGGESTION_LIMIT.to_string()),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .send()
            .await?;

        // OpenSearch returns [query, [titles], [descriptions], [urls]].
        let data: serde_json::Value = response.json().await?;
        let titles = data
            .get(1)
            .and_then(|v| v.as_array())
            .ok_or_else(|| FetchError::ParseError("unexpected opensearch response".to_string()))?;

        let suggestions = titles
            .iter()
            .filter_map(|t| t.as_str())
            .map(|title| Suggestion {
                title: title.to_string(),
            })
            .collect();

        Ok(SuggestionList { suggestions })
    }
}

impl Default for SuggestClient {
    fn default() -> Self {
        Self::new()
    }
}
