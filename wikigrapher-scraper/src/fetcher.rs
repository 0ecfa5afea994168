use crate::error::{FetchError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, warn};

/// Anything that can resolve a page id to its ordered outbound links.
///
/// Implementations must never fail: a page that cannot be retrieved or
/// parsed contributes an empty link list.
pub trait LinkFetcher: Send + Sync {
    fn fetch_links(&self, page: &str) -> impl Future<Output = Vec<String>> + Send;
}

const ARTICLE_PREFIX: &str = "/wiki/";

/// Link namespaces that never count as article references.
const EXCLUDED_NAMESPACES: [&str; 6] = [
    "Wikipedia:",
    "Talk:",
    "Special:",
    "File:",
    "Help:",
    "Category:",
];

/// Fetches Wikipedia articles over HTTP and extracts the links referenced
/// from the article body.
pub struct WikipediaFetcher {
    client: Client,
    base_url: String,
}

impl WikipediaFetcher {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("WikiGrapher/0.1 (https://github.com/wikigrapher/wikigrapher)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: "https://en.wikipedia.org".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn scrape_page(&self, page: &str) -> Result<Vec<String>> {
        let url = format!("{}{}{}", self.base_url, ARTICLE_PREFIX, page);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16(), page.to_string()));
        }

        let body = response.text().await?;
        Ok(extract_article_links(&body, page))
    }
}

impl Default for WikipediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkFetcher for WikipediaFetcher {
    fn fetch_links(&self, page: &str) -> impl Future<Output = Vec<String>> + Send {
        async move {
            match self.scrape_page(page).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("Fetch failed for {}: {}", page, e);
                    Vec::new()
                }
            }
        }
    }
}

/// Extract the referenced article names from a Wikipedia page body.
///
/// Mirrors how readers see an article: collection starts at the
/// `firstHeading` title (a page without one yields nothing), stops at the
/// "See also"/"References" heading, and only anchors sitting inside
/// paragraphs, lists, figure captions, or tables count. Anchors wrapping an
/// image, links into non-article namespaces, and the page's own name are
/// dropped. Order is first occurrence, de-duplicated by href.
pub fn extract_article_links(html: &str, page: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let img_selector = Selector::parse("img").unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();
    let mut in_article = false;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let name = element.value().name();
        let id = element.value().id();

        if !in_article {
            if name == "h1" && id == Some("firstHeading") {
                in_article = true;
            }
            continue;
        }

        // End of the readable article body.
        if name == "h2" && matches!(id, Some("See_also") | Some("References")) {
            break;
        }

        if name != "a" {
            continue;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(target) = href.strip_prefix(ARTICLE_PREFIX) else {
            continue;
        };
        if !has_content_ancestor(element) {
            continue;
        }
        if element.select(&img_selector).next().is_some() {
            continue;
        }
        if EXCLUDED_NAMESPACES.iter().any(|ns| target.starts_with(ns)) {
            continue;
        }
        if target == page {
            continue;
        }
        if seen.insert(href.to_string()) {
            links.push(target.to_string());
        }
    }

    links
}

fn has_content_ancestor(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "p" | "ul" | "figcaption" | "table"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE_HTML: &str = r#"<html><body>
        <ul><li><a href="/wiki/Main_Page">nav link before the title</a></li></ul>
        <h1 id="firstHeading">Fergana (moth)</h1>
        <p>
            A <a href="/wiki/Moth">moth</a> is an
            <a href="/wiki/Insect">insect</a>.
            The <a href="/wiki/Moth">moth</a> again.
            <a href="/wiki/Category:Moths">category</a>
            <a href="/wiki/File:Moth.jpg"><img src="moth.jpg"></a>
        </p>
        <ul><li><a href="/wiki/Lepidoptera">Lepidoptera</a></li></ul>
        <div><a href="/wiki/Sidebar_Thing">not body content</a></div>
        <table><tr><td><a href="/wiki/Taxonomy">Taxonomy</a></td></tr></table>
        <h2 id="References">References</h2>
        <p><a href="/wiki/After_References">should not appear</a></p>
    </body></html>"#;

    #[test]
    fn test_extract_links_order_and_filters() {
        let links = extract_article_links(ARTICLE_HTML, "Fergana_(moth)");
        assert_eq!(links, vec!["Moth", "Insect", "Lepidoptera", "Taxonomy"]);
    }

    #[test]
    fn test_extract_links_excludes_own_page() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Moth</h1>
            <p><a href="/wiki/Moth">self</a> <a href="/wiki/Insect">other</a></p>
        </body></html>"#;
        let links = extract_article_links(html, "Moth");
        assert_eq!(links, vec!["Insect"]);
    }

    #[test]
    fn test_extract_links_without_title_yields_nothing() {
        let html = r#"<html><body>
            <p><a href="/wiki/Moth">moth</a></p>
        </body></html>"#;
        assert!(extract_article_links(html, "Whatever").is_empty());
    }

    #[test]
    fn test_extract_links_stops_at_see_also() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Title</h1>
            <p><a href="/wiki/Kept">kept</a></p>
            <h2 id="See_also">See also</h2>
            <p><a href="/wiki/Dropped">dropped</a></p>
        </body></html>"#;
        assert_eq!(extract_article_links(html, "Title"), vec!["Kept"]);
    }

    #[tokio::test]
    async fn test_fetch_links_from_server() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wiki/Fergana_(moth)"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(ARTICLE_HTML.as_bytes()),
            )
            .mount(&mock_server)
            .await;

        let fetcher = WikipediaFetcher::new().with_base_url(mock_server.uri());
        let links = fetcher.fetch_links("Fergana_(moth)").await;
        assert_eq!(links, vec!["Moth", "Insect", "Lepidoptera", "Taxonomy"]);
    }

    #[tokio::test]
    async fn test_fetch_links_degrades_on_missing_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wiki/No_Such_Page"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = WikipediaFetcher::new().with_base_url(mock_server.uri());
        assert!(fetcher.fetch_links("No_Such_Page").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_links_degrades_on_connection_error() {
        // Nothing listens here; the fetcher must swallow the fault.
        let fetcher = WikipediaFetcher::with_timeout(1).with_base_url("http://127.0.0.1:9");
        assert!(fetcher.fetch_links("Anything").await.is_empty());
    }
}
