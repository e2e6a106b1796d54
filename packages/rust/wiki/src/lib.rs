//! MediaWiki page provider.
//!
//! Looks a topic up across an ordered list of language editions, parses the
//! plain-text extract into a section tree, and collects the page's outbound
//! article links, external references, and image URLs. Each outbound link is
//! handed out as a [`WikiLink`] that resolves its canonical URL on demand.

mod api;
mod extract;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use wikimd_shared::{
    ConvertConfig, LANG_PLACEHOLDER, LinkTarget, Page, PageProvider, Result, WikiMdError,
};

use crate::api::{ApiPage, QueryResponse, continuation_params};

pub use extract::{ParsedExtract, parse_extract};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("wikimd/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Upper bound on `continue` round-trips for a single listing.
const MAX_CONTINUATIONS: usize = 100;

// ---------------------------------------------------------------------------
// WikiClient
// ---------------------------------------------------------------------------

/// MediaWiki Action API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
    /// Endpoint template containing `{lang}`.
    api_url: String,
}

impl WikiClient {
    /// Create a client for the endpoint template `api_url`.
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let api_url = api_url.into();
        if !api_url.contains(LANG_PLACEHOLDER) {
            return Err(WikiMdError::config(format!(
                "API URL '{api_url}' has no {LANG_PLACEHOLDER} placeholder"
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| WikiMdError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, api_url })
    }

    /// Create a client from the runtime configuration.
    pub fn from_config(config: &ConvertConfig) -> Result<Self> {
        Self::new(&config.api_url, config.source_timeout_secs)
    }

    fn endpoint(&self, language: &str) -> String {
        self.api_url.replace(LANG_PLACEHOLDER, language)
    }

    /// Resolve the canonical URL of the article `title`.
    pub async fn page_url(&self, language: &str, title: &str) -> Result<String> {
        let params = [("prop", "info"), ("inprop", "url"), ("titles", title)];
        let response = self.query(language, &owned(&params)).await?;

        response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|page| page.fullurl)
            .ok_or_else(|| WikiMdError::parse(format!("no URL returned for '{title}'")))
    }

    /// Look `topic` up in one language. `None` if the page does not exist there.
    async fn lookup(&self, language: &str, topic: &str) -> Result<Option<ApiPage>> {
        let params = [
            ("prop", "extracts|info|pageprops"),
            ("explaintext", "1"),
            ("exsectionformat", "wiki"),
            ("inprop", "url"),
            ("ppprop", "disambiguation"),
            ("redirects", "1"),
            ("titles", topic),
        ];
        let response = self.query(language, &owned(&params)).await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(ApiPage::exists))
    }

    /// Main-namespace article titles linked from `title`.
    async fn link_titles(&self, language: &str, title: &str) -> Result<Vec<String>> {
        let params = [
            ("prop", "links"),
            ("plnamespace", "0"),
            ("pllimit", "max"),
            ("titles", title),
        ];
        let pages = self.query_all(language, &owned(&params)).await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.links)
            .map(|link| link.title)
            .collect())
    }

    /// External reference URLs of `title`.
    async fn external_links(&self, language: &str, title: &str) -> Result<Vec<String>> {
        let params = [("prop", "extlinks"), ("ellimit", "max"), ("titles", title)];
        let pages = self.query_all(language, &owned(&params)).await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.extlinks)
            .map(|link| link.url)
            .collect())
    }

    /// Direct file URLs of the images used on `title`.
    async fn image_urls(&self, language: &str, title: &str) -> Result<Vec<String>> {
        let params = [
            ("generator", "images"),
            ("gimlimit", "max"),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
            ("titles", title),
        ];
        let pages = self.query_all(language, &owned(&params)).await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.imageinfo)
            .map(|info| info.url)
            .collect())
    }

    /// Run a listing query, following `continue` until the result is complete.
    async fn query_all(&self, language: &str, params: &[(String, String)]) -> Result<Vec<ApiPage>> {
        let mut pages = Vec::new();
        let mut continuation: Vec<(String, String)> = Vec::new();

        for _ in 0..MAX_CONTINUATIONS {
            let mut request = params.to_vec();
            request.extend(continuation.iter().cloned());

            let response = self.query(language, &request).await?;
            if let Some(query) = response.query {
                pages.extend(query.pages);
            }

            match response.continuation {
                Some(next) => continuation = continuation_params(&next),
                None => return Ok(pages),
            }
        }

        warn!(
            language,
            max = MAX_CONTINUATIONS,
            "listing truncated after too many continuations"
        );
        Ok(pages)
    }

    /// Send one `action=query` request and decode the response.
    async fn query(&self, language: &str, params: &[(String, String)]) -> Result<QueryResponse> {
        let url = self.endpoint(language);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| WikiMdError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiMdError::Network(format!("{url}: HTTP {status}")));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| WikiMdError::parse(format!("{url}: invalid API response: {e}")))?;

        if let Some(error) = &body.error {
            return Err(WikiMdError::Network(format!(
                "{url}: API error {}: {}",
                error.code, error.info
            )));
        }

        Ok(body)
    }
}

fn owned(params: &[(&str, &str)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl PageProvider for WikiClient {
    type Link = WikiLink;

    #[instrument(skip_all, fields(topic = %topic))]
    async fn fetch_page(&self, topic: &str, languages: &[String]) -> Result<Page<WikiLink>> {
        if topic.trim().is_empty() {
            return Err(WikiMdError::validation("topic must not be empty"));
        }

        for language in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            let Some(found) = self.lookup(language, topic).await? else {
                debug!(language, "page not found in language");
                continue;
            };

            if found.is_disambiguation() {
                let options = self.link_titles(language, &found.title).await?;
                info!(language, candidates = options.len(), "topic is a disambiguation page");
                return Err(WikiMdError::Disambiguation {
                    topic: topic.to_string(),
                    options,
                });
            }

            let url = found.fullurl.clone().ok_or_else(|| {
                WikiMdError::parse(format!("no URL returned for '{}'", found.title))
            })?;

            let (link_titles, references, images) = tokio::try_join!(
                self.link_titles(language, &found.title),
                self.external_links(language, &found.title),
                self.image_urls(language, &found.title),
            )?;

            let parsed = parse_extract(found.extract.as_deref().unwrap_or_default());

            let links: BTreeMap<String, WikiLink> = link_titles
                .into_iter()
                .map(|title| {
                    let link = WikiLink {
                        client: self.clone(),
                        language: language.to_string(),
                        title: title.clone(),
                    };
                    (title, link)
                })
                .collect();

            info!(
                language,
                title = %found.title,
                sections = parsed.sections.len(),
                links = links.len(),
                references = references.len(),
                images = images.len(),
                "page retrieved"
            );

            return Ok(Page {
                title: found.title,
                url,
                language: language.to_string(),
                summary: parsed.summary,
                sections: parsed.sections,
                links,
                references,
                images,
            });
        }

        Err(WikiMdError::NotFound {
            topic: topic.to_string(),
            languages: languages.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// WikiLink
// ---------------------------------------------------------------------------

/// An outbound article link whose URL is looked up on demand.
#[derive(Debug, Clone)]
pub struct WikiLink {
    client: WikiClient,
    language: String,
    title: String,
}

impl WikiLink {
    /// Linked article title.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl LinkTarget for WikiLink {
    async fn resolve(&self) -> Result<String> {
        self.client.page_url(&self.language, &self.title).await
    }
}
