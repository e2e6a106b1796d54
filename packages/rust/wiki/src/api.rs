//! MediaWiki Action API response shapes (`formatversion=2`).

use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope of an `action=query` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub query: Option<Query>,
    /// Parameters to send back to get the next batch.
    #[serde(default, rename = "continue")]
    pub continuation: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Query {
    #[serde(default)]
    pub pages: Vec<ApiPage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub fullurl: Option<String>,
    #[serde(default)]
    pub pageprops: Option<PageProps>,
    #[serde(default)]
    pub links: Vec<TitleRef>,
    #[serde(default)]
    pub extlinks: Vec<ExtLink>,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

impl ApiPage {
    /// The page exists and can be converted.
    pub fn exists(&self) -> bool {
        !self.missing && !self.invalid
    }

    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageProps {
    #[serde(default)]
    pub disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleRef {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtLink {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageInfo {
    pub url: String,
}

/// Flatten a `continue` object into query parameters.
pub(crate) fn continuation_params(continuation: &Map<String, Value>) -> Vec<(String, String)> {
    continuation
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
