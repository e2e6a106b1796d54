//! Output of finished documents.
//!
//! [`FsWriter`] lays files out as follows:
//!
//! ```text
//! # images off
//! <root>/<Topic_Name>.md
//!
//! # images on
//! <root>/<topic>/
//! ├── <Topic_Name>.md
//! └── images/
//!     └── <decoded file name>
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use wikimd_markdown::heading;
use wikimd_shared::{ConvertConfig, Result, WikiMdError};

/// Subdirectory for downloaded images, relative to the document.
pub const IMAGE_DIR: &str = "images";

const USER_AGENT: &str = concat!("wikimd/", env!("CARGO_PKG_VERSION"));

/// Persists a finished document and its images.
pub trait DocumentWriter: Send + Sync {
    /// Write `markdown` for `topic` and return the path of the created file.
    fn write(
        &self,
        topic: &str,
        markdown: &str,
        images: &[String],
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

// ---------------------------------------------------------------------------
// FsWriter
// ---------------------------------------------------------------------------

/// Writes documents to the local filesystem, optionally downloading images.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
    download_images: bool,
    http: Client,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>, download_images: bool, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| WikiMdError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            root: root.into(),
            download_images,
            http,
        })
    }

    pub fn from_config(config: &ConvertConfig) -> Result<Self> {
        Self::new(
            &config.output_dir,
            config.download_images,
            config.source_timeout_secs,
        )
    }

    /// Download every image into `dir`, returning the names of those saved.
    /// Failures are logged and skipped.
    async fn save_images(&self, dir: &Path, images: &[String]) -> Vec<String> {
        let mut saved = Vec::with_capacity(images.len());

        for url in images {
            match self.save_image(dir, url).await {
                Ok(name) => {
                    debug!(%url, %name, "image saved");
                    saved.push(name);
                }
                Err(e) => warn!(%url, error = %e, "image download failed, skipping"),
            }
        }

        saved
    }

    async fn save_image(&self, dir: &Path, url: &str) -> Result<String> {
        let name = image_file_name(url)
            .ok_or_else(|| WikiMdError::validation(format!("no file name in image URL '{url}'")))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WikiMdError::Network(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiMdError::Network(format!("GET {url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WikiMdError::Network(format!("reading {url}: {e}")))?;

        let path = dir.join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| WikiMdError::io(&path, e))?;

        Ok(name)
    }
}

impl DocumentWriter for FsWriter {
    #[instrument(skip_all, fields(topic = %topic, images = images.len()))]
    async fn write(&self, topic: &str, markdown: &str, images: &[String]) -> Result<PathBuf> {
        let mut markdown = markdown.to_string();

        let dir = if self.download_images {
            let dir = self.root.join(path_component(topic));
            let image_dir = dir.join(IMAGE_DIR);
            tokio::fs::create_dir_all(&image_dir)
                .await
                .map_err(|e| WikiMdError::io(&image_dir, e))?;

            let saved = self.save_images(&image_dir, images).await;
            markdown.push_str(&image_block(&saved));
            dir
        } else {
            tokio::fs::create_dir_all(&self.root)
                .await
                .map_err(|e| WikiMdError::io(&self.root, e))?;
            self.root.clone()
        };

        let path = dir.join(document_file_name(topic));
        tokio::fs::write(&path, markdown)
            .await
            .map_err(|e| WikiMdError::io(&path, e))?;

        info!(path = %path.display(), "document written");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// `"Albert Einstein"` -> `"Albert_Einstein.md"`.
pub fn document_file_name(topic: &str) -> String {
    format!("{}.md", path_component(topic).replace(' ', "_"))
}

/// Percent-decoded last path segment of an image URL.
pub fn image_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.last()?;
    let decoded = percent_decode_str(last).decode_utf8_lossy();
    let name = path_component(&decoded);
    (!name.is_empty()).then_some(name)
}

/// Markdown block listing saved images. Empty when nothing was saved.
fn image_block(names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }

    let mut block = heading("Images", 2);
    for name in names {
        block.push_str(&format!("![{name}](./{IMAGE_DIR}/{name})\n"));
    }
    block
}

/// Keep a name inside its parent directory.
fn path_component(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wikimd-writer-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn file_names() {
        assert_eq!(document_file_name("Albert Einstein"), "Albert_Einstein.md");
        assert_eq!(document_file_name("AC/DC"), "AC_DC.md");
        assert_eq!(
            image_file_name("https://upload.example.org/a/ab/Einstein%201921.jpg"),
            Some("Einstein 1921.jpg".to_string())
        );
        assert_eq!(
            image_file_name("https://upload.example.org/x/Caf%C3%A9.png?width=200"),
            Some("Café.png".to_string())
        );
        assert_eq!(image_file_name("https://upload.example.org/"), None);
        assert_eq!(image_file_name("not a url"), None);
    }

    #[test]
    fn image_block_once() {
        assert_eq!(image_block(&[]), "");
        assert_eq!(
            image_block(&["a.png".into(), "b.svg".into()]),
            "## Images\n\n![a.png](./images/a.png)\n![b.svg](./images/b.svg)\n"
        );
    }

    #[tokio::test]
    async fn write_without_images() {
        let root = temp_dir();
        let writer = FsWriter::new(&root, false, 5).unwrap();

        let path = writer
            .write("Albert Einstein", "# Doc\n\n", &["https://x/y.png".into()])
            .await
            .unwrap();

        assert_eq!(path, root.join("Albert_Einstein.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Doc\n\n");
        assert!(!root.join("Albert Einstein").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn write_with_images_downloads_and_appends_one_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/Einstein%201921.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/Signature.svg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<svg/>".to_vec()))
            .mount(&server)
            .await;

        let root = temp_dir();
        let writer = FsWriter::new(&root, true, 5).unwrap();
        let images = vec![
            format!("{}/img/Einstein%201921.jpg", server.uri()),
            format!("{}/img/Signature.svg", server.uri()),
        ];

        let path = writer
            .write("Albert Einstein", "# Doc\n\n", &images)
            .await
            .unwrap();

        let dir = root.join("Albert Einstein");
        assert_eq!(path, dir.join("Albert_Einstein.md"));
        assert_eq!(
            std::fs::read(dir.join("images").join("Einstein 1921.jpg")).unwrap(),
            b"jpeg"
        );
        assert!(dir.join("images").join("Signature.svg").exists());

        let doc = std::fs::read_to_string(&path).unwrap();
        assert_eq!(doc.matches("## Images").count(), 1);
        assert!(doc.ends_with(
            "## Images\n\n![Einstein 1921.jpg](./images/Einstein 1921.jpg)\n![Signature.svg](./images/Signature.svg)\n"
        ));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn failed_image_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/ok.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let root = temp_dir();
        let writer = FsWriter::new(&root, true, 5).unwrap();
        let images = vec![
            format!("{}/img/gone.png", server.uri()),
            format!("{}/img/ok.png", server.uri()),
        ];

        let path = writer.write("Topic", "", &images).await.unwrap();
        let doc = std::fs::read_to_string(&path).unwrap();

        assert_eq!(doc, "## Images\n\n![ok.png](./images/ok.png)\n");
        assert!(!root.join("Topic").join("images").join("gone.png").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn images_enabled_without_images_writes_no_block() {
        let root = temp_dir();
        let writer = FsWriter::new(&root, true, 5).unwrap();

        let path = writer.write("Topic", "body\n", &[]).await.unwrap();

        assert_eq!(path, root.join("Topic").join("Topic.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "body\n");

        let _ = std::fs::remove_dir_all(&root);
    }
}
