pub mod aggregate;
pub mod images;
pub mod layout;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;
use std::time::Duration;

use crate::core::{EngineError, EngineResult};
use crate::generators;
use crate::models::{filename_for, DocumentRequest, GenerationResult, RendererFamily};
use images::{resolve_request_images, HttpImageFetcher, ImageFetcher, ImageSet};

pub use aggregate::{aggregate, GroupBy, GroupOrder};
pub use images::ResolvedImage;
pub use timeline::{derive_timeline, Timeline, TimelineRules};

/// Default deadline for one outbound image fetch.
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Entry point for document generation. One engine serves any number of
/// concurrent requests; it holds no per-request state.
pub struct DocumentEngine {
    fetcher: Arc<dyn ImageFetcher>,
}

impl DocumentEngine {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        DocumentEngine { fetcher }
    }

    /// Engine backed by a real HTTP client with the given fetch timeout.
    pub fn with_http_fetcher(timeout_ms: u64) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| EngineError::Render(format!("HTTP client setup failed: {e}")))?;
        Ok(DocumentEngine::new(Arc::new(HttpImageFetcher::new(client))))
    }

    /// Runs one generation request to completion. Never returns an error and
    /// never panics: every failure comes back as `success: false`. A byte
    /// buffer is only ever present when the whole document was built.
    pub async fn generate(&self, request: DocumentRequest) -> GenerationResult {
        if let Err(message) = request.validate() {
            tracing::warn!("Rejected generation request: {}", message);
            return GenerationResult::failed(message);
        }

        let kind = request.kind;
        let filename = filename_for(kind, &request.client_name);
        tracing::debug!(kind = ?kind, items = request.items.len(), "Generating {}", filename);

        // Every image the chosen kind embeds is resolved before layout,
        // since page counts depend on what actually got embedded.
        let images = resolve_request_images(self.fetcher.as_ref(), &request).await;

        let rendered =
            tokio::task::spawn_blocking(move || render_document(&request, &images)).await;

        match rendered {
            Ok(Ok(bytes)) => {
                tracing::info!("Generated {} ({} bytes)", filename, bytes.len());
                GenerationResult::completed(bytes, filename, kind.mime_type())
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to generate {}: {}", filename, e);
                GenerationResult::failed(e.to_string())
            }
            Err(join_error) => {
                let message = panic_message(join_error);
                tracing::error!("Render task for {} panicked: {}", filename, message);
                GenerationResult::failed(EngineError::RenderPanic(message).to_string())
            }
        }
    }
}

impl Default for DocumentEngine {
    fn default() -> Self {
        DocumentEngine::with_http_fetcher(DEFAULT_FETCH_TIMEOUT_MS)
            .unwrap_or_else(|_| DocumentEngine::new(Arc::new(NullFetcher)))
    }
}

/// Fallback fetcher used only if HTTP client construction fails; documents
/// still generate, just without embedded images.
struct NullFetcher;

#[async_trait::async_trait]
impl ImageFetcher for NullFetcher {
    async fn fetch(&self, url: &str) -> Option<bytes::Bytes> {
        tracing::warn!("No HTTP fetcher available, dropping image {}", url);
        None
    }
}

/// Dispatches to the renderer family. Runs on a blocking thread; errors and
/// panics are both converted at the [`DocumentEngine::generate`] boundary.
fn render_document(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    match request.kind.family() {
        RendererFamily::Slides => generators::slides::render(request, images),
        RendererFamily::Spreadsheet => generators::spreadsheet::render(request, images),
        RendererFamily::FixedPage => generators::pdf::render(request, images),
        RendererFamily::Flowing => generators::word::render(request, images),
    }
}

fn panic_message(join_error: tokio::task::JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    let payload = join_error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
