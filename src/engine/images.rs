use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use futures::future::join_all;

use crate::models::{DocumentKind, DocumentRequest, SectionKind};

/// Payloads past this size are treated as failed fetches.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Decoded, renderer-ready image. Holds both the normalized PNG container
/// (slide and word embedding) and the raw RGB pixels (fixed-page embedding).
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    pub rgb: Vec<u8>,
}

impl ResolvedImage {
    /// Decodes any supported container. Returns `None` for bytes that do not
    /// decode, the same contract as a failed fetch.
    pub fn from_bytes(bytes: &[u8]) -> Option<ResolvedImage> {
        let decoded = image::load_from_memory(bytes).ok()?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(rgb.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .ok()?;

        Some(ResolvedImage { width, height, png, rgb: rgb.into_raw() })
    }

    /// Aspect ratio as width / height.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

/// Fetch seam so generation can run against a stub in tests.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches one reference. Any failure yields `None`, never an error.
    async fn fetch(&self, url: &str) -> Option<Bytes>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpImageFetcher { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Image fetch failed for {}: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!("Image fetch for {} returned {}", url, response.status());
            return None;
        }
        match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Image body read failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Fetches and decodes one reference. A single attempt, no retry.
/// `data:image/...;base64,` URIs are decoded in place without a fetch.
pub async fn resolve(fetcher: &dyn ImageFetcher, reference: &str) -> Option<ResolvedImage> {
    let bytes = if let Some(rest) = reference.strip_prefix("data:") {
        decode_data_uri(rest)?
    } else {
        fetcher.fetch(reference).await?
    };
    if bytes.len() > MAX_IMAGE_BYTES {
        tracing::warn!("Image payload of {} bytes exceeds the cap, skipping", bytes.len());
        return None;
    }
    let image = ResolvedImage::from_bytes(&bytes);
    if image.is_none() {
        tracing::warn!("Image at {} did not decode, skipping", truncate_ref(reference));
    }
    image
}

fn decode_data_uri(rest: &str) -> Option<Bytes> {
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        tracing::warn!("Unsupported data URI encoding '{}', skipping", header);
        return None;
    }
    match base64::engine::general_purpose::STANDARD.decode(payload.trim()) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            tracing::warn!("Invalid base64 in data URI: {}", e);
            None
        }
    }
}

/// Data URIs would otherwise dump kilobytes of base64 into the log line.
fn truncate_ref(reference: &str) -> &str {
    let end = reference
        .char_indices()
        .nth(96)
        .map(|(i, _)| i)
        .unwrap_or(reference.len());
    &reference[..end]
}

/// Everything a renderer may embed, resolved up front. Failed references are
/// simply absent so layout proceeds without them.
#[derive(Debug, Default)]
pub struct ImageSet {
    pub logo: Option<ResolvedImage>,
    pub sections: HashMap<SectionKind, Vec<ResolvedImage>>,
    /// Item photos keyed by item position.
    pub items: HashMap<u32, ResolvedImage>,
    /// Technical drawings keyed by item position.
    pub drawings: HashMap<u32, ResolvedImage>,
}

impl ImageSet {
    pub fn section(&self, kind: SectionKind) -> &[ResolvedImage] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn for_item(&self, position: u32) -> Option<&ResolvedImage> {
        self.items.get(&position)
    }

    pub fn drawing_for(&self, position: u32) -> Option<&ResolvedImage> {
        self.drawings.get(&position)
    }

    pub fn resolved_count(&self) -> usize {
        let sections: usize = self.sections.values().map(Vec::len).sum();
        sections
            + self.items.len()
            + self.drawings.len()
            + usize::from(self.logo.is_some())
    }
}

enum Slot {
    Logo,
    Section(SectionKind),
    Item(u32),
    Drawing(u32),
}

/// Which of a request's image references the chosen kind actually embeds.
/// Spreadsheets embed none, so their generation never waits on the network.
struct SlotMask {
    logo: bool,
    sections: bool,
    items: bool,
    drawings: bool,
}

fn slots_for(kind: DocumentKind) -> SlotMask {
    match kind {
        DocumentKind::BudgetDeck => {
            SlotMask { logo: true, sections: true, items: true, drawings: false }
        }
        DocumentKind::TechnicalSheet => {
            SlotMask { logo: true, sections: false, items: true, drawings: true }
        }
        DocumentKind::ShoppingList | DocumentKind::BudgetWorkbook => {
            SlotMask { logo: false, sections: false, items: false, drawings: false }
        }
        DocumentKind::ScheduleDeck
        | DocumentKind::Proposal
        | DocumentKind::ScheduleDocument
        | DocumentKind::ProposalDocument => {
            SlotMask { logo: true, sections: false, items: false, drawings: false }
        }
    }
}

/// Resolves every image reference the requested kind embeds, with parallel
/// outstanding fetches. One failing reference never affects the others.
pub async fn resolve_request_images(
    fetcher: &dyn ImageFetcher,
    request: &DocumentRequest,
) -> ImageSet {
    let mask = slots_for(request.kind);
    let mut refs: Vec<(Slot, &str)> = Vec::new();

    if mask.logo {
        if let Some(logo) = request.logo_url.as_deref() {
            refs.push((Slot::Logo, logo));
        }
    }
    if mask.sections {
        for section in &request.sections {
            for url in &section.images {
                refs.push((Slot::Section(section.kind), url));
            }
        }
    }
    for item in &request.items {
        let fields = item.fields();
        if mask.items {
            if let Some(url) = fields.image_url.as_deref() {
                refs.push((Slot::Item(fields.position), url));
            }
        }
        if mask.drawings {
            if let Some(url) = item.drawing_url() {
                refs.push((Slot::Drawing(fields.position), url));
            }
        }
    }

    let fetches = refs.iter().map(|(_, url)| resolve(fetcher, url));
    let resolved = join_all(fetches).await;

    let mut set = ImageSet::default();
    for ((slot, _), image) in refs.into_iter().zip(resolved) {
        let Some(image) = image else { continue };
        match slot {
            Slot::Logo => set.logo = Some(image),
            Slot::Section(kind) => set.sections.entry(kind).or_default().push(image),
            Slot::Item(position) => {
                set.items.insert(position, image);
            }
            Slot::Drawing(position) => {
                set.drawings.insert(position, image);
            }
        }
    }
    set
}
