use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;

use super::images::ImageFetcher;

/// In-memory fetcher for tests. Unknown URLs behave like failed fetches.
pub(crate) struct StubFetcher {
    responses: HashMap<String, Bytes>,
}

impl StubFetcher {
    pub(crate) fn new(entries: Vec<(&str, Bytes)>) -> Self {
        StubFetcher {
            responses: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub(crate) fn empty() -> Self {
        StubFetcher { responses: HashMap::new() }
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        self.responses.get(url).cloned()
    }
}

/// Solid-color PNG of the given size, encoded in memory.
pub(crate) fn png_fixture(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 90, 60]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("encode fixture png");
    Bytes::from(buf)
}
