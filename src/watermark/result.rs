//! Output of a successful composite.

use crate::encoder::EncodedImage;
use crate::resource::ObjectUrlStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

/// Encoded watermarked image plus the handles derived from it.
///
/// `url` stays resolvable through the compositor's [`ObjectUrlStore`] (and
/// therefore usable as a `source` or watermark `image` in later requests) until
/// [`WatermarkResult::revoke`] is called, or until a capacity-bounded store
/// evicts it. Until then the store holds its own copy of `bytes`, so drop
/// results by revoking them.
#[derive(Clone)]
pub struct WatermarkResult {
    pub bytes: Bytes,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// `data:<mime>;base64,...`
    pub base64: String,
    /// `blob:canvas-watermark/<uuid>`
    pub url: String,
    store: ObjectUrlStore,
}

impl std::fmt::Debug for WatermarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkResult")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("url", &self.url)
            .finish()
    }
}

impl WatermarkResult {
    pub(crate) fn new(encoded: EncodedImage, width: u32, height: u32, store: &ObjectUrlStore) -> Self {
        let bytes = Bytes::from(encoded.data);
        let mime_type = encoded.content_type.to_string();
        let base64 = to_data_url(&mime_type, &bytes);
        let url = store.create(bytes.clone(), mime_type.clone());

        Self {
            bytes,
            mime_type,
            width,
            height,
            base64,
            url,
            store: store.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Release the object URL. Returns `false` when it was already released.
    pub fn revoke(&self) -> bool {
        self.store.revoke(&self.url)
    }
}

/// Build a base64 data URL.
pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}
