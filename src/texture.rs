use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|webp|svg\+xml);base64,([A-Za-z0-9+/\s]+=*)$").unwrap()
});
static REMOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

/// Room template image, already decoded by the caller and carried as an
/// href the diagram can embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    href: String,
}

impl Texture {
    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        Self { href: uri.into() }
    }

    pub fn from_bytes(bytes: &[u8], format: ImageFormat) -> Self {
        let encoded = BASE64_STANDARD.encode(bytes);
        Self {
            href: format!("data:{};base64,{}", format.mime_type(), encoded),
        }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// True when the reference can be embedded: an http(s) URL or an image
    /// data URI whose payload decodes.
    pub fn is_usable(&self) -> bool {
        let href = self.href.trim();
        if REMOTE_RE.is_match(href) {
            return true;
        }
        let Some(caps) = DATA_URI_RE.captures(href) else {
            return false;
        };
        let payload: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
        !payload.is_empty() && BASE64_STANDARD.decode(payload.as_bytes()).is_ok()
    }
}
