use base64::Engine;
use base64::prelude::BASE64_STANDARD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Raster,
    Vector,
    Audio,
}

impl MediaKind {
    pub fn mime(self) -> &'static str {
        match self {
            MediaKind::Raster => "image/png",
            MediaKind::Vector => "image/svg+xml",
            MediaKind::Audio => "audio/ogg",
        }
    }
}

/// Maps an embed path to a media kind by extension. Anything outside the
/// supported set is unsupported and the whole embed is skipped.
pub fn media_kind(path: &str) -> Option<MediaKind> {
    let (_, ext) = path.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some(MediaKind::Raster),
        "svg" => Some(MediaKind::Vector),
        "ogg" => Some(MediaKind::Audio),
        _ => None,
    }
}

pub fn data_uri(kind: MediaKind, bytes: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(bytes);
    format!("data:{};base64,{encoded}", kind.mime())
}
