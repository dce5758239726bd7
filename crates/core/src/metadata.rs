/// Protocol-specific media descriptions
///
/// DIDL-Lite is the metadata format UPnP renderers expect alongside
/// SetAVTransportURI; media centers only need a JSON playlist item.
use crate::models::MediaReference;
use crate::title::clean_title;
use serde_json::{json, Value};

/// Conservative DLNA flags: streaming transfer mode, byte-seek, no time-seek
pub const DLNA_PROTOCOL_FLAGS: &str =
    "DLNA.ORG_OP=01;DLNA.ORG_CI=0;DLNA.ORG_FLAGS=01700000000000000000000000000000";

pub const VIDEO_ITEM_CLASS: &str = "object.item.videoItem";

/// Everything the DIDL-Lite document is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidlMetadata {
    pub title: String,
    pub mime_type: &'static str,
    pub protocol_info: String,
    pub url: String,
    pub size_bytes: Option<u64>,
}

impl DidlMetadata {
    pub fn from_media(media: &MediaReference) -> Self {
        let filename = media.display_filename();
        let mime_type = mime_for(extension_of(&filename));

        Self {
            title: clean_title(&filename),
            mime_type,
            protocol_info: protocol_info(mime_type),
            url: media.url.clone(),
            size_bytes: media.size_bytes,
        }
    }

    /// Render as a single-item DIDL-Lite document
    pub fn to_xml(&self) -> String {
        let mut didl = String::new();

        didl.push_str(r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" "#);
        didl.push_str(r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#);
        didl.push_str(r#"xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#);

        didl.push_str(r#"<item id="0" parentID="-1" restricted="1">"#);
        didl.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&self.title)));
        didl.push_str(&format!("<upnp:class>{}</upnp:class>", VIDEO_ITEM_CLASS));

        didl.push_str(&format!(r#"<res protocolInfo="{}""#, escape_xml(&self.protocol_info)));
        if let Some(size) = self.size_bytes {
            didl.push_str(&format!(r#" size="{}""#, size));
        }
        didl.push('>');
        didl.push_str(&escape_xml(&self.url));
        didl.push_str("</res>");

        didl.push_str("</item>");
        didl.push_str("</DIDL-Lite>");

        didl
    }
}

/// Build the DIDL-Lite document for a cast
pub fn build_didl(media: &MediaReference) -> String {
    DidlMetadata::from_media(media).to_xml()
}

/// JSON-RPC playlist item for a media center
pub fn jsonrpc_item(media: &MediaReference) -> Value {
    json!({ "file": media.url })
}

/// MIME type for a file extension (case-insensitive, defaults to MP4)
pub fn mime_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        _ => "video/mp4",
    }
}

/// `http-get:*:<mime>:<flags>`
pub fn protocol_info(mime_type: &str) -> String {
    format!("http-get:*:{}:{}", mime_type, DLNA_PROTOCOL_FLAGS)
}

fn extension_of(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Escape the five XML metacharacters.
///
/// Every value inserted into generated XML goes through here exactly once.
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
