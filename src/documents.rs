//! Label and manifest downloads
//!
//! These are plain REST resources, not SOAP operations:
//!
//! ```text
//! GET {base}/documents/v1/labels/{id[,id...]}[?layout=..&format=..&dpi=..]
//! GET {base}/documents/v1/manifest/{collection_id}[?format=..]
//! ```
//!
//! Base64 formats are decoded before the bytes hit the disk.

use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

use crate::error::{DespatchError, DespatchResult};

// ============================================================================
// Identifiers
// ============================================================================

/// One shipment/collection id, or several joined with commas in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIds(String);

impl DocumentIds {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentIds {
    fn from(id: &str) -> Self {
        DocumentIds(id.to_string())
    }
}

impl From<String> for DocumentIds {
    fn from(id: String) -> Self {
        DocumentIds(id)
    }
}

impl From<&String> for DocumentIds {
    fn from(id: &String) -> Self {
        DocumentIds(id.clone())
    }
}

impl<S: AsRef<str>> From<&[S]> for DocumentIds {
    fn from(ids: &[S]) -> Self {
        DocumentIds(ids.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(","))
    }
}

impl<S: AsRef<str>> From<Vec<S>> for DocumentIds {
    fn from(ids: Vec<S>) -> Self {
        DocumentIds::from(ids.as_slice())
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for DocumentIds {
    fn from(ids: [S; N]) -> Self {
        DocumentIds::from(ids.as_slice())
    }
}

// ============================================================================
// Formats and options
// ============================================================================

/// Label document format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelFormat {
    Pdf,
    PdfBase64,
    PngBase64,
    Other(String),
}

impl LabelFormat {
    pub fn as_str(&self) -> &str {
        match self {
            LabelFormat::Pdf => "pdf",
            LabelFormat::PdfBase64 => "pdf_base64",
            LabelFormat::PngBase64 => "png_base64",
            LabelFormat::Other(s) => s,
        }
    }

    /// Whether the response body must be base64-decoded
    pub fn is_base64(&self) -> bool {
        matches!(self.as_str(), "pdf_base64" | "png_base64")
    }

    /// Only PNG output honours a dpi setting
    pub fn accepts_dpi(&self) -> bool {
        self.as_str() == "png_base64"
    }
}

impl From<&str> for LabelFormat {
    fn from(s: &str) -> Self {
        match s {
            "pdf" => LabelFormat::Pdf,
            "pdf_base64" => LabelFormat::PdfBase64,
            "png_base64" => LabelFormat::PngBase64,
            other => LabelFormat::Other(other.to_string()),
        }
    }
}

/// Manifest document format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestFormat {
    Pdf,
    Base64,
    Other(String),
}

impl ManifestFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ManifestFormat::Pdf => "pdf",
            ManifestFormat::Base64 => "base64",
            ManifestFormat::Other(s) => s,
        }
    }

    pub fn is_base64(&self) -> bool {
        self.as_str() == "base64"
    }
}

impl From<&str> for ManifestFormat {
    fn from(s: &str) -> Self {
        match s {
            "pdf" => ManifestFormat::Pdf,
            "base64" => ManifestFormat::Base64,
            other => ManifestFormat::Other(other.to_string()),
        }
    }
}

/// Optional label query parameters; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelOptions {
    /// Page layout, e.g. "1A4", "2A4", "1A6"
    pub layout: Option<String>,
    pub format: Option<LabelFormat>,
    /// Ignored unless `format` is `png_base64`
    pub dpi: Option<u32>,
}

impl LabelOptions {
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn format(mut self, format: impl Into<LabelFormat>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Empty strings and a zero dpi count as unset
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(layout) = self.layout.as_deref().filter(|l| !l.is_empty()) {
            pairs.push(("layout", layout.to_string()));
        }
        if let Some(format) = self.format.as_ref().filter(|f| !f.as_str().is_empty()) {
            pairs.push(("format", format.as_str().to_string()));
            if let Some(dpi) = self.dpi.filter(|&dpi| dpi > 0 && format.accepts_dpi()) {
                pairs.push(("dpi", dpi.to_string()));
            }
        }
        pairs
    }
}

// ============================================================================
// URL construction
// ============================================================================

fn resource_url(base: &Url, id: &str, pairs: &[(&str, String)]) -> DespatchResult<Url> {
    let mut url = Url::parse(&format!("{}/{}", base.as_str().trim_end_matches('/'), id))?;
    // query_pairs_mut() would leave a bare '?' behind even with no pairs
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Build the labels request URL for `ids` under the labels endpoint
pub fn labels_request_url(labels_url: &Url, ids: &DocumentIds, options: &LabelOptions) -> DespatchResult<Url> {
    resource_url(labels_url, ids.as_str(), &options.query_pairs())
}

/// Build the manifest request URL for one collection
pub fn manifest_request_url(
    manifest_url: &Url,
    collection_id: &str,
    format: Option<&ManifestFormat>,
) -> DespatchResult<Url> {
    let pairs: Vec<(&str, String)> = format
        .filter(|f| !f.as_str().is_empty())
        .map(|f| vec![("format", f.as_str().to_string())])
        .unwrap_or_default();
    resource_url(manifest_url, collection_id, &pairs)
}

// ============================================================================
// Download
// ============================================================================

/// Body bytes as they should be written, decoding base64 when asked to.
///
/// ASCII whitespace (line wrapping, trailing newline) is stripped before
/// decoding.
pub fn decode_document(body: &[u8], base64_encoded: bool) -> DespatchResult<Cow<'_, [u8]>> {
    if !base64_encoded {
        return Ok(Cow::Borrowed(body));
    }
    let compact: Vec<u8> = body.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    Ok(Cow::Owned(base64::engine::general_purpose::STANDARD.decode(compact)?))
}

/// GET a document body. Non-2xx statuses are errors.
pub(crate) async fn fetch(http: &Client, url: Url) -> DespatchResult<Bytes> {
    debug!(url = %url, "Document request");

    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Document request failed");
        return Err(DespatchError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.bytes().await?)
}

/// Fetch `url` and write the (optionally decoded) body to `path`.
///
/// The file is created or truncated in a single write; nothing is written if
/// the request or the decode fails.
pub(crate) async fn download(http: &Client, url: Url, base64_encoded: bool, path: &Path) -> DespatchResult<()> {
    let body = fetch(http, url).await?;
    let data = decode_document(&body, base64_encoded)?;
    tokio::fs::write(path, data).await?;
    debug!(path = %path.display(), bytes = body.len(), "Document saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_base() -> Url {
        Url::parse("https://api.despatchbay.com/documents/v1/labels").unwrap()
    }

    #[test]
    fn test_sequence_joins_in_order() {
        let ids = DocumentIds::from(vec!["100-3", "100-1", "100-1"]);
        assert_eq!(ids.as_str(), "100-3,100-1,100-1");
    }

    #[test]
    fn test_sequence_matches_joined_string() {
        let from_list = labels_request_url(&labels_base(), &["a", "b", "c"].into(), &LabelOptions::default()).unwrap();
        let from_str = labels_request_url(&labels_base(), &"a,b,c".into(), &LabelOptions::default()).unwrap();
        assert_eq!(from_list, from_str);
        assert_eq!(from_list.path(), "/documents/v1/labels/a,b,c");
    }

    #[test]
    fn test_no_options_means_no_query() {
        let url = labels_request_url(&labels_base(), &"100-1".into(), &LabelOptions::default()).unwrap();
        assert_eq!(url.query(), None);
        assert!(!url.as_str().contains('?'));
    }

    #[test]
    fn test_dpi_sent_for_png_base64() {
        let options = LabelOptions::default().format("png_base64").dpi(300);
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), Some("format=png_base64&dpi=300"));
    }

    #[test]
    fn test_dpi_dropped_for_other_formats() {
        let options = LabelOptions::default().format(LabelFormat::PdfBase64).dpi(300);
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), Some("format=pdf_base64"));

        // dpi without a format is never sent
        let options = LabelOptions::default().dpi(300);
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_empty_and_zero_options_are_not_sent() {
        let options = LabelOptions::default()
            .layout("")
            .format(LabelFormat::Other(String::new()))
            .dpi(0);
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), None);

        let options = LabelOptions::default().format(LabelFormat::PngBase64).dpi(0);
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), Some("format=png_base64"));

        let base = Url::parse("https://api.despatchbay.com/documents/v1/manifest").unwrap();
        let url = manifest_request_url(&base, "COL-9", Some(&ManifestFormat::Other(String::new()))).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_query_order_and_encoding() {
        let options = LabelOptions::default().layout("2A4").format("pdf");
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), Some("layout=2A4&format=pdf"));

        let options = LabelOptions::default().layout("a b&c");
        let url = labels_request_url(&labels_base(), &"100-1".into(), &options).unwrap();
        assert_eq!(url.query(), Some("layout=a+b%26c"));
    }

    #[test]
    fn test_manifest_url() {
        let base = Url::parse("https://api.despatchbay.com/documents/v1/manifest").unwrap();
        let url = manifest_request_url(&base, "COL-9", None).unwrap();
        assert_eq!(url.as_str(), "https://api.despatchbay.com/documents/v1/manifest/COL-9");

        let url = manifest_request_url(&base, "COL-9", Some(&ManifestFormat::Base64)).unwrap();
        assert_eq!(url.query(), Some("format=base64"));
    }

    #[test]
    fn test_format_classification() {
        assert!(LabelFormat::from("png_base64").is_base64());
        assert!(LabelFormat::from("pdf_base64").is_base64());
        assert!(!LabelFormat::from("pdf").is_base64());
        assert!(!LabelFormat::from("pdf_base64").accepts_dpi());
        assert!(ManifestFormat::from("base64").is_base64());
        assert!(!ManifestFormat::Pdf.is_base64());
        assert_eq!(LabelFormat::from("zpl"), LabelFormat::Other("zpl".to_string()));
    }

    #[test]
    fn test_decode_document() {
        let raw = b"%PDF-1.4 raw";
        assert_eq!(&*decode_document(raw, false).unwrap(), raw);

        let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
        let wrapped = format!("{}\n", encoded);
        assert_eq!(&*decode_document(wrapped.as_bytes(), true).unwrap(), raw);

        assert!(matches!(decode_document(b"not base64!!", true), Err(DespatchError::Base64(_))));
    }
}
