use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::{ShotError, ShotResult};
use crate::foundation::math::Fnv1a64;

/// Where an image's encoded bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetSource {
    /// `http://` or `https://` URL.
    Remote(String),
    /// `data:` URI (base64 or plain payload).
    Data(String),
    /// File path; relative paths resolve against the fetcher's assets root.
    Path(PathBuf),
    /// Bytes already in memory.
    Bytes(Arc<Vec<u8>>),
}

impl AssetSource {
    /// Classify a reference string.
    pub fn parse(reference: &str) -> Self {
        let r = reference.trim();
        let lower = r.get(..8).unwrap_or(r).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(r.to_owned())
        } else if lower.starts_with("data:") {
            Self::Data(r.to_owned())
        } else {
            Self::Path(PathBuf::from(r))
        }
    }

    /// Decode a bare base64 payload, as returned by screenshot backends that inline captures
    /// in JSON.
    pub fn from_base64(payload: &str) -> ShotResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ShotError::fetch(format!("invalid base64 payload: {e}")))?;
        Ok(Self::Bytes(Arc::new(bytes)))
    }

    /// Key identifying the content for caching and fingerprinting.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Remote(u) => format!("url:{u}"),
            Self::Data(d) => {
                let mut h = Fnv1a64::new_default();
                h.write_str(d);
                format!("data:{:016x}:{}", h.finish(), d.len())
            }
            Self::Path(p) => format!("path:{}", p.display()),
            Self::Bytes(b) => {
                let mut h = Fnv1a64::new_default();
                h.write_bytes(b);
                format!("bytes:{:016x}:{}", h.finish(), b.len())
            }
        }
    }
}

impl std::fmt::Display for AssetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(u) => f.write_str(u),
            Self::Data(d) => write!(f, "{}…", d.get(..24).unwrap_or(d)),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Decode the payload of a `data:` URI.
///
/// `;base64` payloads are base64-decoded; other payloads are taken verbatim, which covers inline
/// SVG markup.
pub fn decode_data_uri(uri: &str) -> ShotResult<Vec<u8>> {
    let rest = uri
        .trim()
        .get(5..)
        .filter(|_| uri.trim()[..5].eq_ignore_ascii_case("data:"))
        .ok_or_else(|| ShotError::fetch("data URI must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ShotError::fetch("data URI is missing ','"))?;
    if meta
        .split(';')
        .any(|p| p.trim().eq_ignore_ascii_case("base64"))
    {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ShotError::fetch(format!("invalid base64 in data URI: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate assets-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects parent
/// traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> ShotResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(ShotError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ShotError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ShotError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Produces encoded bytes for an [`AssetSource`].
///
/// Each call is an independent suspend point; the loader runs all of a pass's fetches
/// concurrently and waits for all of them.
pub trait AssetFetcher {
    /// Fetch the encoded bytes for `source`.
    fn fetch(&self, source: &AssetSource) -> impl Future<Output = ShotResult<Vec<u8>>>;
}

/// Fetcher for files, data URIs, in-memory bytes and (with the `remote` feature) HTTP URLs.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    assets_root: PathBuf,
    #[cfg(feature = "remote")]
    http: reqwest::Client,
}

impl DefaultFetcher {
    /// Fetcher resolving relative paths against `assets_root`.
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            #[cfg(feature = "remote")]
            http: reqwest::Client::new(),
        }
    }

    fn resolve_path(&self, p: &Path) -> ShotResult<PathBuf> {
        if p.is_absolute() {
            return Ok(p.to_path_buf());
        }
        let rel = p
            .to_str()
            .ok_or_else(|| ShotError::validation("asset path must be valid UTF-8"))?;
        let norm = normalize_rel_path(rel)?;
        Ok(self.assets_root.join(Path::new(&norm)))
    }

    #[cfg(feature = "remote")]
    async fn fetch_remote(&self, url: &str) -> ShotResult<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ShotError::fetch(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ShotError::fetch(format!("GET {url}: HTTP {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ShotError::fetch(format!("GET {url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "remote"))]
    async fn fetch_remote(&self, url: &str) -> ShotResult<Vec<u8>> {
        Err(ShotError::fetch(format!(
            "cannot fetch '{url}': built without the `remote` feature"
        )))
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetFetcher for DefaultFetcher {
    async fn fetch(&self, source: &AssetSource) -> ShotResult<Vec<u8>> {
        match source {
            AssetSource::Remote(url) => self.fetch_remote(url).await,
            AssetSource::Data(uri) => decode_data_uri(uri),
            AssetSource::Bytes(b) => Ok(b.as_ref().clone()),
            AssetSource::Path(p) => {
                let full = self.resolve_path(p)?;
                tokio::fs::read(&full).await.map_err(|e| {
                    ShotError::fetch(format!("failed to read asset '{}': {e}", full.display()))
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
