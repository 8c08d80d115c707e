use std::collections::{HashMap, VecDeque};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::assets::decode::{DecodedImage, FrameArt, decode_frame, decode_image};
use crate::assets::source::{AssetFetcher, AssetSource, DefaultFetcher};
use crate::foundation::error::{ShotError, ShotResult};
use crate::scene::input::RenderInput;
use crate::scene::template::ScreenshotKind;

/// What a loaded asset is used for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRole {
    /// A capture feeding one or more slots.
    Screenshot(ScreenshotKind),
    /// A device frame, keyed by the template's `mockupImage` reference.
    Frame(String),
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Screenshot(ScreenshotKind::Desktop) => f.write_str("desktop screenshot"),
            Self::Screenshot(ScreenshotKind::Mobile) => f.write_str("mobile screenshot"),
            Self::Frame(r) => write!(f, "frame '{r}'"),
        }
    }
}

/// One asset a render pass needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Usage.
    pub role: AssetRole,
    /// Byte source.
    pub source: AssetSource,
}

impl AssetRequest {
    fn cache_key(&self) -> String {
        match &self.role {
            AssetRole::Screenshot(_) => format!("shot|{}", self.source.cache_key()),
            AssetRole::Frame(_) => format!("frame|{}", self.source.cache_key()),
        }
    }
}

/// A request that did not produce pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    /// Usage of the failed asset.
    pub role: AssetRole,
    /// Error message.
    pub error: String,
}

#[derive(Clone, Debug)]
enum LoadedAsset {
    Screenshot(DecodedImage),
    Frame(FrameArt),
}

/// Outcome of a completed loading barrier.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    screenshots: HashMap<ScreenshotKind, DecodedImage>,
    frames: HashMap<String, FrameArt>,
    failures: Vec<AssetFailure>,
}

impl ResolvedAssets {
    /// Decoded capture, if requested and loaded.
    pub fn screenshot(&self, kind: ScreenshotKind) -> Option<&DecodedImage> {
        self.screenshots.get(&kind)
    }

    /// Decoded frame for a `mockupImage` reference, if requested and loaded.
    pub fn frame(&self, reference: &str) -> Option<&FrameArt> {
        self.frames.get(reference)
    }

    /// Requests that failed in this pass.
    pub fn failures(&self) -> &[AssetFailure] {
        &self.failures
    }

    /// Return `true` when `role` failed in this pass.
    pub fn failed(&self, role: &AssetRole) -> bool {
        self.failures.iter().any(|f| &f.role == role)
    }

    /// Add a decoded capture directly (bypassing fetch).
    pub fn insert_screenshot(&mut self, kind: ScreenshotKind, image: DecodedImage) {
        self.screenshots.insert(kind, image);
    }

    /// Add decoded frame art directly (bypassing fetch).
    pub fn insert_frame(&mut self, reference: impl Into<String>, art: FrameArt) {
        self.frames.insert(reference.into(), art);
    }

    /// Record a failed asset.
    pub fn insert_failure(&mut self, role: AssetRole, error: impl Into<String>) {
        self.failures.push(AssetFailure {
            role,
            error: error.into(),
        });
    }

    fn record(&mut self, role: AssetRole, asset: LoadedAsset) {
        match (role, asset) {
            (AssetRole::Screenshot(kind), LoadedAsset::Screenshot(img)) => {
                self.screenshots.insert(kind, img);
            }
            (AssetRole::Frame(r), LoadedAsset::Frame(art)) => {
                self.frames.insert(r, art);
            }
            (role, _) => self.insert_failure(role, "cached asset has a different kind"),
        }
    }
}

/// Assets required to render `input`.
///
/// Captures are requested only when some slot displays them; frames only for slots that can take
/// the framed path (global and per-slot mockup flags both on). Frame references are deduplicated.
pub fn requests_for(input: &RenderInput) -> Vec<AssetRequest> {
    let template = &input.template;
    let mut out = Vec::new();

    for kind in [ScreenshotKind::Desktop, ScreenshotKind::Mobile] {
        let used = template
            .slots()
            .any(|(role, slot)| slot.screenshot.unwrap_or(role.default_screenshot()) == kind);
        if let (true, Some(src)) = (used, input.captures.get(kind)) {
            out.push(AssetRequest {
                role: AssetRole::Screenshot(kind),
                source: src.clone(),
            });
        }
    }

    if input.style.enable_mockups {
        for (_, slot) in template.slots() {
            let Some(reference) = slot.mockup_image.as_deref().filter(|_| slot.mockup) else {
                continue;
            };
            let role = AssetRole::Frame(reference.to_owned());
            if out.iter().any(|r| r.role == role) {
                continue;
            }
            out.push(AssetRequest {
                role,
                source: AssetSource::parse(reference),
            });
        }
    }
    out
}

/// Resolves image references into decoded handles behind a single barrier.
///
/// Successfully decoded assets are cached by source (bounded, least-recently-used eviction), so
/// style-only changes do not re-fetch or re-decode. Failures are never cached.
pub struct AssetLoader<F = DefaultFetcher> {
    fetcher: F,
    cache: HashMap<String, LoadedAsset>,
    lru: VecDeque<String>,
    capacity: usize,
}

impl<F: AssetFetcher> AssetLoader<F> {
    /// Loader with a bounded decoded-asset cache.
    pub fn new(fetcher: F, capacity: usize) -> Self {
        Self {
            fetcher,
            cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Access the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Number of cached decoded assets.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached asset.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.lru.clear();
    }

    /// Fetch and decode a single raster image, bypassing the cache.
    pub async fn fetch_image(&self, source: &AssetSource) -> ShotResult<DecodedImage> {
        let bytes = self.fetcher.fetch(source).await?;
        decode_image(&bytes)
    }

    /// Load everything `input` needs and wait for all loads to settle.
    ///
    /// Never fails as a whole: per-asset failures are reported in
    /// [`ResolvedAssets::failures`] and the compositor applies its failure policy.
    pub async fn load(&mut self, input: &RenderInput) -> ResolvedAssets {
        let requests = requests_for(input);
        let mut resolved = ResolvedAssets::default();

        let mut pending = Vec::new();
        for req in requests {
            let key = req.cache_key();
            if let Some(hit) = self.cache.get(&key).cloned() {
                self.touch(&key);
                resolved.record(req.role, hit);
            } else {
                pending.push((key, req));
            }
        }

        tracing::debug!(
            pending = pending.len(),
            cached = resolved.screenshots.len() + resolved.frames.len(),
            "asset barrier start"
        );

        let fetcher = &self.fetcher;
        let results = join_all(pending.iter().map(|(_, req)| async move {
            let bytes = fetcher.fetch(&req.source).await?;
            match req.role {
                AssetRole::Screenshot(_) => decode_image(&bytes).map(LoadedAsset::Screenshot),
                AssetRole::Frame(_) => decode_frame(&bytes).map(LoadedAsset::Frame),
            }
        }))
        .await;

        for ((key, req), result) in pending.into_iter().zip(results) {
            match result {
                Ok(asset) => {
                    self.insert_cached(key, asset.clone());
                    resolved.record(req.role, asset);
                }
                Err(e) => {
                    tracing::warn!(asset = %req.role, source = %req.source, error = %e, "asset failed to load");
                    resolved.insert_failure(req.role, e.to_string());
                }
            }
        }

        resolved
    }

    /// [`Self::load`], abandoned with [`ShotError::Cancelled`] when `cancel` fires first.
    pub async fn load_cancellable(
        &mut self,
        input: &RenderInput,
        cancel: &CancellationToken,
    ) -> ShotResult<ResolvedAssets> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShotError::Cancelled),
            resolved = self.load(input) => Ok(resolved),
        }
    }

    fn insert_cached(&mut self, key: String, asset: LoadedAsset) {
        self.cache.insert(key.clone(), asset);
        self.touch(&key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.to_owned());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
