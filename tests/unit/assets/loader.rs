use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::scene::input::CaptureSet;
use crate::scene::template::{DeviceSlot, Template};

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(w, h, image::Rgba(px)))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
struct MapFetcher {
    files: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl MapFetcher {
    fn with(mut self, key: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(key.to_owned(), bytes);
        self
    }
}

impl AssetFetcher for MapFetcher {
    async fn fetch(&self, source: &AssetSource) -> ShotResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = match source {
            AssetSource::Path(p) => p.display().to_string(),
            other => other.cache_key(),
        };
        self.files
            .get(&key)
            .cloned()
            .ok_or_else(|| ShotError::fetch(format!("no such asset '{key}'")))
    }
}

fn template() -> Arc<Template> {
    let mut desktop = DeviceSlot::new(10.0, 10.0, 80.0, 50.0);
    desktop.mockup_image = Some("frames/laptop.png".to_owned());
    let mut mobile = DeviceSlot::new(100.0, 10.0, 20.0, 40.0);
    mobile.mockup_image = Some("frames/phone.png".to_owned());
    let mut t = Template::from_json_str(r#"{"id":"t","canvas":{"width":200,"height":100}}"#)
        .unwrap();
    t.devices.desktop = Some(desktop);
    t.devices.mobile = Some(mobile);
    Arc::new(t)
}

fn input() -> RenderInput {
    RenderInput::new(template()).with_captures(CaptureSet {
        desktop: Some(AssetSource::parse("shots/desktop.png")),
        mobile: Some(AssetSource::parse("shots/mobile.png")),
        page_title: None,
    })
}

fn full_fetcher() -> MapFetcher {
    MapFetcher::default()
        .with("shots/desktop.png", png(4, 3, [255, 0, 0, 255]))
        .with("shots/mobile.png", png(2, 4, [0, 255, 0, 255]))
        .with("frames/laptop.png", png(8, 6, [0, 0, 0, 255]))
        .with("frames/phone.png", png(4, 8, [0, 0, 0, 255]))
}

#[test]
fn requests_follow_slot_usage_and_mockup_flags() {
    let reqs = requests_for(&input());
    assert_eq!(reqs.len(), 4);
    assert!(reqs.contains(&AssetRequest {
        role: AssetRole::Frame("frames/phone.png".to_owned()),
        source: AssetSource::parse("frames/phone.png"),
    }));

    let mut no_mockups = input();
    no_mockups.style.enable_mockups = false;
    let reqs = requests_for(&no_mockups);
    assert_eq!(reqs.len(), 2);
    assert!(
        reqs.iter()
            .all(|r| matches!(r.role, AssetRole::Screenshot(_)))
    );

    let mut t = (*template()).clone();
    t.devices.mobile = None;
    let only_desktop = RenderInput {
        template: Arc::new(t),
        ..input()
    };
    let reqs = requests_for(&only_desktop);
    assert!(
        !reqs
            .iter()
            .any(|r| r.role == AssetRole::Screenshot(ScreenshotKind::Mobile))
    );
}

#[test]
fn requests_dedupe_shared_frames() {
    let mut t = (*template()).clone();
    let mut extra = DeviceSlot::new(0.0, 0.0, 10.0, 10.0);
    extra.mockup_image = Some("frames/laptop.png".to_owned());
    t.extra_devices.push(extra);
    let inp = RenderInput {
        template: Arc::new(t),
        ..input()
    };
    let frames = requests_for(&inp)
        .into_iter()
        .filter(|r| matches!(r.role, AssetRole::Frame(_)))
        .count();
    assert_eq!(frames, 2);
}

#[tokio::test]
async fn barrier_resolves_everything_and_caches() {
    let mut loader = AssetLoader::new(full_fetcher(), 8);
    let resolved = loader.load(&input()).await;
    assert!(resolved.failures().is_empty());
    let desk = resolved.screenshot(ScreenshotKind::Desktop).unwrap();
    assert_eq!((desk.width, desk.height), (4, 3));
    assert!(matches!(
        resolved.frame("frames/phone.png"),
        Some(FrameArt::Raster(_))
    ));
    assert_eq!(loader.fetcher().calls.load(Ordering::SeqCst), 4);
    assert_eq!(loader.cached_len(), 4);

    let again = loader.load(&input()).await;
    assert!(again.screenshot(ScreenshotKind::Mobile).is_some());
    assert_eq!(loader.fetcher().calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failures_are_reported_per_asset_and_not_cached() {
    let fetcher = MapFetcher::default()
        .with("shots/desktop.png", png(4, 3, [255, 0, 0, 255]))
        .with("shots/mobile.png", b"garbage".to_vec())
        .with("frames/laptop.png", png(8, 6, [0, 0, 0, 255]));
    let mut loader = AssetLoader::new(fetcher, 8);
    let resolved = loader.load(&input()).await;

    assert!(resolved.screenshot(ScreenshotKind::Desktop).is_some());
    assert!(resolved.screenshot(ScreenshotKind::Mobile).is_none());
    assert!(resolved.failed(&AssetRole::Screenshot(ScreenshotKind::Mobile)));
    assert!(resolved.failed(&AssetRole::Frame("frames/phone.png".to_owned())));
    assert_eq!(resolved.failures().len(), 2);
    assert_eq!(loader.cached_len(), 2);

    loader.load(&input()).await;
    assert_eq!(loader.fetcher().calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn cache_evicts_least_recently_used() {
    let mut loader = AssetLoader::new(full_fetcher(), 2);
    loader.load(&input()).await;
    assert_eq!(loader.cached_len(), 2);
    loader.clear_cache();
    assert_eq!(loader.cached_len(), 0);
}

#[tokio::test]
async fn cancelled_load_returns_cancelled() {
    let mut loader = AssetLoader::new(full_fetcher(), 8);
    let token = CancellationToken::new();
    token.cancel();
    let err = loader.load_cancellable(&input(), &token).await.unwrap_err();
    assert!(err.is_cancelled());

    let ok = loader
        .load_cancellable(&input(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(ok.failures().is_empty());
}
