use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assets::decode::{DecodedImage, decode_image};
use crate::config::ExtractOpts;
use crate::foundation::core::Rgba8;

/// A suggested background color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Opaque color, serialized as `#rrggbb`.
    pub color: Rgba8,
    /// Display label.
    pub label: String,
}

impl PaletteEntry {
    fn new(color: Rgba8, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
        }
    }
}

const FALLBACKS: [(Rgba8, &str); 2] = [
    (Rgba8::rgb(0xff, 0xff, 0xff), "White"),
    (Rgba8::rgb(0x1a, 0x1a, 0x1a), "Dark"),
];

/// Static presets offered when nothing could be extracted.
pub fn preset_palette() -> Vec<PaletteEntry> {
    [
        (Rgba8::rgb(0x0e, 0xa5, 0xe9), "Ocean"),
        (Rgba8::rgb(0xf9, 0x73, 0x16), "Sunset"),
        (Rgba8::rgb(0x16, 0xa3, 0x4a), "Forest"),
        (Rgba8::rgb(0x7c, 0x3a, 0xed), "Grape"),
        (Rgba8::rgb(0xe1, 0x1d, 0x48), "Rose"),
        (Rgba8::rgb(0x33, 0x41, 0x55), "Slate"),
    ]
    .into_iter()
    .chain(FALLBACKS)
    .map(|(c, l)| PaletteEntry::new(c, l))
    .collect()
}

fn quantize(c: u8, step: u8) -> u8 {
    let step = f64::from(step.max(1));
    ((f64::from(c) / step).round() * step).min(255.0) as u8
}

fn distance(a: Rgba8, b: Rgba8) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Extract a small, diverse palette of dominant colors from a decoded image.
///
/// The image is sampled on a `grid`×`grid` nearest-neighbor lattice, channels are quantized to
/// multiples of `bucket`, near-white and near-black buckets are dropped, and the most frequent
/// buckets are accepted greedily while they stay more than `min_distance` away from every
/// accepted color. The result is padded with white and dark entries up to `max_colors`.
pub fn extract_palette(img: &DecodedImage, opts: &ExtractOpts) -> Vec<PaletteEntry> {
    let grid = opts.grid.max(1);
    let (w, h) = (img.width as u64, img.height as u64);
    let px = img.rgba8_premul();
    if w == 0 || h == 0 || px.len() < (w * h * 4) as usize {
        return Vec::new();
    }

    let mut counts: HashMap<Rgba8, u32> = HashMap::new();
    for gy in 0..u64::from(grid) {
        let y = (gy * h / u64::from(grid)).min(h - 1);
        for gx in 0..u64::from(grid) {
            let x = (gx * w / u64::from(grid)).min(w - 1);
            let i = ((y * w + x) * 4) as usize;
            let a = px[i + 3];
            if a == 0 {
                continue;
            }
            let straight =
                |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            let key = Rgba8::rgb(
                quantize(straight(px[i]), opts.bucket),
                quantize(straight(px[i + 1]), opts.bucket),
                quantize(straight(px[i + 2]), opts.bucket),
            );
            *counts.entry(key).or_default() += 1;
        }
    }

    let mut ranked: Vec<(Rgba8, u32)> = counts
        .into_iter()
        .filter(|(c, _)| {
            let avg = (f64::from(c.r) + f64::from(c.g) + f64::from(c.b)) / 3.0;
            avg <= opts.near_white && avg >= opts.near_black
        })
        .collect();
    ranked.sort_by(|(ca, na), (cb, nb)| {
        nb.cmp(na)
            .then_with(|| (ca.r, ca.g, ca.b).cmp(&(cb.r, cb.g, cb.b)))
    });

    let mut accepted: Vec<Rgba8> = Vec::new();
    for (c, _) in ranked.into_iter().take(opts.candidates) {
        if accepted.len() >= opts.max_colors {
            break;
        }
        if accepted
            .iter()
            .all(|a| distance(*a, c) > opts.min_distance)
        {
            accepted.push(c);
        }
    }

    let mut out: Vec<PaletteEntry> = accepted
        .into_iter()
        .map(|c| PaletteEntry::new(c, c.to_hex_rgb()))
        .collect();
    for (c, label) in FALLBACKS {
        if out.len() >= opts.max_colors {
            break;
        }
        if !out.iter().any(|e| e.color == c) {
            out.push(PaletteEntry::new(c, label));
        }
    }

    tracing::debug!(colors = out.len(), "extracted palette");
    out
}

/// Extract a palette from encoded image bytes; undecodable input yields an empty palette.
pub fn extract_palette_from_bytes(bytes: &[u8], opts: &ExtractOpts) -> Vec<PaletteEntry> {
    match decode_image(bytes) {
        Ok(img) => extract_palette(&img, opts),
        Err(e) => {
            tracing::warn!(error = %e, "palette extraction skipped");
            Vec::new()
        }
    }
}

/// Palette to offer for an optional screenshot: extracted colors, or the presets when the
/// screenshot is missing or yields nothing.
pub fn suggest_palette(img: Option<&DecodedImage>, opts: &ExtractOpts) -> Vec<PaletteEntry> {
    let extracted = img.map(|i| extract_palette(i, opts)).unwrap_or_default();
    if extracted.is_empty() {
        preset_palette()
    } else {
        extracted
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/palette.rs"]
mod tests;
