use std::fmt;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::MAX_SURFACE_DIM;
use crate::foundation::error::{ShotError, ShotResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Pixels live in a shared `vello_cpu` pixmap, so clones and repeated draws reuse one buffer.
#[derive(Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl DecodedImage {
    /// Wrap premultiplied, row-major, tightly packed RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> ShotResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| ShotError::decode("image width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ShotError::decode("image height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(ShotError::decode("image has zero width or height"));
        }
        if data.len() != width as usize * height as usize * 4 {
            return Err(ShotError::decode("image byte length does not match dimensions"));
        }

        let mut may_have_opacities = false;
        let pixels = data
            .chunks_exact(4)
            .map(|px| {
                may_have_opacities |= px[3] != 255;
                vello_cpu::peniko::color::PremulRgba8 {
                    r: px[0],
                    g: px[1],
                    b: px[2],
                    a: px[3],
                }
            })
            .collect();
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(pixmap),
        })
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn rgba8_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Image paint sharing this image's pixels.
    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

impl PartialEq for DecodedImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba8_premul() == other.rgba8_premul()
    }
}

impl Eq for DecodedImage {}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A device frame: either raster art or a vector document rasterized per placement size.
#[derive(Clone, Debug)]
pub enum FrameArt {
    /// Bitmap frame (PNG, WebP, ...).
    Raster(DecodedImage),
    /// SVG frame.
    Vector(Arc<usvg::Tree>),
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ShotResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| ShotError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ShotError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    DecodedImage::from_premul_rgba8(width, height, rgba8_premul)
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> ShotResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| ShotError::decode(format!("{e:#}")))?;
    Ok(Arc::new(tree))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with('<') && t.contains("<svg")
}

/// Decode frame art, sniffing SVG markup before falling back to raster decoding.
pub fn decode_frame(bytes: &[u8]) -> ShotResult<FrameArt> {
    if looks_like_svg(bytes) {
        return parse_svg(bytes).map(FrameArt::Vector);
    }
    decode_image(bytes).map(FrameArt::Raster)
}

/// Rasterize an SVG tree stretched to exactly `width`×`height` pixels.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> ShotResult<DecodedImage> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
        return Err(ShotError::render(format!(
            "svg raster size {width}x{height} out of range"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ShotError::render("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    DecodedImage::from_premul_rgba8(width, height, pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
