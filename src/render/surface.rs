use std::io::Cursor;
use std::path::Path;

use crate::foundation::core::{Affine, BezPath, Canvas, Rect, Rgba8};
use crate::foundation::error::{ShotError, ShotResult};
use crate::foundation::math::{mul_div255_u16, unpremultiply_rgba8_in_place};
use crate::render::geometry::{affine_to_cpu, bezpath_to_cpu};

/// A rendered RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode as PNG (straight alpha).
    pub fn encode_png(&self) -> ShotResult<Vec<u8>> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ShotError::render("frame byte length does not match dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| ShotError::render(format!("encode png: {e}")))?;
        Ok(out)
    }

    /// Encode as PNG and write to `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ShotResult<()> {
        let path = path.as_ref();
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)
            .map_err(|e| ShotError::render(format!("write '{}': {e}", path.display())))
    }
}

/// Premultiplied source-over.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = u16::from(src[i]) + mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = v.min(255) as u8;
    }
    out
}

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> ShotResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ShotError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Canvas-sized premultiplied raster that layers are composited onto.
pub(crate) struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub(crate) fn new(canvas: Canvas) -> ShotResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ShotError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ShotError::render("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub(crate) fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub(crate) fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Draw into a transparent scratch layer, then composite it over the surface.
    pub(crate) fn draw_layer<F>(&mut self, draw: F) -> ShotResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> ShotResult<()>,
    {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        draw(&mut ctx)?;
        ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut layer);
        over_in_place(self.pixmap.data_as_u8_slice_mut(), layer.data_as_u8_slice())
    }

    /// Composite `color` modulated by `mask` over the surface.
    pub(crate) fn fill_mask(&mut self, mask: &AlphaMask, color: Rgba8) {
        let premul = color.to_premul().to_array();
        let (sw, sh) = (i64::from(self.width), i64::from(self.height));
        let data = self.pixmap.data_as_u8_slice_mut();
        for my in 0..i64::from(mask.height) {
            let y = i64::from(mask.y0) + my;
            if y < 0 || y >= sh {
                continue;
            }
            for mx in 0..i64::from(mask.width) {
                let x = i64::from(mask.x0) + mx;
                if x < 0 || x >= sw {
                    continue;
                }
                let m = mask.data[(my * i64::from(mask.width) + mx) as usize];
                if m == 0 {
                    continue;
                }
                let m = u16::from(m);
                let src = premul.map(|c| mul_div255_u16(u16::from(c), m) as u8);
                let i = ((y * sw + x) * 4) as usize;
                let out = over([data[i], data[i + 1], data[i + 2], data[i + 3]], src);
                data[i..i + 4].copy_from_slice(&out);
            }
        }
    }

    /// Straight-alpha copy of the surface.
    pub(crate) fn to_frame(&self) -> FrameRGBA {
        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data,
            premultiplied: false,
        }
    }
}

/// Single-channel coverage raster positioned in canvas space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AlphaMask {
    pub(crate) x0: i32,
    pub(crate) y0: i32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl AlphaMask {
    /// Rasterize the coverage of `path`, padded by `pad` pixels on every side and limited to
    /// `limit`. Returns `None` when nothing of the padded shape intersects `limit`.
    pub(crate) fn from_path(path: &BezPath, pad: f64, limit: Rect) -> ShotResult<Option<Self>> {
        use kurbo::Shape;

        let region = path.bounding_box().inflate(pad, pad).intersect(limit);
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return Ok(None);
        }
        let x0 = region.x0.floor();
        let y0 = region.y0.floor();
        let w = (region.x1.ceil() - x0).max(1.0);
        let h = (region.y1.ceil() - y0).max(1.0);
        if w > f64::from(u16::MAX) || h > f64::from(u16::MAX) {
            return Err(ShotError::render("shadow mask exceeds u16 dimensions"));
        }
        let (w16, h16) = (w as u16, h as u16);

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_transform(affine_to_cpu(Affine::translate((-x0, -y0))));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_path(&bezpath_to_cpu(path));
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let data = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        Ok(Some(Self {
            x0: x0 as i32,
            y0: y0 as i32,
            width: u32::from(w16),
            height: u32::from(h16),
            data,
        }))
    }

    /// Separable gaussian blur; samples outside the mask count as zero.
    pub(crate) fn blur(&mut self, sigma: f64) -> ShotResult<()> {
        let radius = (sigma * 3.0).ceil();
        if !radius.is_finite() || radius < 1.0 {
            return Ok(());
        }
        let kernel = gaussian_kernel_q16(radius as u32, sigma)?;
        let (w, h) = (self.width as usize, self.height as usize);
        let mut tmp = vec![0u8; self.data.len()];
        convolve(&self.data, &mut tmp, w, h, &kernel, 1, w);
        convolve(&tmp, &mut self.data, w, h, &kernel, w, 1);
        Ok(())
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> ShotResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ShotError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(ShotError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&q| i64::from(q)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

/// One convolution pass along an axis. `step` is the index distance between neighbors along
/// the axis, `line` the distance between consecutive lines.
fn convolve(src: &[u8], dst: &mut [u8], w: usize, h: usize, k: &[u32], step: usize, line: usize) {
    let (len, lines) = if step == 1 { (w, h) } else { (h, w) };
    let radius = (k.len() / 2) as isize;
    for l in 0..lines {
        let base = l * line;
        for i in 0..len {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let j = i as isize + ki as isize - radius;
                if j < 0 || j >= len as isize {
                    continue;
                }
                acc += u64::from(kw) * u64::from(src[base + j as usize * step]);
            }
            dst[base + i * step] = ((acc + 32768) >> 16).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
