use crate::assets::decode::{DecodedImage, FrameArt, rasterize_svg};
use crate::config::{RenderOpts, ShadowOpts};
use crate::foundation::core::{Affine, Rect, Vec2};
use crate::foundation::error::ShotResult;
use crate::render::crop::{CropRect, cover_fit};
use crate::render::geometry::{affine_to_cpu, bezpath_to_cpu, rect_to_cpu, rounded_rect};
use crate::render::surface::{AlphaMask, Surface};
use crate::scene::style::StyleParams;
use crate::scene::template::DeviceSlot;

/// How a device slot is drawn in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPath {
    /// Nothing is drawn.
    Skip,
    /// Rounded, bordered screenshot without a frame.
    Simple,
    /// Screenshot inside its device frame.
    Framed,
}

/// Availability of a slot's frame art in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Decoded and ready to draw.
    Ready,
    /// Not named by the slot, or not requested this pass.
    Absent,
    /// Requested but failed to load or decode.
    Failed,
}

/// Pick the drawing path for a slot.
///
/// A slot without a screenshot is skipped. A slot that wants a frame (global mockups, the
/// slot's own `mockup` flag and a `mockup_image`) is framed when the art is ready and skipped
/// when it failed. Everything else is drawn unframed; `mockup: false` on the slot always wins.
pub fn choose_path(
    style: &StyleParams,
    slot: &DeviceSlot,
    has_screenshot: bool,
    frame: FrameState,
) -> SlotPath {
    if !has_screenshot {
        return SlotPath::Skip;
    }
    let wants_frame = style.enable_mockups && slot.mockup && slot.mockup_image.is_some();
    match (wants_frame, frame) {
        (true, FrameState::Ready) => SlotPath::Framed,
        (true, FrameState::Failed) => SlotPath::Skip,
        _ => SlotPath::Simple,
    }
}

/// Whether the slot casts a shadow in this pass.
pub fn shadow_enabled(style: &StyleParams, slot: &DeviceSlot) -> bool {
    style.enable_shadow && slot.shadow
}

/// Inputs for drawing one slot.
pub(crate) struct SlotDraw<'a> {
    pub(crate) slot: &'a DeviceSlot,
    pub(crate) path: SlotPath,
    pub(crate) screenshot: &'a DecodedImage,
    pub(crate) frame: Option<&'a FrameArt>,
    pub(crate) shadow: bool,
}

/// Blurred, offset silhouette of a rounded rectangle.
pub(crate) fn draw_shadow(
    surface: &mut Surface,
    rect: Rect,
    radius: f64,
    opts: &ShadowOpts,
) -> ShotResult<()> {
    if opts.color.a == 0 {
        return Ok(());
    }
    let sigma = opts.blur / 2.0;
    let pad = (sigma * 3.0).ceil() + 1.0;
    let shape = rounded_rect(rect + Vec2::new(opts.offset_x, opts.offset_y), radius);
    let limit = Rect::new(
        0.0,
        0.0,
        f64::from(surface.width()),
        f64::from(surface.height()),
    )
    .inflate(pad, pad);
    let Some(mut mask) = AlphaMask::from_path(&shape, pad, limit)? else {
        return Ok(());
    };
    if sigma > 0.0 {
        mask.blur(sigma)?;
    }
    surface.fill_mask(&mask, opts.color);
    Ok(())
}

/// Map `crop` of an image onto `dest`.
fn crop_transform(crop: CropRect, dest: Rect) -> Affine {
    Affine::translate((dest.x0, dest.y0))
        * Affine::scale_non_uniform(dest.width() / crop.sw, dest.height() / crop.sh)
        * Affine::translate((-crop.sx, -crop.sy))
}

fn fill_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: vello_cpu::Image,
    crop: CropRect,
    dest: Rect,
) {
    ctx.set_transform(affine_to_cpu(crop_transform(crop, dest)));
    ctx.set_paint(paint);
    ctx.fill_rect(&rect_to_cpu(crop.to_rect()));
}

fn draw_clipped_screenshot(
    ctx: &mut vello_cpu::RenderContext,
    img: &DecodedImage,
    slot: &DeviceSlot,
    radius: f64,
) {
    let dest = slot.rect.to_rect();
    let crop = cover_fit(
        f64::from(img.width),
        f64::from(img.height),
        dest.width(),
        dest.height(),
        slot.crop,
    );
    let paint = img.paint();

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.push_clip_layer(&bezpath_to_cpu(&rounded_rect(dest, radius)));
    fill_image(ctx, paint, crop, dest);
    ctx.pop_layer();
}

/// Frame art as an image paint plus the source size it is drawn from.
fn frame_paint(art: &FrameArt, dest: Rect) -> ShotResult<(vello_cpu::Image, CropRect)> {
    let img = match art {
        FrameArt::Raster(img) => img.clone(),
        FrameArt::Vector(tree) => {
            let w = dest.width().ceil().max(1.0) as u32;
            let h = dest.height().ceil().max(1.0) as u32;
            rasterize_svg(tree, w, h)?
        }
    };
    Ok((
        img.paint(),
        CropRect::full(f64::from(img.width), f64::from(img.height)),
    ))
}

fn draw_simple(surface: &mut Surface, d: &SlotDraw<'_>, opts: &RenderOpts) -> ShotResult<()> {
    let rect = d.slot.rect.to_rect();
    let radius = d.slot.border_radius;
    if d.shadow {
        draw_shadow(surface, rect, radius, &opts.shadow)?;
    }
    surface.draw_layer(|ctx| {
        draw_clipped_screenshot(ctx, d.screenshot, d.slot, radius);
        if opts.border_width > 0.0 && opts.border_color.a > 0 {
            let c = opts.border_color;
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(opts.border_width));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.stroke_path(&bezpath_to_cpu(&rounded_rect(rect, radius)));
        }
        Ok(())
    })
}

fn draw_framed(
    surface: &mut Surface,
    d: &SlotDraw<'_>,
    art: &FrameArt,
    opts: &RenderOpts,
) -> ShotResult<SlotPath> {
    let frame_rect = d.slot.frame_rect();
    let (paint, frame_src) = match frame_paint(art, frame_rect) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "frame could not be prepared, slot skipped");
            return Ok(SlotPath::Skip);
        }
    };

    let rect = d.slot.rect.to_rect();
    if d.shadow {
        draw_shadow(surface, rect, d.slot.border_radius, &opts.shadow)?;
    }
    surface.draw_layer(|ctx| {
        fill_image(ctx, paint, frame_src, frame_rect);
        draw_clipped_screenshot(
            ctx,
            d.screenshot,
            d.slot,
            d.slot.border_radius * opts.frame_radius_factor,
        );
        Ok(())
    })?;
    Ok(SlotPath::Framed)
}

/// Draw one slot onto the surface along its chosen path. Returns the path actually drawn.
pub(crate) fn draw_device(
    surface: &mut Surface,
    d: &SlotDraw<'_>,
    opts: &RenderOpts,
) -> ShotResult<SlotPath> {
    match (d.path, d.frame) {
        (SlotPath::Skip, _) | (SlotPath::Framed, None) => Ok(SlotPath::Skip),
        (SlotPath::Framed, Some(art)) => draw_framed(surface, d, art, opts),
        (SlotPath::Simple, _) => {
            draw_simple(surface, d, opts)?;
            Ok(SlotPath::Simple)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/device.rs"]
mod tests;
