use crate::assets::fonts::{FontBook, FontFace};
use crate::assets::loader::{AssetRole, ResolvedAssets};
use crate::config::{FailurePolicy, RenderOpts};
use crate::foundation::error::ShotResult;
use crate::render::background::paint_background;
use crate::render::device::{
    FrameState, SlotDraw, SlotPath, choose_path, draw_device, shadow_enabled,
};
use crate::render::surface::{FrameRGBA, Surface};
use crate::render::text::{FaceMeasure, PlacedLine, draw_lines, place_lines};
use crate::scene::input::RenderInput;
use crate::scene::template::SlotRole;

/// Everything one compositor run reads: the immutable input record and the assets that the
/// loading barrier resolved for it.
#[derive(Clone, Copy, Debug)]
pub struct RenderPass<'a> {
    /// Template, style, text and capture references.
    pub input: &'a RenderInput,
    /// Decoded assets for `input`.
    pub assets: &'a ResolvedAssets,
}

/// Per-slot decision taken during a pass, exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReport {
    /// Slot position in the template.
    pub role: SlotRole,
    /// Path the slot was drawn with.
    pub path: SlotPath,
}

/// Draws background, device slots and text into one raster.
///
/// Rendering is deterministic: the same pass always produces byte-identical output.
#[derive(Debug)]
pub struct Compositor {
    opts: RenderOpts,
    fonts: FontBook,
    last_slots: Vec<SlotReport>,
}

struct TextBlock {
    face: FontFace,
    size_px: f32,
    lines: Vec<PlacedLine>,
}

impl Compositor {
    /// Compositor drawing text with `fonts`.
    pub fn new(opts: RenderOpts, fonts: FontBook) -> Self {
        Self {
            opts,
            fonts,
            last_slots: Vec::new(),
        }
    }

    /// Slot decisions of the most recent pass.
    pub fn last_slots(&self) -> &[SlotReport] {
        &self.last_slots
    }

    /// Render one pass: background, then devices in template order, then text.
    #[tracing::instrument(skip_all, fields(template = %pass.input.template.id))]
    pub fn compose(&mut self, pass: &RenderPass<'_>) -> ShotResult<FrameRGBA> {
        let input = pass.input;
        let template = &input.template;
        let mut surface = Surface::new(template.canvas)?;

        paint_background(&mut surface, &input.style);
        self.draw_devices(&mut surface, pass);
        self.draw_text(&mut surface, input)?;

        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            "composed frame"
        );
        Ok(surface.to_frame())
    }

    fn draw_devices(&mut self, surface: &mut Surface, pass: &RenderPass<'_>) {
        self.last_slots.clear();
        let input = pass.input;
        let style = &input.style;

        let abort = self.opts.failure_policy == FailurePolicy::AbortDevices
            && !pass.assets.failures().is_empty();
        if abort {
            tracing::warn!(
                failures = pass.assets.failures().len(),
                "asset failures, device layer dropped for this pass"
            );
        }

        for (role, slot) in input.template.slots() {
            let kind = slot.screenshot.unwrap_or(role.default_screenshot());
            let screenshot = pass.assets.screenshot(kind).filter(|_| !abort);
            let frame = slot
                .mockup_image
                .as_deref()
                .and_then(|r| pass.assets.frame(r));
            let frame_state = match (&slot.mockup_image, frame) {
                (_, Some(_)) => FrameState::Ready,
                (Some(r), None) if pass.assets.failed(&AssetRole::Frame(r.clone())) => {
                    FrameState::Failed
                }
                _ => FrameState::Absent,
            };
            let path = choose_path(style, slot, screenshot.is_some(), frame_state);

            let Some(screenshot) = screenshot else {
                if !abort && input.captures.get(kind).is_some() {
                    tracing::warn!(slot = %role, "screenshot unavailable, slot skipped");
                }
                self.last_slots.push(SlotReport { role, path });
                continue;
            };
            if path == SlotPath::Skip {
                tracing::warn!(slot = %role, "frame unavailable, slot skipped");
                self.last_slots.push(SlotReport { role, path });
                continue;
            }

            let d = SlotDraw {
                slot,
                path,
                screenshot,
                frame,
                shadow: shadow_enabled(style, slot),
            };
            let drawn = match draw_device(surface, &d, &self.opts) {
                Ok(drawn) => drawn,
                Err(e) => {
                    tracing::warn!(slot = %role, error = %e, "slot failed to render");
                    path
                }
            };
            self.last_slots.push(SlotReport { role, path: drawn });
        }
    }

    fn draw_text(&mut self, surface: &mut Surface, input: &RenderInput) -> ShotResult<()> {
        let template = &input.template;
        let style = &input.style;
        let mut blocks = Vec::new();

        for el in &template.elements {
            let Some(content) = input.resolved_text(el) else {
                continue;
            };
            let face = match self.fonts.resolve(&style.font_family, el.font_weight) {
                Ok(face) => face,
                Err(e) => {
                    tracing::warn!(element = %el.id, error = %e, "text skipped");
                    continue;
                }
            };
            let size_px = el.font_size as f32;
            let lines = {
                let mut measure = FaceMeasure::new(&mut self.fonts, &face, size_px);
                place_lines(
                    content,
                    el.x,
                    el.y,
                    el.text_align,
                    el.max_width_or(template.canvas),
                    el.font_size * self.opts.line_height_factor,
                    &mut measure,
                )
            };
            blocks.push(TextBlock {
                face,
                size_px,
                lines,
            });
        }

        if blocks.is_empty() {
            return Ok(());
        }
        let fonts = &mut self.fonts;
        let color = style.text_color;
        surface.draw_layer(|ctx| {
            for b in &blocks {
                draw_lines(ctx, fonts, &b.face, b.size_px, color, &b.lines)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
