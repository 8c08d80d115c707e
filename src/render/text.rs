use crate::assets::fonts::{FontBook, FontFace, TextBrushRgba8};
use crate::foundation::core::{Affine, Rgba8};
use crate::foundation::error::ShotResult;
use crate::render::geometry::affine_to_cpu;
use crate::scene::template::TextAlign;

/// Width of a string in one fixed font and size.
pub trait TextMeasure {
    /// Advance width of `text`, trailing whitespace included.
    fn measure(&mut self, text: &str) -> f64;
}

impl<F: FnMut(&str) -> f64> TextMeasure for F {
    fn measure(&mut self, text: &str) -> f64 {
        self(text)
    }
}

/// Measures with a resolved face from a [`FontBook`].
pub struct FaceMeasure<'a> {
    fonts: &'a mut FontBook,
    face: &'a FontFace,
    size_px: f32,
}

impl<'a> FaceMeasure<'a> {
    /// Measure `face` at `size_px`.
    pub fn new(fonts: &'a mut FontBook, face: &'a FontFace, size_px: f32) -> Self {
        Self {
            fonts,
            face,
            size_px,
        }
    }
}

impl TextMeasure for FaceMeasure<'_> {
    fn measure(&mut self, text: &str) -> f64 {
        self.fonts.measure(text, self.face, self.size_px)
    }
}

/// Greedy word wrap.
///
/// Words are separated by single spaces and never split. Each emitted line keeps the trailing
/// space of its last word. A word wider than `max_width` gets a line of its own.
pub fn wrap_lines(content: &str, max_width: f64, measure: &mut impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in content.split(' ') {
        let test = format!("{line}{word} ");
        if measure.measure(&test) > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line = format!("{word} ");
        } else {
            line = test;
        }
    }
    lines.push(line);
    lines
}

/// A wrapped line with its top-left origin.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// Line text, trailing space included.
    pub text: String,
    /// Left edge after alignment.
    pub x: f64,
    /// Top of the line.
    pub y: f64,
    /// Measured width.
    pub width: f64,
}

/// Left edge of a line of `width` anchored at `x`.
pub fn aligned_x(align: TextAlign, x: f64, width: f64) -> f64 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    }
}

/// Wrap `content` and position every line, advancing `line_advance` per line from `y`.
pub fn place_lines(
    content: &str,
    x: f64,
    y: f64,
    align: TextAlign,
    max_width: f64,
    line_advance: f64,
    measure: &mut impl TextMeasure,
) -> Vec<PlacedLine> {
    wrap_lines(content, max_width, measure)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = measure.measure(&text);
            PlacedLine {
                x: aligned_x(align, x, width),
                y: y + line_advance * i as f64,
                width,
                text,
            }
        })
        .collect()
}

/// Fill the glyphs of already placed lines.
pub(crate) fn draw_lines(
    ctx: &mut vello_cpu::RenderContext,
    fonts: &mut FontBook,
    face: &FontFace,
    size_px: f32,
    color: Rgba8,
    lines: &[PlacedLine],
) -> ShotResult<()> {
    let brush = TextBrushRgba8::from(color);
    for placed in lines {
        let layout = fonts.layout_line(&placed.text, face, size_px, brush);
        ctx.set_transform(affine_to_cpu(Affine::translate((placed.x, placed.y))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&face.data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
