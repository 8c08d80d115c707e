use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ShotError, ShotResult};
use crate::scene::template::FontWeight;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One registered font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Family name as reported by the font.
    pub family: String,
    /// Numeric weight (100..=900).
    pub weight: u16,
    /// Face index within its collection file.
    pub index: u32,
    /// Raster-side font handle.
    pub data: vello_cpu::peniko::FontData,
}

/// Registry of font faces with family/weight resolution.
///
/// Only explicitly registered fonts are used, so output never depends on the host's installed
/// fonts. A family that is not registered resolves to the configured fallback family, or to the
/// first registered face; each unknown family is reported once.
pub struct FontBook {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    faces: Vec<FontFace>,
    fallback_family: Option<String>,
    warned: HashSet<String>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.len())
            .field("fallback_family", &self.fallback_family)
            .finish()
    }
}

impl FontBook {
    /// Empty font book with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            fallback_family: None,
            warned: HashSet::new(),
        }
    }

    /// Load every font file in `paths` and set the fallback family.
    pub fn from_files<P: AsRef<Path>>(
        paths: &[P],
        fallback_family: Option<String>,
    ) -> ShotResult<Self> {
        let mut book = Self::new();
        for p in paths {
            book.register_path(p)?;
        }
        book.fallback_family = fallback_family;
        Ok(book)
    }

    /// Register all faces contained in font file bytes (TTF, OTF or collections).
    ///
    /// Returns the family names that were added.
    pub fn register_bytes(&mut self, bytes: Vec<u8>) -> ShotResult<Vec<String>> {
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        if registered.is_empty() {
            return Err(ShotError::font("no font families registered from font bytes"));
        }

        let blob = vello_cpu::peniko::Blob::from(bytes);
        let mut families = Vec::new();
        for (family_id, infos) in registered {
            let family = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| ShotError::font("registered font family has no name"))?
                .to_string();
            for info in infos {
                self.faces.push(FontFace {
                    family: family.clone(),
                    weight: info.weight().value().round().clamp(1.0, 1000.0) as u16,
                    index: info.index(),
                    data: vello_cpu::peniko::FontData::new(blob.clone(), info.index()),
                });
            }
            tracing::debug!(family = %family, "registered font family");
            families.push(family);
        }
        Ok(families)
    }

    /// Read and register a font file.
    pub fn register_path(&mut self, path: impl AsRef<Path>) -> ShotResult<Vec<String>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ShotError::font(format!("read font '{}': {e}", path.display())))?;
        self.register_bytes(bytes)
            .map_err(|e| ShotError::font(format!("{}: {e}", path.display())))
    }

    /// Return `true` when no faces are registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Registered family names, deduplicated, in registration order.
    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in &self.faces {
            if !out.contains(&f.family.as_str()) {
                out.push(&f.family);
            }
        }
        out
    }

    fn nearest_in_family(&self, family: &str, weight: u16) -> Option<&FontFace> {
        self.faces
            .iter()
            .filter(|f| f.family.eq_ignore_ascii_case(family))
            .min_by_key(|f| (f.weight.abs_diff(weight), u16::MAX - f.weight))
    }

    /// Resolve `family` at `weight` to a registered face.
    ///
    /// Unknown families fall back silently (one warning per family). Fails only when the book
    /// has no faces at all.
    pub fn resolve(&mut self, family: &str, weight: FontWeight) -> ShotResult<FontFace> {
        let w = weight.value();
        if let Some(face) = self.nearest_in_family(family, w) {
            return Ok(face.clone());
        }

        let fallback = self
            .fallback_family
            .as_deref()
            .and_then(|fb| self.nearest_in_family(fb, w))
            .or_else(|| {
                let first = self.faces.first()?;
                self.nearest_in_family(&first.family, w)
            })
            .cloned()
            .ok_or_else(|| ShotError::font("no fonts registered"))?;

        if self.warned.insert(family.to_ascii_lowercase()) {
            tracing::warn!(
                requested = %family,
                using = %fallback.family,
                "font family not available, using fallback"
            );
        }
        Ok(fallback)
    }

    /// Shape `text` as a single unbroken line in `face`.
    pub fn layout_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(format!("\"{}\"", face.family))),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Advance width of `text` in `face`, trailing whitespace included.
    pub fn measure(&mut self, text: &str, face: &FontFace, size_px: f32) -> f64 {
        f64::from(
            self.layout_line(text, face, size_px, TextBrushRgba8::default())
                .full_width(),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
