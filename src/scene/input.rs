use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::source::AssetSource;
use crate::foundation::math::Fnv1a64;
use crate::scene::style::StyleParams;
use crate::scene::template::{ScreenshotKind, Template, TextElement};

/// Screenshots and metadata produced by the capture backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CaptureSet {
    /// Desktop viewport capture.
    pub desktop: Option<AssetSource>,
    /// Mobile viewport capture.
    pub mobile: Option<AssetSource>,
    /// Page title reported alongside the captures.
    pub page_title: Option<String>,
}

impl CaptureSet {
    /// Source for the given capture kind.
    pub fn get(&self, kind: ScreenshotKind) -> Option<&AssetSource> {
        match kind {
            ScreenshotKind::Desktop => self.desktop.as_ref(),
            ScreenshotKind::Mobile => self.mobile.as_ref(),
        }
    }
}

/// Immutable input record for one render pass.
///
/// Sessions compare [`RenderInput::fingerprint`] values to decide whether a new pass is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    /// Selected template.
    pub template: Arc<Template>,
    /// Style options.
    pub style: StyleParams,
    /// Runtime text overrides keyed by element id.
    pub text_contents: BTreeMap<String, String>,
    /// Screenshot sources.
    pub captures: CaptureSet,
}

impl RenderInput {
    /// Input with default style, no overrides and no captures.
    pub fn new(template: Arc<Template>) -> Self {
        Self {
            template,
            style: StyleParams::default(),
            text_contents: BTreeMap::new(),
            captures: CaptureSet::default(),
        }
    }

    /// Replace the style.
    pub fn with_style(mut self, style: StyleParams) -> Self {
        self.style = style;
        self
    }

    /// Replace the captures.
    pub fn with_captures(mut self, captures: CaptureSet) -> Self {
        self.captures = captures;
        self
    }

    /// Set one text override.
    pub fn with_text(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.text_contents.insert(id.into(), content.into());
        self
    }

    /// Content to draw for `el`, or `None` when the resolved content is blank.
    ///
    /// Precedence: override map, then the page title (element id `title` only), then the
    /// element's default content.
    pub fn resolved_text<'a>(&'a self, el: &'a TextElement) -> Option<&'a str> {
        let content = self
            .text_contents
            .get(&el.id)
            .map(String::as_str)
            .or_else(|| {
                (el.id == "title")
                    .then_some(self.captures.page_title.as_deref())
                    .flatten()
            })
            .unwrap_or(el.content.as_str());
        if content.trim().is_empty() {
            None
        } else {
            Some(content)
        }
    }

    /// Stable 64-bit digest of everything that influences the rendered output.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        match serde_json::to_vec(self.template.as_ref()) {
            Ok(bytes) => h.write_bytes(&bytes),
            Err(_) => h.write_str(&self.template.id),
        }
        h.write_u8(0xff);
        match serde_json::to_vec(&self.style) {
            Ok(bytes) => h.write_bytes(&bytes),
            Err(_) => h.write_str(&self.style.font_family),
        }
        h.write_u8(0xff);
        h.write_u32(self.text_contents.len() as u32);
        for (k, v) in &self.text_contents {
            h.write_str(k);
            h.write_str(v);
        }
        for src in [&self.captures.desktop, &self.captures.mobile] {
            match src {
                Some(s) => h.write_str(&s.cache_key()),
                None => h.write_u8(0),
            }
        }
        match &self.captures.page_title {
            Some(t) => h.write_str(t),
            None => h.write_u8(0),
        }
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/input.rs"]
mod tests;
