use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{ShotError, ShotResult};

fn yes() -> bool {
    true
}

/// Declarative layout for one composite image.
///
/// Templates are immutable once loaded. Reloading produces a new instance that replaces the old
/// one wholesale (see [`crate::TemplateLibrary`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable identifier used for lookup.
    pub id: String,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Output canvas size.
    pub canvas: Canvas,
    /// Primary desktop and mobile slots.
    #[serde(default)]
    pub devices: DeviceSlots,
    /// Additional slots drawn after the primary ones, in order.
    #[serde(default)]
    pub extra_devices: Vec<DeviceSlot>,
    /// Text overlays drawn last, in order.
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

/// The two named device slots of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSlots {
    /// Slot fed by the desktop capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<DeviceSlot>,
    /// Slot fed by the mobile capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<DeviceSlot>,
}

/// Which capture feeds a device slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotKind {
    /// Desktop viewport capture.
    Desktop,
    /// Mobile viewport capture.
    Mobile,
}

/// Placement rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PlacementRect {
    /// Convert to a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn validate(self, what: &str) -> ShotResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ShotError::validation(format!(
                "{what}: rectangle must be finite with width/height > 0"
            )));
        }
        Ok(())
    }
}

/// A placement region hosting one screenshot, optionally inside a device frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSlot {
    /// Screenshot placement.
    #[serde(flatten)]
    pub rect: PlacementRect,
    /// Corner radius of the screenshot.
    #[serde(default)]
    pub border_radius: f64,
    /// Whether this slot may cast a drop shadow.
    #[serde(default)]
    pub shadow: bool,
    /// `true` for cover-fit cropping, `false` to stretch.
    #[serde(default = "yes")]
    pub crop: bool,
    /// `false` forces the unframed path even when mockups are enabled globally.
    #[serde(default = "yes")]
    pub mockup: bool,
    /// Frame asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mockup_image: Option<String>,
    /// Frame placement; defaults to the screenshot placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mockup_config: Option<PlacementRect>,
    /// Capture feeding this slot; defaults depend on the slot role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotKind>,
}

impl DeviceSlot {
    /// Unframed slot at the given rectangle with default flags.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            rect: PlacementRect {
                x,
                y,
                width,
                height,
            },
            border_radius: 0.0,
            shadow: false,
            crop: true,
            mockup: true,
            mockup_image: None,
            mockup_config: None,
            screenshot: None,
        }
    }

    /// Rectangle the frame is drawn into.
    pub fn frame_rect(&self) -> Rect {
        self.mockup_config.unwrap_or(self.rect).to_rect()
    }
}

/// Position of a slot within the template's draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    /// `devices.desktop`.
    Desktop,
    /// `devices.mobile`.
    Mobile,
    /// `extraDevices[i]`.
    Extra(usize),
}

impl SlotRole {
    /// Capture used when the slot does not name one.
    pub fn default_screenshot(self) -> ScreenshotKind {
        match self {
            Self::Mobile => ScreenshotKind::Mobile,
            Self::Desktop | Self::Extra(_) => ScreenshotKind::Desktop,
        }
    }
}

impl std::fmt::Display for SlotRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desktop => f.write_str("desktop"),
            Self::Mobile => f.write_str("mobile"),
            Self::Extra(i) => write!(f, "extra[{i}]"),
        }
    }
}

/// Element discriminator; only text elements exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Wrapped text.
    #[default]
    Text,
}

/// Resolved font weight class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// 400.
    #[default]
    Normal,
    /// 700.
    Bold,
}

impl FontWeight {
    /// Numeric CSS weight.
    pub fn value(self) -> u16 {
        match self {
            Self::Normal => 400,
            Self::Bold => 700,
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Num(f64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Name(s) if s.trim().eq_ignore_ascii_case("bold") => Self::Bold,
            Repr::Name(s) => match s.trim().parse::<f64>() {
                Ok(n) if n >= 600.0 => Self::Bold,
                _ => Self::Normal,
            },
            Repr::Num(n) if n >= 600.0 => Self::Bold,
            Repr::Num(_) => Self::Normal,
        })
    }
}

/// Horizontal anchor of a text line relative to the element's `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Line starts at `x`.
    #[default]
    #[serde(alias = "start")]
    Left,
    /// Line is centered on `x`.
    Center,
    /// Line ends at `x`.
    #[serde(alias = "end")]
    Right,
}

/// A text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Key into the runtime text override map.
    pub id: String,
    /// Element discriminator (`"text"`).
    #[serde(rename = "type", default)]
    pub kind: ElementKind,
    /// Anchor x.
    pub x: f64,
    /// Top of the first line.
    pub y: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Weight class.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Horizontal alignment.
    #[serde(default)]
    pub text_align: TextAlign,
    /// Wrap width; defaults to the canvas width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Content used when no override is supplied.
    #[serde(default)]
    pub content: String,
}

impl TextElement {
    /// Wrap width, falling back to the canvas width.
    pub fn max_width_or(&self, canvas: Canvas) -> f64 {
        self.max_width.unwrap_or(f64::from(canvas.width))
    }
}

impl Template {
    /// Parse a template from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> ShotResult<Self> {
        let t: Self = serde_json::from_reader(r)
            .map_err(|e| ShotError::validation(format!("parse template JSON: {e}")))?;
        t.validate()?;
        Ok(t)
    }

    /// Parse a template from a JSON string and validate it.
    pub fn from_json_str(s: &str) -> ShotResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a template from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ShotResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ShotError::validation(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check structural invariants.
    pub fn validate(&self) -> ShotResult<()> {
        if self.id.trim().is_empty() {
            return Err(ShotError::validation("template id must be non-empty"));
        }
        self.canvas.validate()?;

        for (role, slot) in self.slots() {
            slot.rect.validate(&format!("slot {role}"))?;
            if let Some(m) = slot.mockup_config {
                m.validate(&format!("slot {role} mockupConfig"))?;
            }
            if !slot.border_radius.is_finite() {
                return Err(ShotError::validation(format!(
                    "slot {role}: borderRadius must be finite"
                )));
            }
        }

        let mut ids = BTreeSet::new();
        for el in &self.elements {
            if !ids.insert(el.id.as_str()) {
                return Err(ShotError::validation(format!(
                    "duplicate text element id \"{}\"",
                    el.id
                )));
            }
            if !el.font_size.is_finite() || el.font_size <= 0.0 {
                return Err(ShotError::validation(format!(
                    "text element \"{}\": fontSize must be finite and > 0",
                    el.id
                )));
            }
            if !el.x.is_finite() || !el.y.is_finite() {
                return Err(ShotError::validation(format!(
                    "text element \"{}\": position must be finite",
                    el.id
                )));
            }
            if let Some(w) = el.max_width
                && (!w.is_finite() || w <= 0.0)
            {
                return Err(ShotError::validation(format!(
                    "text element \"{}\": maxWidth must be finite and > 0",
                    el.id
                )));
            }
        }
        Ok(())
    }

    /// Device slots in draw order: desktop, mobile, then extra devices.
    pub fn slots(&self) -> impl Iterator<Item = (SlotRole, &DeviceSlot)> {
        let primary = [
            (SlotRole::Desktop, self.devices.desktop.as_ref()),
            (SlotRole::Mobile, self.devices.mobile.as_ref()),
        ];
        primary
            .into_iter()
            .filter_map(|(role, slot)| slot.map(|s| (role, s)))
            .chain(
                self.extra_devices
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (SlotRole::Extra(i), s)),
            )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
