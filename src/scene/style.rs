use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;

/// One of the eight canonical linear gradient directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GradientDirection {
    /// `to right`
    ToRight,
    /// `to left`
    ToLeft,
    /// `to bottom`
    ToBottom,
    /// `to top`
    ToTop,
    /// `to bottom-right`
    #[default]
    ToBottomRight,
    /// `to bottom-left`
    ToBottomLeft,
    /// `to top-right`
    ToTopRight,
    /// `to top-left`
    ToTopLeft,
}

impl GradientDirection {
    /// All directions in table order.
    pub const ALL: [Self; 8] = [
        Self::ToRight,
        Self::ToLeft,
        Self::ToBottom,
        Self::ToTop,
        Self::ToBottomRight,
        Self::ToBottomLeft,
        Self::ToTopRight,
        Self::ToTopLeft,
    ];

    /// Parse a canonical direction string; anything unrecognized maps to `to bottom-right`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "to right" => Self::ToRight,
            "to left" => Self::ToLeft,
            "to bottom" => Self::ToBottom,
            "to top" => Self::ToTop,
            "to bottom-right" | "to bottom right" | "to right bottom" => Self::ToBottomRight,
            "to bottom-left" | "to bottom left" | "to left bottom" => Self::ToBottomLeft,
            "to top-right" | "to top right" | "to right top" => Self::ToTopRight,
            "to top-left" | "to top left" | "to left top" => Self::ToTopLeft,
            _ => Self::ToBottomRight,
        }
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToRight => "to right",
            Self::ToLeft => "to left",
            Self::ToBottom => "to bottom",
            Self::ToTop => "to top",
            Self::ToBottomRight => "to bottom-right",
            Self::ToBottomLeft => "to bottom-left",
            Self::ToTopRight => "to top-right",
            Self::ToTopLeft => "to top-left",
        }
    }
}

impl Serialize for GradientDirection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GradientDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&s))
    }
}

/// Render-time style options, independent of the selected template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleParams {
    /// Solid background, or the first gradient stop.
    pub background_color: Rgba8,
    /// Second gradient stop.
    pub background_color2: Option<Rgba8>,
    /// Use a gradient when a second color is present.
    pub use_gradient: bool,
    /// Gradient vector.
    pub gradient_direction: GradientDirection,
    /// Fill color for text elements.
    pub text_color: Rgba8,
    /// Requested font family for text elements.
    pub font_family: String,
    /// Global drop-shadow switch (slots must also opt in).
    pub enable_shadow: bool,
    /// Global device-frame switch (slots may still opt out).
    pub enable_mockups: bool,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            background_color: Rgba8::WHITE,
            background_color2: Some(Rgba8::BLACK),
            use_gradient: false,
            gradient_direction: GradientDirection::ToBottomRight,
            text_color: Rgba8::rgb(0x11, 0x11, 0x11),
            font_family: "Inter".to_owned(),
            enable_shadow: true,
            enable_mockups: true,
        }
    }
}

impl StyleParams {
    /// Parse style options from a JSON reader; missing fields take defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> crate::ShotResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| crate::ShotError::validation(format!("parse style JSON: {e}")))
    }

    /// Gradient end color when gradient mode is active.
    pub fn gradient_end(&self) -> Option<Rgba8> {
        if self.use_gradient {
            self.background_color2
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
