//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no config file at all) is valid.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ShotError, ShotResult};

/// How the compositor reacts when some of a pass's assets fail to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Only the slots whose own assets failed are affected: a failed screenshot or frame skips
    /// its slot.
    #[default]
    PerSlot,
    /// Any failure drops the whole device layer for the pass (background and text still draw).
    AbortDevices,
}

/// Drop shadow constants used for device slots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowOpts {
    /// Shadow color (straight alpha).
    pub color: Rgba8,
    /// Blur extent in pixels, with the same meaning as a canvas `shadowBlur`.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl Default for ShadowOpts {
    fn default() -> Self {
        Self {
            color: Rgba8::new(0, 0, 0, 64),
            blur: 40.0,
            offset_x: 0.0,
            offset_y: 20.0,
        }
    }
}

/// Dominant color extraction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOpts {
    /// Side of the square sampling grid.
    pub grid: u32,
    /// Channel quantization step.
    pub bucket: u8,
    /// Keys with average brightness above this are discarded.
    pub near_white: f64,
    /// Keys with average brightness below this are discarded.
    pub near_black: f64,
    /// Number of most frequent keys considered.
    pub candidates: usize,
    /// Minimum Euclidean RGB distance between accepted colors (exclusive).
    pub min_distance: f64,
    /// Palette capacity.
    pub max_colors: usize,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        Self {
            grid: 100,
            bucket: 32,
            near_white: 240.0,
            near_black: 15.0,
            candidates: 12,
            min_distance: 50.0,
            max_colors: 6,
        }
    }
}

/// Options consumed by the compositor for one render pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOpts {
    /// Device slot drop shadow.
    pub shadow: ShadowOpts,
    /// Border stroked around unframed screenshots.
    pub border_color: Rgba8,
    /// Border stroke width in pixels.
    pub border_width: f64,
    /// Screenshot corner radius multiplier inside a device frame.
    pub frame_radius_factor: f64,
    /// Line advance as a multiple of the font size.
    pub line_height_factor: f64,
    /// Asset failure handling.
    pub failure_policy: FailurePolicy,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            shadow: ShadowOpts::default(),
            border_color: Rgba8::new(0, 0, 0, 26),
            border_width: 1.0,
            frame_radius_factor: 0.7,
            line_height_factor: 1.2,
            failure_policy: FailurePolicy::PerSlot,
        }
    }
}

/// Top-level configuration for sessions and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShotframeConfig {
    /// Base directory for relative asset paths.
    pub assets_root: PathBuf,
    /// Font files registered at startup.
    pub fonts: Vec<PathBuf>,
    /// Family used when a requested family is not registered.
    pub fallback_family: Option<String>,
    /// Quiet window before a burst of change requests triggers a render.
    pub debounce_ms: u64,
    /// Maximum number of decoded assets kept between passes.
    pub asset_cache_capacity: usize,
    /// Compositor options.
    pub render: RenderOpts,
    /// Palette extraction options.
    pub extract: ExtractOpts,
}

impl Default for ShotframeConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            fonts: Vec::new(),
            fallback_family: None,
            debounce_ms: 100,
            asset_cache_capacity: 32,
            render: RenderOpts::default(),
            extract: ExtractOpts::default(),
        }
    }
}

impl ShotframeConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ShotResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ShotError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ShotResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ShotError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply `SHOTFRAME_DEBOUNCE_MS` and `SHOTFRAME_ASSETS_ROOT` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = std::env::var("SHOTFRAME_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.debounce_ms = ms;
        }
        if let Some(root) = std::env::var_os("SHOTFRAME_ASSETS_ROOT").filter(|v| !v.is_empty()) {
            self.assets_root = PathBuf::from(root);
        }
        self
    }

    /// Check numeric ranges.
    pub fn validate(&self) -> ShotResult<()> {
        fn finite_nonneg(name: &str, v: f64) -> ShotResult<()> {
            if !v.is_finite() || v < 0.0 {
                return Err(ShotError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
            Ok(())
        }

        let r = &self.render;
        finite_nonneg("render.shadow.blur", r.shadow.blur)?;
        if !r.shadow.offset_x.is_finite() || !r.shadow.offset_y.is_finite() {
            return Err(ShotError::validation("render.shadow offsets must be finite"));
        }
        finite_nonneg("render.borderWidth", r.border_width)?;
        finite_nonneg("render.frameRadiusFactor", r.frame_radius_factor)?;
        if !r.line_height_factor.is_finite() || r.line_height_factor <= 0.0 {
            return Err(ShotError::validation(
                "render.lineHeightFactor must be finite and > 0",
            ));
        }

        let e = &self.extract;
        if e.grid == 0 || e.grid > 1024 {
            return Err(ShotError::validation("extract.grid must be in 1..=1024"));
        }
        if e.bucket == 0 {
            return Err(ShotError::validation("extract.bucket must be > 0"));
        }
        finite_nonneg("extract.minDistance", e.min_distance)?;
        if e.max_colors == 0 {
            return Err(ShotError::validation("extract.maxColors must be > 0"));
        }
        if self.asset_cache_capacity == 0 {
            return Err(ShotError::validation("assetCacheCapacity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
