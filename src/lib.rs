//! Shotframe composes website screenshots into marketing-style mockup images.
//!
//! A [`Template`] fixes the canvas, device slots and text elements; [`StyleParams`] and a
//! [`RenderInput`] fill in colors, copy and screenshot references. Rendering runs in two steps:
//!
//! - An [`AssetLoader`] resolves every capture and device frame the pass needs
//! - A [`Compositor`] draws background, devices and text into a [`FrameRGBA`]
//!
//! Interactive callers drive a [`RenderSession`], which debounces change requests, abandons
//! superseded passes and publishes only the newest frame.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset references, loading, fonts and palette extraction.
pub mod assets;
/// Runtime configuration.
pub mod config;
/// Raster compositor.
pub mod render;
/// Boundary data model.
pub mod scene;
/// Debounced, cancellable render sessions.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, MAX_SURFACE_DIM, Point, Rect, Rgba8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ShotError, ShotResult};

pub use crate::assets::decode::{DecodedImage, FrameArt, decode_frame, decode_image, parse_svg};
pub use crate::assets::fonts::{FontBook, FontFace, TextBrushRgba8};
pub use crate::assets::loader::{
    AssetFailure, AssetLoader, AssetRequest, AssetRole, ResolvedAssets, requests_for,
};
pub use crate::assets::palette::{
    PaletteEntry, extract_palette, extract_palette_from_bytes, preset_palette, suggest_palette,
};
pub use crate::assets::source::{AssetFetcher, AssetSource, DefaultFetcher, decode_data_uri};
pub use crate::config::{ExtractOpts, FailurePolicy, RenderOpts, ShadowOpts, ShotframeConfig};
pub use crate::render::background::gradient_vector;
pub use crate::render::compositor::{Compositor, RenderPass, SlotReport};
pub use crate::render::crop::{CropRect, cover_fit};
pub use crate::render::device::{FrameState, SlotPath, choose_path, shadow_enabled};
pub use crate::render::geometry::{clamp_radius, rounded_rect, rounded_rect_path};
pub use crate::render::surface::FrameRGBA;
pub use crate::render::text::{
    FaceMeasure, PlacedLine, TextMeasure, aligned_x, place_lines, wrap_lines,
};
pub use crate::scene::input::{CaptureSet, RenderInput};
pub use crate::scene::library::TemplateLibrary;
pub use crate::scene::style::{GradientDirection, StyleParams};
pub use crate::scene::template::{
    DeviceSlot, DeviceSlots, ElementKind, FontWeight, PlacementRect, ScreenshotKind, SlotRole,
    TextAlign, Template, TextElement,
};
pub use crate::session::render_session::{Committed, RenderSession, SessionHandle};
