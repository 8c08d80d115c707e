//! Raster compositor: geometry, cropping, background, device slots and text.

pub(crate) mod background;
pub(crate) mod compositor;
pub(crate) mod crop;
pub(crate) mod device;
pub(crate) mod geometry;
pub(crate) mod surface;
pub(crate) mod text;
