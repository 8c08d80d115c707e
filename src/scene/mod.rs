//! Boundary data model: templates, style options and the per-pass input record.

pub(crate) mod input;
pub(crate) mod library;
pub(crate) mod style;
pub(crate) mod template;
