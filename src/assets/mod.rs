//! Asset references, fetching, decoding, the loading barrier, fonts and palette extraction.

pub(crate) mod decode;
pub(crate) mod fonts;
pub(crate) mod loader;
pub(crate) mod palette;
pub(crate) mod source;
