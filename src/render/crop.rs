use crate::foundation::core::Rect;

/// Source sub-rectangle of an image, in image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    /// Left edge.
    pub sx: f64,
    /// Top edge.
    pub sy: f64,
    /// Width.
    pub sw: f64,
    /// Height.
    pub sh: f64,
}

impl CropRect {
    /// Whole image.
    pub fn full(iw: f64, ih: f64) -> Self {
        Self {
            sx: 0.0,
            sy: 0.0,
            sw: iw,
            sh: ih,
        }
    }

    /// As a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.sx, self.sy, self.sx + self.sw, self.sy + self.sh)
    }
}

/// Source rectangle that fills a `tw`×`th` target without distortion.
///
/// Images wider than the target are cropped symmetrically left and right; taller images keep
/// their top edge and lose the bottom, since page captures put the interesting content first.
/// With `crop == false`, or degenerate sizes, the full image is returned (stretched by the
/// caller).
pub fn cover_fit(iw: f64, ih: f64, tw: f64, th: f64, crop: bool) -> CropRect {
    let valid = [iw, ih, tw, th].iter().all(|v| v.is_finite() && *v > 0.0);
    if !crop || !valid {
        return CropRect::full(iw, ih);
    }

    let img_aspect = iw / ih;
    let target_aspect = tw / th;
    if img_aspect > target_aspect {
        let sw = ih * target_aspect;
        CropRect {
            sx: (iw - sw) / 2.0,
            sy: 0.0,
            sw,
            sh: ih,
        }
    } else {
        CropRect {
            sx: 0.0,
            sy: 0.0,
            sw: iw,
            sh: iw / target_aspect,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/crop.rs"]
mod tests;
