use crate::foundation::core::{Point, Rgba8};
use crate::render::surface::Surface;
use crate::scene::style::{GradientDirection, StyleParams};

/// Start and end points of the gradient axis for a `width`×`height` canvas.
pub fn gradient_vector(dir: GradientDirection, width: f64, height: f64) -> (Point, Point) {
    let (w, h) = (width, height);
    let (x0, y0, x1, y1) = match dir {
        GradientDirection::ToRight => (0.0, 0.0, w, 0.0),
        GradientDirection::ToLeft => (w, 0.0, 0.0, 0.0),
        GradientDirection::ToBottom => (0.0, 0.0, 0.0, h),
        GradientDirection::ToTop => (0.0, h, 0.0, 0.0),
        GradientDirection::ToBottomRight => (0.0, 0.0, w, h),
        GradientDirection::ToBottomLeft => (w, 0.0, 0.0, h),
        GradientDirection::ToTopRight => (0.0, h, w, 0.0),
        GradientDirection::ToTopLeft => (w, h, 0.0, 0.0),
    };
    (Point::new(x0, y0), Point::new(x1, y1))
}

/// Interpolate two straight-alpha colors; `t` is clamped to `[0, 1]`.
pub(crate) fn lerp_color(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| -> u8 {
        let af = f64::from(a);
        let bf = f64::from(b);
        (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgba8::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b), lerp(a.a, b.a))
}

/// Fill the whole surface with the style's solid color or two-stop linear gradient.
pub(crate) fn paint_background(surface: &mut Surface, style: &StyleParams) {
    let (w, h) = (surface.width(), surface.height());
    let start = style.background_color;
    let Some(end) = style.gradient_end() else {
        let px = start.to_premul().to_array();
        for d in surface.data_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        return;
    };

    let (p0, p1) = gradient_vector(style.gradient_direction, f64::from(w), f64::from(h));
    let axis = p1 - p0;
    let len2 = axis.hypot2();
    let data = surface.data_mut();
    for y in 0..h {
        for x in 0..w {
            let c = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let t = if len2 > 0.0 {
                (c - p0).dot(axis) / len2
            } else {
                0.0
            };
            let px = lerp_color(start, end, t).to_premul().to_array();
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            data[idx..idx + 4].copy_from_slice(&px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
