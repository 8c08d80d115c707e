use kurbo::{PathEl, Shape};

use crate::foundation::core::{Affine, BezPath, Point, Rect};

const PATH_TOLERANCE: f64 = 0.1;

/// Saturate a corner radius to `[0, min(w, h) / 2]`.
///
/// Non-finite radii collapse to square corners.
pub fn clamp_radius(width: f64, height: f64, radius: f64) -> f64 {
    if !radius.is_finite() {
        return 0.0;
    }
    let max = (width.min(height) / 2.0).max(0.0);
    radius.clamp(0.0, max)
}

/// Closed rounded-rectangle outline with quarter-circle corners.
///
/// A zero radius yields a plain rectangle.
pub fn rounded_rect_path(x: f64, y: f64, width: f64, height: f64, radius: f64) -> BezPath {
    let r = clamp_radius(width, height, radius);
    let (x1, y1) = (x + width, y + height);
    if r == 0.0 {
        return Rect::new(x, y, x1, y1).to_path(PATH_TOLERANCE);
    }
    kurbo::RoundedRect::new(x, y, x1, y1, r).to_path(PATH_TOLERANCE)
}

/// [`rounded_rect_path`] for a `kurbo` rectangle.
pub fn rounded_rect(rect: Rect, radius: f64) -> BezPath {
    rounded_rect_path(rect.x0, rect.y0, rect.width(), rect.height(), radius)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
