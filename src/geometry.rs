//! Bounding boxes and contour helpers for binary masks

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use serde::Serialize;

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box enclosing every point, inclusive of the extreme pixels
    pub fn of_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.max(0) as u32;
        let min_y = min_y.max(0) as u32;
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x.max(0) as u32 + 1).saturating_sub(min_x),
            height: (max_y.max(0) as u32 + 1).saturating_sub(min_y),
        })
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Grow by `pad` on every side, then clamp to `[0, bound_width) x [0, bound_height)`
    pub fn pad_clamped(&self, pad: u32, bound_width: u32, bound_height: u32) -> BoundingBox {
        let x = self.x.saturating_sub(pad).min(bound_width);
        let y = self.y.saturating_sub(pad).min(bound_height);
        let right = self.right().saturating_add(pad).min(bound_width);
        let bottom = self.bottom().saturating_add(pad).min(bound_height);
        BoundingBox {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    /// Shift the origin back by `pad` and widen by `2 * pad`, clamping the
    /// origin at zero and the extent at the bounds
    ///
    /// Unlike [`pad_clamped`](Self::pad_clamped), a clamped origin does not
    /// shorten the far side: the box still spans up to `2 * pad` past its
    /// original size when room is left.
    pub fn expand_clamped(&self, pad: u32, bound_width: u32, bound_height: u32) -> BoundingBox {
        let x = self.x.saturating_sub(pad).min(bound_width);
        let y = self.y.saturating_sub(pad).min(bound_height);
        BoundingBox {
            x,
            y,
            width: self
                .width
                .saturating_add(pad.saturating_mul(2))
                .min(bound_width - x),
            height: self
                .height
                .saturating_add(pad.saturating_mul(2))
                .min(bound_height - y),
        }
    }

    pub fn translate(&self, dx: u32, dy: u32) -> BoundingBox {
        BoundingBox {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Outer boundary of one connected foreground region
#[derive(Debug, Clone)]
pub struct InkContour {
    pub points: Vec<Point<i32>>,
    pub area: f64,
    pub bounds: BoundingBox,
}

/// Outer borders of the top-level foreground regions of `mask` (non-zero is foreground).
/// Regions nested inside holes are skipped.
pub fn external_contours(mask: &GrayImage) -> Vec<InkContour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let bounds = BoundingBox::of_points(&c.points)?;
            Some(InkContour {
                area: polygon_area(&c.points),
                points: c.points,
                bounds,
            })
        })
        .collect()
}

/// Shoelace area of the closed polygon through `points`
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice_area.abs() as f64 / 2.0
}

/// Contour with the greatest area; the earliest one wins a tie
pub fn largest(contours: &[InkContour]) -> Option<&InkContour> {
    contours
        .iter()
        .reduce(|best, c| if c.area > best.area { c } else { best })
}

pub fn union_bounds<'a, I>(contours: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a InkContour>,
{
    contours
        .into_iter()
        .map(|c| c.bounds)
        .reduce(|acc, b| acc.union(&b))
}
