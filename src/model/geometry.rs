//! pixel geometry for the workspace plane

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub fn min_x(&self) -> f64 { self.origin.x }
    pub fn min_y(&self) -> f64 { self.origin.y }
    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }
    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min_x()..=self.max_x()).contains(&point.x)
            && (self.min_y()..=self.max_y()).contains(&point.y)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let min_x = f64::max(self.min_x(), other.min_x());
        let max_x = f64::min(self.max_x(), other.max_x());
        let min_y = f64::max(self.min_y(), other.min_y());
        let max_y = f64::min(self.max_y(), other.max_y());
        Rect {
            origin: Point::new(min_x, min_y),
            size: Size::new(f64::max(max_x - min_x, 0.), f64::max(max_y - min_y, 0.)),
        }
    }

    pub fn area(&self) -> f64 { self.size.width * self.size.height }

    /// Shrink the rect by per-edge insets. Degenerate insets collapse to an
    /// empty rect rather than inverting.
    pub fn inset(&self, top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Rect {
            origin: Point::new(self.origin.x + left, self.origin.y + top),
            size: Size::new(
                f64::max(self.size.width - left - right, 0.),
                f64::max(self.size.height - top - bottom, 0.),
            ),
        }
    }
}

/// The workspace pixel area as reported by the host, plus the vertical offset
/// that converts raw pointer coordinates into workspace-relative ones. Queried
/// per operation, never cached.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub frame: Rect,
    pub pointer_offset_y: f64,
}

impl Viewport {
    pub fn new(frame: Rect, pointer_offset_y: f64) -> Self {
        Self { frame, pointer_offset_y }
    }

    pub fn workspace_point(&self, x: f64, y: f64) -> Point {
        Point::new(x, y - self.pointer_offset_y)
    }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool { (self - other).abs() < how_much }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for Size {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.width.is_within(how_much, other.width) && self.height.is_within(how_much, other.height)
    }
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin) && self.size.is_within(how_much, other.size)
    }
}

pub trait SameAs: IsWithin + Sized {
    fn same_as(&self, other: Self) -> bool { self.is_within(0.1, other) }
}

impl SameAs for Point {}
impl SameAs for Size {}
impl SameAs for Rect {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_of_edges() {
        let rect = Rect::new(Point::new(10.0, 10.0), Size::new(100.0, 50.0));
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(110.0, 60.0)));
        assert!(!rect.contains(Point::new(110.1, 60.0)));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::new(Point::new(20.0, 20.0), Size::new(10.0, 10.0));
        assert_eq!(a.intersection(&b).area(), 0.0);
    }

    #[test]
    fn inset_never_inverts() {
        let rect = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let shrunk = rect.inset(8.0, 8.0, 8.0, 8.0);
        assert_eq!(shrunk.size, Size::new(0.0, 0.0));
    }

    #[test]
    fn viewport_converts_pointer_coordinates() {
        let viewport = Viewport::new(
            Rect::new(Point::new(0.0, 0.0), Size::new(1920.0, 1048.0)),
            32.0,
        );
        let p = viewport.workspace_point(400.0, 232.0);
        assert!(p.same_as(Point::new(400.0, 200.0)));
    }
}
