use std::{
    fmt,
    ops::{Add, Div, Mul, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        write!(f, "{},{}", x, y)
    }
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Dot product between two vectors
    #[inline]
    pub fn dot(self, other: Self) -> Scalar {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        x0 * x1 + y0 * y1
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

/// Size of an image or a rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow by `pad` on every side
    pub fn padded(self, pad: Size) -> Self {
        Self {
            width: self.width + 2 * pad.width,
            height: self.height + 2 * pad.height,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Integer rectangle, offset may be negative but size never is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle located at the origin
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Top-left corner
    pub fn min(&self) -> Point {
        Point::new(self.x as Scalar, self.y as Scalar)
    }

    /// Bottom-right corner
    pub fn max(&self) -> Point {
        Point::new(
            (self.x + self.width as i64) as Scalar,
            (self.y + self.height as i64) as Scalar,
        )
    }

    /// Intersection with the image area of the given size, as pixel ranges
    /// `(cols, rows)`. Empty ranges are returned when there is no overlap.
    pub fn clip(&self, size: Size) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let clip = |start: i64, len: usize, limit: usize| {
            let low = start.clamp(0, limit as i64) as usize;
            let high = (start + len as i64).clamp(0, limit as i64) as usize;
            low..high.max(low)
        };
        (
            clip(self.x, self.width, size.width),
            clip(self.y, self.height, size.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clip() {
        let size = Size::new(10, 5);
        assert_eq!(Rect::new(2, 1, 3, 3).clip(size), (2..5, 1..4));
        assert_eq!(Rect::new(-4, -2, 6, 4).clip(size), (0..2, 0..2));
        assert_eq!(Rect::new(8, 4, 10, 10).clip(size), (8..10, 4..5));
        let (cols, rows) = Rect::new(20, 0, 3, 3).clip(size);
        assert!(cols.is_empty());
        assert_eq!(rows, 0..3);
    }

    #[test]
    fn test_size() {
        let size = Size::new(30, 20).padded(Size::new(5, 1));
        assert_eq!(size, Size::new(40, 22));
        assert!(Size::new(0, 10).is_empty());
        assert_eq!(Rect::from_size(size).max(), Point::new(40.0, 22.0));
    }
}
