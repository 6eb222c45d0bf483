use crate::{OptionError, Point, RGBA, Rect, Scalar, EPSILON};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Anything that can produce a color at any point of the plane
pub trait Paint {
    fn at(&self, point: Point) -> RGBA;
}

impl Paint for RGBA {
    fn at(&self, _: Point) -> RGBA {
        *self
    }
}

impl<P: Paint + ?Sized> Paint for &P {
    fn at(&self, point: Point) -> RGBA {
        (**self).at(point)
    }
}

/// Axis along which gradient stops are laid out over a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradientDirection {
    /// Left to right
    #[default]
    Horizontal,
    /// Top to bottom
    Vertical,
    /// Top-left to bottom-right
    ForwardDiagonal,
    /// Bottom-left to top-right
    BackwardDiagonal,
}

impl GradientDirection {
    /// Start and end points of the gradient axis over the rectangle
    pub fn axis(self, rect: Rect) -> (Point, Point) {
        let Point([x0, y0]) = rect.min();
        let Point([x1, y1]) = rect.max();
        match self {
            GradientDirection::Horizontal => (Point::new(x0, y0), Point::new(x1, y0)),
            GradientDirection::Vertical => (Point::new(x0, y0), Point::new(x0, y1)),
            GradientDirection::ForwardDiagonal => (Point::new(x0, y0), Point::new(x1, y1)),
            GradientDirection::BackwardDiagonal => (Point::new(x0, y1), Point::new(x1, y0)),
        }
    }
}

impl FromStr for GradientDirection {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Self::Horizontal),
            "v" | "vertical" => Ok(Self::Vertical),
            "f" | "forward" | "fd" | "forwarddiagonal" => Ok(Self::ForwardDiagonal),
            "b" | "backward" | "bd" | "backwarddiagonal" => Ok(Self::BackwardDiagonal),
            _ => Err(OptionError::new(
                value,
                "h/horizontal, v/vertical, f/forward or b/backward",
            )),
        }
    }
}

impl fmt::Display for GradientDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Specifies color at a particular parmeter offset of the gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradStop {
    pub position: Scalar,
    pub color: RGBA,
}

impl GradStop {
    pub fn new(position: Scalar, color: RGBA) -> Self {
        Self { position, color }
    }
}

/// List of all `GradStop` in the gradient
#[derive(Debug, Clone)]
pub struct GradStops {
    stops: Vec<GradStop>,
}

impl GradStops {
    /// Evenly spaced stops, stop `i` of `n` is placed at `i / (n - 1)`
    ///
    /// No colors results in a single transparent stop.
    pub fn evenly_spaced(colors: &[RGBA]) -> Self {
        if colors.is_empty() {
            return Self {
                stops: vec![GradStop::new(0.0, RGBA::TRANSPARENT)],
            };
        }
        let last = colors.len().saturating_sub(1).max(1) as Scalar;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(index, color)| GradStop::new(index as Scalar / last, *color))
            .collect();
        Self { stops }
    }

    pub fn is_solid(&self) -> bool {
        self.stops.len() == 1
    }

    /// Color at parameter `t`, values outside of stops range use edge colors
    pub fn at(&self, t: Scalar) -> RGBA {
        let index = self.stops.binary_search_by(|stop| {
            if stop.position < t {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        let index = match index {
            Ok(index) => index,
            Err(index) => index,
        };
        let size = self.stops.len();
        if index == 0 {
            self.stops[index].color
        } else if index == size {
            self.stops[size - 1].color
        } else {
            let p0 = &self.stops[index - 1];
            let p1 = &self.stops[index];
            let ratio = (t - p0.position) / (p1.position - p0.position);
            p0.color.lerp(p1.color, ratio)
        }
    }

    /// Replace alpha of every stop
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        for stop in self.stops.iter_mut() {
            stop.color = stop.color.with_alpha(alpha);
        }
        self
    }
}

impl From<&[RGBA]> for GradStops {
    fn from(colors: &[RGBA]) -> Self {
        Self::evenly_spaced(colors)
    }
}

/// Linear Gradient
#[derive(Debug, Clone)]
pub struct GradLinear {
    stops: GradStops,
    start: Point,
    dir: Point,
    // precomputed value equal to `|end - start| ^ 2`
    norm: Scalar,
}

impl GradLinear {
    pub fn new(
        stops: impl Into<GradStops>,
        start: impl Into<Point>,
        end: impl Into<Point>,
    ) -> Self {
        let start = start.into();
        let dir = end.into() - start;
        Self {
            stops: stops.into(),
            start,
            dir,
            norm: dir.dot(dir),
        }
    }

    /// Gradient spanning the rectangle along the given direction
    pub fn fit(stops: impl Into<GradStops>, rect: Rect, direction: GradientDirection) -> Self {
        let (start, end) = direction.axis(rect);
        Self::new(stops, start, end)
    }

    /// Projection of the point on the gradient axis clamped to [0, 1]
    pub fn offset(&self, point: Point) -> Scalar {
        if self.norm < EPSILON {
            return 0.0;
        }
        // t = (point - start).dot(end - start) / |end - start| ^ 2
        let t = (point - self.start).dot(self.dir) / self.norm;
        t.clamp(0.0, 1.0)
    }
}

impl Paint for GradLinear {
    fn at(&self, point: Point) -> RGBA {
        if self.stops.is_solid() {
            return self.stops.at(0.0);
        }
        self.stops.at(self.offset(point))
    }
}
