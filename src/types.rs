use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Vertical origin convention of a unit-space coordinate.
///
/// Face-landmark and object detectors do not agree on where `y = 0` lives, so
/// every normalized value carries its origin in the type and the conversion to
/// pixel space picks the right flip.
pub trait Origin: Copy + Clone + Default + fmt::Debug + PartialEq + 'static {
    const NAME: &'static str;

    /// Distance of a unit-space `y` from the top edge.
    fn y_from_top(y: f32) -> f32;

    /// Top edge (distance from the top) of a unit-space span `[min_y, max_y]`.
    fn top_edge(min_y: f32, max_y: f32) -> f32;
}

/// `y = 0` at the bottom of the image, growing upwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BottomLeft;

/// `y = 0` at the top of the image, growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TopLeft;

impl Origin for BottomLeft {
    const NAME: &'static str = "bottom-left";

    fn y_from_top(y: f32) -> f32 {
        1.0 - y
    }

    fn top_edge(_min_y: f32, max_y: f32) -> f32 {
        1.0 - max_y
    }
}

impl Origin for TopLeft {
    const NAME: &'static str = "top-left";

    fn y_from_top(y: f32) -> f32 {
        y
    }

    fn top_edge(min_y: f32, _max_y: f32) -> f32 {
        min_y
    }
}

/// A point in unit space (0.0-1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NormalizedPoint<O: Origin> {
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    _origin: PhantomData<O>,
}

impl<O: Origin> NormalizedPoint<O> {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, _origin: PhantomData }
    }
}

/// A rectangle in unit space; `(x, y)` is the corner nearest the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NormalizedRect<O: Origin> {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip)]
    _origin: PhantomData<O>,
}

impl<O: Origin> NormalizedRect<O> {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height, _origin: PhantomData }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Width and height of an image in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A point in image space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// A rectangle in image space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PupilSide {
    Left,
    Right,
}

impl fmt::Display for PupilSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            PupilSide::Left => "left",
            PupilSide::Right => "right",
        })
    }
}

/// Both pupil centers of one face, in image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PupilPair {
    pub left: PixelPoint,
    pub right: PixelPoint,
}

impl PupilPair {
    pub fn get(&self, side: PupilSide) -> PixelPoint {
        match side {
            PupilSide::Left => self.left,
            PupilSide::Right => self.right,
        }
    }
}

/// Vertical gap between a pupil and the bottom of the frame.
///
/// The distance is in image points. It is not calibrated to any physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub side: PupilSide,
    pub distance: f32,
}
