use crate::foundation::error::{LumatileError, LumatileResult};

/// Integer pixel rectangle, half-open on the max edges: `[xmin, xmax) x [ymin, ymax)`.
///
/// Used both for tile requests and for the region a [`crate::MemoryBuffer`] covers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    /// Inclusive minimum x.
    pub xmin: i32,
    /// Exclusive maximum x.
    pub xmax: i32,
    /// Inclusive minimum y.
    pub ymin: i32,
    /// Exclusive maximum y.
    pub ymax: i32,
}

impl Rect {
    /// Create a validated rect with `xmin <= xmax` and `ymin <= ymax`.
    pub fn new(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> LumatileResult<Self> {
        if xmin > xmax || ymin > ymax {
            return Err(LumatileError::validation(format!(
                "Rect bounds must satisfy xmin <= xmax and ymin <= ymax \
                 (got x {xmin}..{xmax}, y {ymin}..{ymax})"
            )));
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Rect anchored at the origin covering `width x height` pixels.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            xmin: 0,
            xmax: i32::try_from(width).unwrap_or(i32::MAX),
            ymin: 0,
            ymax: i32::try_from(height).unwrap_or(i32::MAX),
        }
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.xmax.saturating_sub(self.xmin).max(0) as u32
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.ymax.saturating_sub(self.ymin).max(0) as u32
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width() as usize).saturating_mul(self.height() as usize)
    }

    /// Return `true` when the rect covers no pixels.
    pub fn is_empty(self) -> bool {
        self.xmin >= self.xmax || self.ymin >= self.ymax
    }

    /// Return `true` when pixel `(x, y)` is inside the rect.
    pub fn contains(self, x: i32, y: i32) -> bool {
        self.xmin <= x && x < self.xmax && self.ymin <= y && y < self.ymax
    }

    /// Overlapping region of two rects, `None` when they do not overlap.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let r = Rect {
            xmin: self.xmin.max(other.xmin),
            xmax: self.xmax.min(other.xmax),
            ymin: self.ymin.max(other.ymin),
            ymax: self.ymax.min(other.ymax),
        };
        if r.is_empty() { None } else { Some(r) }
    }
}

/// Output size of an operation in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated, non-empty resolution.
    pub fn new(width: u32, height: u32) -> LumatileResult<Self> {
        if width == 0 || height == 0 {
            return Err(LumatileError::validation(
                "Resolution width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Rect anchored at the origin covering this resolution.
    pub fn to_rect(self) -> Rect {
        Rect::from_size(self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Kind of data carried by a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Single channel, broadcast to all four channels when read as a pixel.
    Value,
    /// Three channels; alpha is unused and reads as `0.0`.
    Vector,
    /// Four channels, RGBA.
    Color,
}

impl DataType {
    /// Number of float channels stored per element.
    pub fn channels(self) -> usize {
        match self {
            DataType::Value => 1,
            DataType::Vector => 3,
            DataType::Color => 4,
        }
    }

    /// Data type stored with `channels` floats per element, if any.
    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(DataType::Value),
            3 => Some(DataType::Vector),
            4 => Some(DataType::Color),
            _ => None,
        }
    }
}

/// Interpolation policy for reads at fractional coordinates.
///
/// Pixel centers sit on integer coordinates, so every sampler returns the stored element exactly
/// when `x` and `y` are whole numbers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PixelSampler {
    /// Closest element (floor of the coordinate).
    Nearest,
    /// 2x2 linear interpolation.
    #[default]
    Bilinear,
    /// 4x4 Catmull-Rom interpolation.
    Bicubic,
}

/// Widen one stored element into an RGBA pixel following the [`DataType`] read rules.
pub(crate) fn expand_elem(elem: &[f32]) -> [f32; 4] {
    match *elem {
        [v] => [v, v, v, v],
        [x, y, z] => [x, y, z, 0.0],
        [r, g, b, a] => [r, g, b, a],
        _ => [0.0; 4],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
