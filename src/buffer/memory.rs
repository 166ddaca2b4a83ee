use crate::foundation::core::{DataType, Rect, expand_elem};
use crate::foundation::error::{LumatileError, LumatileResult};

/// Float pixel storage for a rectangular region.
///
/// Elements are `num_channels` floats, tightly packed, row-major starting at `rect.ymin`.
/// A single-element buffer stores exactly one element that stands for every pixel of its rect;
/// [`MemoryBuffer::inflate`] expands it into full storage.
///
/// All element addressing goes through bounds-aware accessors: checked (`elem`, `row`) or
/// clamped to the nearest edge pixel (`elem_clamped`).
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryBuffer {
    rect: Rect,
    num_channels: usize,
    data: Vec<f32>,
    single_elem: bool,
}

impl MemoryBuffer {
    /// Zero-filled buffer covering `rect`.
    pub fn new(num_channels: usize, rect: Rect) -> LumatileResult<Self> {
        validate_shape(num_channels, rect)?;
        Ok(Self {
            rect,
            num_channels,
            data: vec![0.0; rect.area() * num_channels],
            single_elem: false,
        })
    }

    /// Zero-filled buffer sized for a socket data type.
    pub fn for_data_type(data_type: DataType, rect: Rect) -> LumatileResult<Self> {
        Self::new(data_type.channels(), rect)
    }

    /// Wrap existing storage. `data.len()` must equal `rect.area() * num_channels`.
    pub fn from_data(num_channels: usize, rect: Rect, data: Vec<f32>) -> LumatileResult<Self> {
        validate_shape(num_channels, rect)?;
        let expected = rect.area() * num_channels;
        if data.len() != expected {
            return Err(LumatileError::validation(format!(
                "MemoryBuffer data length {} does not match {}x{}x{} = {expected}",
                data.len(),
                rect.width(),
                rect.height(),
                num_channels
            )));
        }
        Ok(Self {
            rect,
            num_channels,
            data,
            single_elem: false,
        })
    }

    /// Buffer whose single element stands for every pixel of `rect`.
    pub fn single_elem(num_channels: usize, rect: Rect, elem: &[f32]) -> LumatileResult<Self> {
        validate_shape(num_channels, rect)?;
        if elem.len() != num_channels {
            return Err(LumatileError::validation(format!(
                "single element has {} channels, buffer expects {num_channels}",
                elem.len()
            )));
        }
        Ok(Self {
            rect,
            num_channels,
            data: elem.to_vec(),
            single_elem: true,
        })
    }

    /// Region covered by this buffer.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Floats per element.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Return `true` when one stored element stands for the whole rect.
    pub fn is_single_elem(&self) -> bool {
        self.single_elem
    }

    /// Raw backing storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn elem_offset(&self, x: i32, y: i32) -> usize {
        if self.single_elem {
            return 0;
        }
        let dx = (x - self.rect.xmin) as usize;
        let dy = (y - self.rect.ymin) as usize;
        (dy * self.rect.width() as usize + dx) * self.num_channels
    }

    /// Element at `(x, y)`, `None` outside the rect.
    pub fn elem(&self, x: i32, y: i32) -> Option<&[f32]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let at = self.elem_offset(x, y);
        Some(&self.data[at..at + self.num_channels])
    }

    /// Mutable element at `(x, y)`, `None` outside the rect.
    ///
    /// On a single-element buffer every coordinate aliases the same element.
    pub fn elem_mut(&mut self, x: i32, y: i32) -> Option<&mut [f32]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let at = self.elem_offset(x, y);
        let n = self.num_channels;
        Some(&mut self.data[at..at + n])
    }

    /// Element at `(x, y)` with coordinates clamped into the rect (edge pixels repeat).
    #[inline]
    pub fn elem_clamped(&self, x: i32, y: i32) -> &[f32] {
        let x = x.clamp(self.rect.xmin, self.rect.xmax - 1);
        let y = y.clamp(self.rect.ymin, self.rect.ymax - 1);
        let at = self.elem_offset(x, y);
        &self.data[at..at + self.num_channels]
    }

    /// Element at `(x, y)` clamped and widened to RGBA.
    #[inline]
    pub fn pixel_clamped(&self, x: i32, y: i32) -> [f32; 4] {
        expand_elem(self.elem_clamped(x, y))
    }

    /// Full row `y`, `None` outside the rect or for single-element buffers.
    pub fn row(&self, y: i32) -> Option<&[f32]> {
        if self.single_elem || y < self.rect.ymin || y >= self.rect.ymax {
            return None;
        }
        let stride = self.rect.width() as usize * self.num_channels;
        let at = (y - self.rect.ymin) as usize * stride;
        Some(&self.data[at..at + stride])
    }

    /// Mutable row `y`, `None` outside the rect or for single-element buffers.
    pub fn row_mut(&mut self, y: i32) -> Option<&mut [f32]> {
        if self.single_elem || y < self.rect.ymin || y >= self.rect.ymax {
            return None;
        }
        let stride = self.rect.width() as usize * self.num_channels;
        let at = (y - self.rect.ymin) as usize * stride;
        Some(&mut self.data[at..at + stride])
    }

    /// Full-storage copy. Single-element buffers repeat their element over the rect.
    pub fn inflate(&self) -> MemoryBuffer {
        if !self.single_elem {
            return self.clone();
        }
        MemoryBuffer {
            rect: self.rect,
            num_channels: self.num_channels,
            data: self.data.repeat(self.rect.area()),
            single_elem: false,
        }
    }

    /// New buffer covering `rect` with `num_channels` per element, filled from this buffer with
    /// edge clamping. Channels are widened through RGBA and truncated to the target count.
    pub fn copy_rect_clamped(&self, rect: Rect, num_channels: usize) -> LumatileResult<Self> {
        let mut out = MemoryBuffer::new(num_channels, rect)?;
        let width = rect.width() as usize;
        for y in rect.ymin..rect.ymax {
            let at = (y - rect.ymin) as usize * width * num_channels;
            let row = &mut out.data[at..at + width * num_channels];
            for (i, dst) in row.chunks_exact_mut(num_channels).enumerate() {
                let x = rect.xmin + i as i32;
                let src = self.elem_clamped(x, y);
                if src.len() == num_channels {
                    dst.copy_from_slice(src);
                } else {
                    dst.copy_from_slice(&expand_elem(src)[..num_channels]);
                }
            }
        }
        Ok(out)
    }

    /// Copy the overlapping region of `src` into this buffer.
    ///
    /// Both buffers must have the same channel count; returns the number of pixels written.
    pub fn copy_from(&mut self, src: &MemoryBuffer) -> LumatileResult<usize> {
        if src.num_channels != self.num_channels {
            return Err(LumatileError::validation(format!(
                "copy_from expects matching channel counts ({} vs {})",
                src.num_channels, self.num_channels
            )));
        }
        if self.single_elem {
            return Err(LumatileError::validation(
                "copy_from cannot write into a single-element buffer",
            ));
        }
        let Some(overlap) = self.rect.intersect(src.rect) else {
            return Ok(0);
        };
        let n = self.num_channels;
        let span = overlap.width() as usize * n;
        for y in overlap.ymin..overlap.ymax {
            let dst_at = self.elem_offset(overlap.xmin, y);
            if src.single_elem {
                for dst in self.data[dst_at..dst_at + span].chunks_exact_mut(n) {
                    dst.copy_from_slice(&src.data);
                }
            } else {
                let src_at = src.elem_offset(overlap.xmin, y);
                self.data[dst_at..dst_at + span].copy_from_slice(&src.data[src_at..src_at + span]);
            }
        }
        Ok(overlap.area())
    }

    /// Build a 4-channel buffer at the origin from an `image` float buffer.
    pub fn from_rgba32f(img: &image::Rgba32FImage) -> LumatileResult<Self> {
        let rect = Rect::from_size(img.width(), img.height());
        Self::from_data(4, rect, img.as_raw().clone())
    }

    /// Convert to an `image` float buffer, widening every element to RGBA.
    pub fn to_rgba32f(&self) -> LumatileResult<image::Rgba32FImage> {
        let rect = self.rect;
        let mut raw = Vec::with_capacity(rect.area() * 4);
        for y in rect.ymin..rect.ymax {
            for x in rect.xmin..rect.xmax {
                raw.extend_from_slice(&self.pixel_clamped(x, y));
            }
        }
        image::Rgba32FImage::from_raw(rect.width(), rect.height(), raw)
            .ok_or_else(|| LumatileError::validation("image buffer size mismatch"))
    }
}

fn validate_shape(num_channels: usize, rect: Rect) -> LumatileResult<()> {
    if DataType::from_channels(num_channels).is_none() {
        return Err(LumatileError::validation(format!(
            "MemoryBuffer channel count must be 1, 3 or 4 (got {num_channels})"
        )));
    }
    if rect.is_empty() {
        return Err(LumatileError::validation(
            "MemoryBuffer rect must cover at least one pixel",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/memory.rs"]
mod tests;
