use smallvec::SmallVec;

#[derive(Clone, Copy, Debug)]
struct InputRow<'a> {
    data: &'a [f32],
    stride: usize,
}

/// Row-streaming context: the current output pixel plus aligned input rows.
///
/// All positions move together through [`PixelCursor::advance`]; the cursor never yields a pixel
/// at or past the row end.
#[derive(Debug)]
pub struct PixelCursor<'a> {
    out: &'a mut [f32],
    out_stride: usize,
    ins: SmallVec<[InputRow<'a>; 4]>,
    pos: usize,
    row_len: usize,
    x0: i32,
    y: i32,
}

impl<'a> PixelCursor<'a> {
    /// Cursor over an output row starting at pixel `(x0, y)`, `out_stride` floats per pixel.
    pub fn new(out: &'a mut [f32], out_stride: usize, x0: i32, y: i32) -> Self {
        debug_assert!(out_stride > 0 && out.len().is_multiple_of(out_stride));
        let row_len = out.len() / out_stride.max(1);
        Self {
            out,
            out_stride,
            ins: SmallVec::new(),
            pos: 0,
            row_len,
            x0,
            y,
        }
    }

    /// Attach the next input row (`stride` floats per pixel), in socket order.
    pub fn with_input(mut self, data: &'a [f32], stride: usize) -> Self {
        debug_assert!(stride > 0 && data.len() >= self.row_len * stride);
        self.ins.push(InputRow { data, stride });
        self
    }

    /// Return `true` once every pixel of the row has been visited.
    #[inline]
    pub fn at_row_end(&self) -> bool {
        self.pos >= self.row_len
    }

    /// Current output pixel.
    #[inline]
    pub fn out(&mut self) -> &mut [f32] {
        let at = self.pos * self.out_stride;
        &mut self.out[at..at + self.out_stride]
    }

    /// Current pixel of input `index`.
    #[inline]
    pub fn input(&self, index: usize) -> &'a [f32] {
        let row = self.ins[index];
        let at = self.pos * row.stride;
        &row.data[at..at + row.stride]
    }

    /// Move the output and every input one pixel forward.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Number of attached input rows.
    pub fn num_inputs(&self) -> usize {
        self.ins.len()
    }

    /// Pixels in the row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Image x coordinate of the current pixel.
    pub fn x(&self) -> i32 {
        self.x0 + self.pos as i32
    }

    /// Image y coordinate of the row.
    pub fn y(&self) -> i32 {
        self.y
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operation/cursor.rs"]
mod tests;
