use crate::buffer::memory::MemoryBuffer;
use crate::foundation::core::PixelSampler;

/// Upper bound on taps per axis for footprint-filtered reads.
const MAX_FILTER_TAPS: usize = 8;

impl MemoryBuffer {
    /// Read an RGBA pixel at fractional coordinates using `sampler`.
    ///
    /// Coordinates outside the buffer clamp to the edge.
    pub fn read(&self, output: &mut [f32; 4], x: f32, y: f32, sampler: PixelSampler) {
        match sampler {
            PixelSampler::Nearest => self.read_nearest(output, x, y),
            PixelSampler::Bilinear => self.read_bilinear(output, x, y),
            PixelSampler::Bicubic => self.read_bicubic(output, x, y),
        }
    }

    /// Element containing `(x, y)`.
    pub fn read_nearest(&self, output: &mut [f32; 4], x: f32, y: f32) {
        *output = self.pixel_clamped(x.floor() as i32, y.floor() as i32);
    }

    /// Linear interpolation between the four surrounding elements.
    pub fn read_bilinear(&self, output: &mut [f32; 4], x: f32, y: f32) {
        if self.is_single_elem() {
            *output = self.pixel_clamped(0, 0);
            return;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (xi, yi) = (x0 as i32, y0 as i32);

        let p00 = self.pixel_clamped(xi, yi);
        let p10 = self.pixel_clamped(xi.saturating_add(1), yi);
        let p01 = self.pixel_clamped(xi, yi.saturating_add(1));
        let p11 = self.pixel_clamped(xi.saturating_add(1), yi.saturating_add(1));

        for c in 0..4 {
            let top = lerp(p00[c], p10[c], fx);
            let bottom = lerp(p01[c], p11[c], fx);
            output[c] = lerp(top, bottom, fy);
        }
    }

    /// Catmull-Rom interpolation over the surrounding 4x4 elements.
    pub fn read_bicubic(&self, output: &mut [f32; 4], x: f32, y: f32) {
        if self.is_single_elem() {
            *output = self.pixel_clamped(0, 0);
            return;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let wx = catmull_rom_weights(x - x0);
        let wy = catmull_rom_weights(y - y0);
        let (xi, yi) = (x0 as i32, y0 as i32);

        let mut acc = [0.0f32; 4];
        for (j, wyj) in wy.iter().enumerate() {
            if *wyj == 0.0 {
                continue;
            }
            let sy = yi.saturating_add(j as i32 - 1);
            let mut row = [0.0f32; 4];
            for (i, wxi) in wx.iter().enumerate() {
                if *wxi == 0.0 {
                    continue;
                }
                let px = self.pixel_clamped(xi.saturating_add(i as i32 - 1), sy);
                for c in 0..4 {
                    row[c] += px[c] * wxi;
                }
            }
            for c in 0..4 {
                acc[c] += row[c] * wyj;
            }
        }
        *output = acc;
    }

    /// Average of bilinear taps spread over the footprint spanned by the screen-space
    /// derivatives `dx` and `dy` (each an `[x, y]` step in buffer space).
    ///
    /// Footprints of at most one pixel reduce to a single bilinear read.
    pub fn read_filtered(&self, output: &mut [f32; 4], x: f32, y: f32, dx: [f32; 2], dy: [f32; 2]) {
        let extent = dx[0].hypot(dx[1]).max(dy[0].hypot(dy[1]));
        if !extent.is_finite() || extent <= 1.0 || self.is_single_elem() {
            self.read_bilinear(output, x, y);
            return;
        }
        let taps = (extent.ceil() as usize).clamp(1, MAX_FILTER_TAPS);
        let inv = 1.0 / taps as f32;

        let mut acc = [0.0f32; 4];
        let mut px = [0.0f32; 4];
        for j in 0..taps {
            let t = (j as f32 + 0.5) * inv - 0.5;
            for i in 0..taps {
                let s = (i as f32 + 0.5) * inv - 0.5;
                let u = x + s * dx[0] + t * dy[0];
                let v = y + s * dx[1] + t * dy[1];
                self.read_bilinear(&mut px, u, v);
                for c in 0..4 {
                    acc[c] += px[c];
                }
            }
        }
        let norm = inv * inv;
        for c in 0..4 {
            output[c] = acc[c] * norm;
        }
    }
}

/// Zero-weight taps are skipped so a non-finite neighbor cannot leak into an exact read.
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t == 0.0 { a } else { a * (1.0 - t) + b * t }
}

fn catmull_rom_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/sample.rs"]
mod tests;
