use crate::foundation::color::{linear_to_srgb, srgb_to_linear};
use crate::foundation::core::{DataType, PixelSampler};
use crate::foundation::error::{LumatileError, LumatileResult};
use crate::graph::operation_graph::{OperationGraph, OperationId};
use crate::operation::base::{NodeOperation, NodeOperationBase, RowOperation, resolved_reader};
use crate::operation::cursor::PixelCursor;

/// Exponent used in place of `1 / gamma` when gamma is zero.
const GAMMA_INV_AT_ZERO: f32 = 1_000_000.0;

/// Smallest gamma accepted by [`LiftGammaGain::validate`].
pub const MIN_GAMMA: f32 = 0.1;
/// Largest gain accepted by [`LiftGammaGain::validate`].
pub const MAX_GAIN: f32 = 16.0;
/// Largest lift offset accepted by [`LiftGammaGain::validate`].
pub const MAX_LIFT: f32 = 1.0;

/// Lift/gamma/gain for one channel of a linear-light input.
///
/// The lift and gain are applied in sRGB display space and the result is decoded before the
/// gamma exponent. Doing the same math purely in linear light over-saturates shadows, so the
/// encode/decode round trip stays.
#[inline]
pub fn colorbalance_lgg(input: f32, lift: f32, gamma_inv: f32, gain: f32) -> f32 {
    let x = ((linear_to_srgb(input) - 1.0) * lift + 1.0) * gain;
    // A negative base under a fractional exponent is NaN.
    let x = x.max(0.0);
    srgb_to_linear(x).powf(gamma_inv)
}

/// Per-channel coefficients consumed by [`colorbalance_lgg`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LggCoefficients {
    /// Multiplier on `(encoded - 1)`; `1.0` is neutral.
    pub lift: [f32; 3],
    /// Exponent applied after decoding; `1.0` is neutral.
    pub gamma_inv: [f32; 3],
    /// Display-space gain; `1.0` is neutral.
    pub gain: [f32; 3],
}

impl Default for LggCoefficients {
    fn default() -> Self {
        Self {
            lift: [1.0; 3],
            gamma_inv: [1.0; 3],
            gain: [1.0; 3],
        }
    }
}

/// User-facing grading parameters.
///
/// `lift` is an offset that raises (positive) or crushes (negative) the shadows; `0.0` is
/// neutral. `gamma` reshapes midtones and `gain` scales highlights; `1.0` is neutral for both.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LiftGammaGain {
    /// Shadow offset per RGB channel.
    pub lift: [f32; 3],
    /// Midtone gamma per RGB channel, `> 0`.
    pub gamma: [f32; 3],
    /// Highlight gain per RGB channel.
    pub gain: [f32; 3],
}

impl Default for LiftGammaGain {
    fn default() -> Self {
        Self {
            lift: [0.0; 3],
            gamma: [1.0; 3],
            gain: [1.0; 3],
        }
    }
}

impl LiftGammaGain {
    /// Reject parameters that can drive [`colorbalance_lgg`] out of the finite range.
    ///
    /// With `lift <= 1` the display-space value never exceeds `gain`, so `gain <= 16` and
    /// `gamma >= 0.1` bound every output for inputs in `[0, 1]` well below `f32::MAX`.
    pub fn validate(&self) -> LumatileResult<()> {
        let mut all = self.lift.iter().chain(&self.gamma).chain(&self.gain);
        if all.any(|v| !v.is_finite()) {
            return Err(LumatileError::validation(
                "lift/gamma/gain values must be finite",
            ));
        }
        if self.lift.iter().any(|&l| l > MAX_LIFT) {
            return Err(LumatileError::validation(format!("lift must be <= {MAX_LIFT}")));
        }
        if self.gamma.iter().any(|&g| g < MIN_GAMMA) {
            return Err(LumatileError::validation(format!("gamma must be >= {MIN_GAMMA}")));
        }
        if self.gain.iter().any(|&g| !(0.0..=MAX_GAIN).contains(&g)) {
            return Err(LumatileError::validation(format!("gain must be within [0, {MAX_GAIN}]")));
        }
        Ok(())
    }

    /// Coefficients for [`colorbalance_lgg`]: `lift = 1 - offset`, `gamma_inv = 1 / gamma`.
    pub fn coefficients(&self) -> LggCoefficients {
        LggCoefficients {
            lift: self.lift.map(|l| 1.0 - l),
            gamma_inv: self.gamma.map(|g| {
                if g != 0.0 {
                    1.0 / g
                } else {
                    GAMMA_INV_AT_ZERO
                }
            }),
            gain: self.gain,
        }
    }
}

/// Lift/gamma/gain color balance blended with the original color by a factor.
///
/// Socket 0 is the Value factor, socket 1 the Color input; the output resolution follows the
/// color input. The factor is clamped to at most `1.0` (there is no lower clamp) and alpha
/// passes through unchanged. The sampled and row-streaming paths share
/// [`ColorBalanceLggOperation::balance_pixel`] and produce identical results.
#[derive(Clone, Debug)]
pub struct ColorBalanceLggOperation {
    base: NodeOperationBase,
    coefficients: LggCoefficients,
    input_value: Option<OperationId>,
    input_color: Option<OperationId>,
}

impl ColorBalanceLggOperation {
    /// Operation applying raw coefficients.
    pub fn new(coefficients: LggCoefficients) -> Self {
        let mut base = NodeOperationBase::new();
        base.add_input_socket(DataType::Value);
        base.add_input_socket(DataType::Color);
        base.add_output_socket(DataType::Color);
        base.set_resolution_input_socket_index(1);
        Self {
            base,
            coefficients,
            input_value: None,
            input_color: None,
        }
    }

    /// Operation from validated user-facing parameters.
    pub fn from_params(params: &LiftGammaGain) -> LumatileResult<Self> {
        params.validate()?;
        Ok(Self::new(params.coefficients()))
    }

    /// Coefficients in use.
    pub fn coefficients(&self) -> &LggCoefficients {
        &self.coefficients
    }

    /// Blend the balanced color with `color` by `factor`.
    #[inline]
    pub fn balance_pixel(&self, factor: f32, color: [f32; 4]) -> [f32; 4] {
        let LggCoefficients {
            lift,
            gamma_inv,
            gain,
        } = &self.coefficients;
        let fac = factor.min(1.0);
        let mfac = 1.0 - fac;

        let mut out = [0.0f32; 4];
        for c in 0..3 {
            let balanced = colorbalance_lgg(color[c], lift[c], gamma_inv[c], gain[c]);
            out[c] = mfac * color[c] + fac * balanced;
        }
        out[3] = color[3];
        out
    }
}

impl NodeOperation for ColorBalanceLggOperation {
    fn name(&self) -> &'static str {
        "ColorBalanceLGG"
    }

    fn base(&self) -> &NodeOperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeOperationBase {
        &mut self.base
    }

    fn init_execution(&mut self) {
        self.input_value = self.base.input_socket_reader(0);
        self.input_color = self.base.input_socket_reader(1);
    }

    fn deinit_execution(&mut self) {
        self.input_value = None;
        self.input_color = None;
    }

    fn execute_pixel_sampled(
        &self,
        graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        sampler: PixelSampler,
    ) {
        let mut value = [0.0f32; 4];
        let mut color = [0.0f32; 4];
        let value_reader = resolved_reader(self.input_value, self.name());
        let color_reader = resolved_reader(self.input_color, self.name());
        graph.read_sampled(value_reader, &mut value, x, y, sampler);
        graph.read_sampled(color_reader, &mut color, x, y, sampler);
        *output = self.balance_pixel(value[0], color);
    }

    fn as_row_operation(&self) -> Option<&dyn RowOperation> {
        Some(self)
    }
}

impl RowOperation for ColorBalanceLggOperation {
    fn update_memory_buffer_row(&self, p: &mut PixelCursor<'_>) {
        while !p.at_row_end() {
            let factor = p.input(0)[0];
            let c = p.input(1);
            let out = self.balance_pixel(factor, [c[0], c[1], c[2], c[3]]);
            p.out().copy_from_slice(&out);
            p.advance();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operation/color_balance.rs"]
mod tests;
