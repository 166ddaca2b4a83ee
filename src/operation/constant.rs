use crate::foundation::core::{DataType, PixelSampler, expand_elem};
use crate::graph::operation_graph::OperationGraph;
use crate::operation::base::{NodeOperation, NodeOperationBase, RowOperation};
use crate::operation::cursor::PixelCursor;

/// Socket-less leaf emitting the same element everywhere.
///
/// Takes the preferred resolution of whatever reads it.
#[derive(Clone, Debug)]
pub struct ConstantOperation {
    base: NodeOperationBase,
    pixel: [f32; 4],
}

impl ConstantOperation {
    fn with_output(data_type: DataType, elem: &[f32]) -> Self {
        let mut base = NodeOperationBase::new();
        base.add_output_socket(data_type);
        Self {
            base,
            pixel: expand_elem(elem),
        }
    }

    /// Scalar constant, read as `[v, v, v, v]`.
    pub fn value(v: f32) -> Self {
        Self::with_output(DataType::Value, &[v])
    }

    /// RGBA constant.
    pub fn color(rgba: [f32; 4]) -> Self {
        Self::with_output(DataType::Color, &rgba)
    }

    /// Vector constant, read with alpha `0.0`.
    pub fn vector(xyz: [f32; 3]) -> Self {
        Self::with_output(DataType::Vector, &xyz)
    }

    /// Pixel returned by every read.
    pub fn pixel(&self) -> [f32; 4] {
        self.pixel
    }
}

impl NodeOperation for ConstantOperation {
    fn name(&self) -> &'static str {
        "Constant"
    }

    fn base(&self) -> &NodeOperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeOperationBase {
        &mut self.base
    }

    fn execute_pixel_sampled(
        &self,
        _graph: &OperationGraph,
        output: &mut [f32; 4],
        _x: f32,
        _y: f32,
        _sampler: PixelSampler,
    ) {
        *output = self.pixel;
    }

    fn as_row_operation(&self) -> Option<&dyn RowOperation> {
        Some(self)
    }
}

impl RowOperation for ConstantOperation {
    fn update_memory_buffer_row(&self, p: &mut PixelCursor<'_>) {
        while !p.at_row_end() {
            let out = p.out();
            let n = out.len().min(4);
            out[..n].copy_from_slice(&self.pixel[..n]);
            p.advance();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operation/constant.rs"]
mod tests;
