use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::buffer::memory::MemoryBuffer;
use crate::foundation::core::{DataType, PixelSampler, Rect, Resolution};
use crate::graph::operation_graph::OperationGraph;
use crate::operation::base::{NodeOperation, NodeOperationBase};

/// Strategy deciding whether a wrapped buffer needs a derived full-size copy for a tile request.
///
/// Consulted on tile requests until it asks for a copy; the copy is then built once and kept for
/// the rest of the execution pass.
pub trait InflatePolicy: Send + Sync + fmt::Debug {
    /// Return `true` when `rect` should be served from a derived copy of `source`.
    fn needs_inflate(&self, source: &MemoryBuffer, rect: &Rect) -> bool;

    /// Build the derived copy. Called at most once per pass.
    fn inflate(&self, source: &MemoryBuffer) -> MemoryBuffer {
        source.inflate()
    }
}

/// Expand single-element sources into full storage; read everything else in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct InflateSingleElem;

impl InflatePolicy for InflateSingleElem {
    fn needs_inflate(&self, source: &MemoryBuffer, _rect: &Rect) -> bool {
        source.is_single_elem()
    }
}

/// Always read the source in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverInflate;

impl InflatePolicy for NeverInflate {
    fn needs_inflate(&self, _source: &MemoryBuffer, _rect: &Rect) -> bool {
        false
    }
}

/// Graph leaf exposing an externally supplied buffer through the operation read contract.
///
/// The source is shared with its owner and only ever read. The inflated copy is owned by this
/// operation, built at most once per pass, and is the only thing released by
/// `deinit_execution`.
pub struct BufferOperation {
    base: NodeOperationBase,
    buffer: Arc<MemoryBuffer>,
    inflated_buffer: OnceLock<MemoryBuffer>,
    inflate_policy: Box<dyn InflatePolicy>,
}

impl fmt::Debug for BufferOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferOperation")
            .field("rect", &self.buffer.rect())
            .field("channels", &self.buffer.num_channels())
            .field("inflated", &self.inflated_buffer.get().is_some())
            .field("inflate_policy", &self.inflate_policy)
            .finish()
    }
}

impl BufferOperation {
    /// Wrap `buffer`, declaring its output as `data_type`.
    pub fn new(buffer: Arc<MemoryBuffer>, data_type: DataType) -> Self {
        let mut base = NodeOperationBase::new();
        base.add_output_socket(data_type);
        Self {
            base,
            buffer,
            inflated_buffer: OnceLock::new(),
            inflate_policy: Box::new(InflateSingleElem),
        }
    }

    /// Replace the inflate strategy.
    pub fn with_inflate_policy(mut self, policy: impl InflatePolicy + 'static) -> Self {
        self.inflate_policy = Box::new(policy);
        self
    }

    /// Wrapped source buffer.
    pub fn source(&self) -> &Arc<MemoryBuffer> {
        &self.buffer
    }

    /// Inflated copy, if one was built during the current pass.
    pub fn inflated(&self) -> Option<&MemoryBuffer> {
        self.inflated_buffer.get()
    }

    fn resolved_buffer(&self) -> &MemoryBuffer {
        self.inflated_buffer.get().unwrap_or(self.buffer.as_ref())
    }
}

impl NodeOperation for BufferOperation {
    fn name(&self) -> &'static str {
        "Buffer"
    }

    fn base(&self) -> &NodeOperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeOperationBase {
        &mut self.base
    }

    fn determine_canvas(&self, _graph: &OperationGraph, _preferred: Resolution) -> Rect {
        self.buffer.rect()
    }

    fn initialize_tile_data(&self, rect: &Rect) -> Option<&MemoryBuffer> {
        if let Some(inflated) = self.inflated_buffer.get() {
            return Some(inflated);
        }
        if !self.inflate_policy.needs_inflate(&self.buffer, rect) {
            return Some(self.buffer.as_ref());
        }
        Some(self.inflated_buffer.get_or_init(|| {
            let inflated = self.inflate_policy.inflate(&self.buffer);
            tracing::debug!(
                width = inflated.width(),
                height = inflated.height(),
                "inflated buffer source"
            );
            inflated
        }))
    }

    fn deinit_execution(&mut self) {
        if self.inflated_buffer.take().is_some() {
            tracing::debug!("released inflated buffer");
        }
    }

    fn execute_pixel_sampled(
        &self,
        _graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        sampler: PixelSampler,
    ) {
        self.resolved_buffer().read(output, x, y, sampler);
    }

    fn execute_pixel_filtered(
        &self,
        _graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        dx: [f32; 2],
        dy: [f32; 2],
    ) {
        self.resolved_buffer().read_filtered(output, x, y, dx, dy);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operation/buffer_op.rs"]
mod tests;
