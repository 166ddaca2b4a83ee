use smallvec::SmallVec;

use crate::buffer::memory::MemoryBuffer;
use crate::foundation::core::{DataType, PixelSampler, Rect, Resolution};
use crate::foundation::error::{LumatileError, LumatileResult};
use crate::graph::operation_graph::{OperationGraph, OperationId};
use crate::operation::cursor::PixelCursor;

/// Lifecycle of one operation within an execution pass.
///
/// `Uninitialized -> Initialized -> Deinitialized`; a pass never re-enters `Initialized`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionState {
    /// Constructed and wired, no readers resolved yet.
    #[default]
    Uninitialized,
    /// Readers resolved; pixel reads are allowed.
    Initialized,
    /// Readers released; pixel reads are a contract violation.
    Deinitialized,
}

/// Typed input slot, optionally linked to an upstream operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSocket {
    data_type: DataType,
    link: Option<OperationId>,
}

impl InputSocket {
    /// Data kind fixed at construction.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Upstream operation feeding this socket.
    pub fn link(&self) -> Option<OperationId> {
        self.link
    }
}

/// Typed output slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSocket {
    data_type: DataType,
}

impl OutputSocket {
    /// Data kind fixed at construction.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Socket list, resolution configuration and lifecycle state shared by every operation.
///
/// Sockets can only be added, never retyped. Links are set through
/// [`OperationGraph::connect`] while the operation is still uninitialized.
#[derive(Clone, Debug, Default)]
pub struct NodeOperationBase {
    inputs: SmallVec<[InputSocket; 4]>,
    outputs: SmallVec<[OutputSocket; 1]>,
    resolution_input_index: usize,
    state: ExecutionState,
}

impl NodeOperationBase {
    /// Empty base with resolution driven by input socket 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input socket of `data_type`.
    pub fn add_input_socket(&mut self, data_type: DataType) {
        self.inputs.push(InputSocket {
            data_type,
            link: None,
        });
    }

    /// Append an output socket of `data_type`.
    pub fn add_output_socket(&mut self, data_type: DataType) {
        self.outputs.push(OutputSocket { data_type });
    }

    /// Choose which input socket determines the operation's resolution.
    pub fn set_resolution_input_socket_index(&mut self, index: usize) {
        self.resolution_input_index = index;
    }

    /// Input socket that determines the operation's resolution.
    pub fn resolution_input_socket_index(&self) -> usize {
        self.resolution_input_index
    }

    /// Declared input sockets.
    pub fn inputs(&self) -> &[InputSocket] {
        &self.inputs
    }

    /// Declared output sockets.
    pub fn outputs(&self) -> &[OutputSocket] {
        &self.outputs
    }

    /// Data kind of the primary output, `Color` when none is declared.
    pub fn output_data_type(&self) -> DataType {
        self.outputs
            .first()
            .map(OutputSocket::data_type)
            .unwrap_or(DataType::Color)
    }

    /// Upstream reader for input `index`; resolved by operations in `init_execution`.
    pub fn input_socket_reader(&self, index: usize) -> Option<OperationId> {
        self.inputs.get(index).and_then(InputSocket::link)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
    }

    pub(crate) fn link_input(&mut self, index: usize, from: OperationId) -> LumatileResult<()> {
        if self.state != ExecutionState::Uninitialized {
            return Err(LumatileError::validation(
                "sockets cannot be rewired once execution has started",
            ));
        }
        let count = self.inputs.len();
        let socket = self.inputs.get_mut(index).ok_or_else(|| {
            LumatileError::validation(format!(
                "input socket {index} out of range (operation has {count})"
            ))
        })?;
        socket.link = Some(from);
        Ok(())
    }
}

/// Uniform read contract of every node in a compositing graph.
///
/// Leaves (wrapped buffers, constants) and computed operations implement the same interface so
/// an evaluator can treat them identically. Lifecycle methods take `&mut self` and are driven by
/// [`OperationGraph::init_execution`] / [`OperationGraph::deinit_execution`]; reads take
/// `&self`, so any number of worker threads may read disjoint pixels in between.
pub trait NodeOperation: Send + Sync {
    /// Short, stable operation name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Shared socket/lifecycle state.
    fn base(&self) -> &NodeOperationBase;

    /// Mutable shared socket/lifecycle state.
    fn base_mut(&mut self) -> &mut NodeOperationBase;

    /// Area the output covers, following the configured resolution input socket.
    ///
    /// Falls back to the first linked input, then to `preferred` placed at the origin.
    fn determine_canvas(&self, graph: &OperationGraph, preferred: Resolution) -> Rect {
        let base = self.base();
        base.input_socket_reader(base.resolution_input_socket_index())
            .or_else(|| base.inputs().iter().find_map(InputSocket::link))
            .map(|upstream| graph.canvas_of(upstream, preferred))
            .unwrap_or_else(|| preferred.to_rect())
    }

    /// Output size: the extent of [`NodeOperation::determine_canvas`].
    fn determine_resolution(&self, graph: &OperationGraph, preferred: Resolution) -> Resolution {
        let canvas = self.determine_canvas(graph, preferred);
        Resolution {
            width: canvas.width(),
            height: canvas.height(),
        }
    }

    /// Resolve and cache upstream readers. Called exactly once per pass before any read.
    fn init_execution(&mut self) {}

    /// Release cached readers. Must be a no-op when `init_execution` never ran.
    fn deinit_execution(&mut self) {}

    /// Write the RGBA value at fractional `(x, y)` into `output`.
    fn execute_pixel_sampled(
        &self,
        graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        sampler: PixelSampler,
    );

    /// Footprint-aware read with screen-space derivatives `dx` / `dy`.
    ///
    /// Operations without a filtered path ignore the derivatives and read bilinearly.
    fn execute_pixel_filtered(
        &self,
        graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        dx: [f32; 2],
        dy: [f32; 2],
    ) {
        let _ = (dx, dy);
        self.execute_pixel_sampled(graph, output, x, y, PixelSampler::Bilinear);
    }

    /// Backing data for a tile request, for operations that hold pixel storage.
    fn initialize_tile_data(&self, rect: &Rect) -> Option<&MemoryBuffer> {
        let _ = rect;
        None
    }

    /// Row-streaming view of this operation, when it has one.
    fn as_row_operation(&self) -> Option<&dyn RowOperation> {
        None
    }
}

/// Bulk evaluation path: one call per output row.
///
/// Inputs arrive as materialized rows aligned with the output row, one per input socket in
/// declaration order, each with that socket's channel count.
pub trait RowOperation: Send + Sync {
    /// Write every output pixel of the cursor's row.
    fn update_memory_buffer_row(&self, p: &mut PixelCursor<'_>);
}

/// Cached reader for an input, panicking when read outside an execution pass.
#[inline]
#[track_caller]
pub(crate) fn resolved_reader(slot: Option<OperationId>, op: &'static str) -> OperationId {
    match slot {
        Some(id) => id,
        None => panic!("{op}: input read outside init_execution/deinit_execution"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operation/base.rs"]
mod tests;
