use crate::foundation::core::{PixelSampler, Rect, Resolution};
use crate::foundation::error::{LumatileError, LumatileResult};
use crate::operation::base::{ExecutionState, NodeOperation};

/// Index of an operation inside an [`OperationGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub(crate) u32);

impl OperationId {
    /// Position in insertion (= dependency) order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena of operations in dependency order.
///
/// Links always point from an earlier-added operation to a later one, so insertion order is a
/// valid evaluation order and the graph cannot contain cycles. Lifecycle calls need `&mut self`;
/// reads need only `&self`, which makes the init/deinit boundary the single synchronization
/// point for worker threads.
#[derive(Default)]
pub struct OperationGraph {
    ops: Vec<Box<dyn NodeOperation>>,
}

impl std::fmt::Debug for OperationGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.ops.iter().map(|op| (op.name(), op.base().state())))
            .finish()
    }
}

impl OperationGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation; it may only be linked to operations added before it.
    pub fn add(&mut self, op: impl NodeOperation + 'static) -> OperationId {
        let id = OperationId(self.ops.len() as u32);
        self.ops.push(Box::new(op));
        id
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Return `true` when the graph holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation by id.
    pub fn operation(&self, id: OperationId) -> Option<&dyn NodeOperation> {
        self.ops.get(id.index()).map(|op| op.as_ref())
    }

    /// Lifecycle state of an operation.
    pub fn state_of(&self, id: OperationId) -> Option<ExecutionState> {
        self.operation(id).map(|op| op.base().state())
    }

    /// Feed input socket `input_index` of `to` from the output of `from`.
    pub fn connect(
        &mut self,
        from: OperationId,
        to: OperationId,
        input_index: usize,
    ) -> LumatileResult<()> {
        if to.index() >= self.ops.len() {
            return Err(LumatileError::validation(format!(
                "connect target {to:?} is not in the graph"
            )));
        }
        if from >= to {
            return Err(LumatileError::validation(format!(
                "connect source {from:?} must be added before target {to:?}"
            )));
        }
        self.ops[to.index()].base_mut().link_input(input_index, from)
    }

    /// Start an execution pass: initialize every operation in dependency order.
    ///
    /// Fails when an input socket is unconnected or when the graph already ran a pass.
    pub fn init_execution(&mut self) -> LumatileResult<()> {
        for op in &self.ops {
            let base = op.base();
            match base.state() {
                ExecutionState::Uninitialized => {}
                ExecutionState::Initialized => {
                    return Err(LumatileError::execution(format!(
                        "{} is already initialized",
                        op.name()
                    )));
                }
                ExecutionState::Deinitialized => {
                    return Err(LumatileError::execution(format!(
                        "{} already finished a pass; build a fresh graph",
                        op.name()
                    )));
                }
            }
            if let Some(i) = base.inputs().iter().position(|s| s.link().is_none()) {
                return Err(LumatileError::execution(format!(
                    "{} input {i} is not connected",
                    op.name()
                )));
            }
        }

        for op in &mut self.ops {
            op.init_execution();
            op.base_mut().set_state(ExecutionState::Initialized);
        }
        tracing::debug!(operations = self.ops.len(), "execution initialized");
        Ok(())
    }

    /// End an execution pass in reverse dependency order.
    ///
    /// Operations that were never initialized are left untouched.
    pub fn deinit_execution(&mut self) {
        let mut released = 0usize;
        for op in self.ops.iter_mut().rev() {
            if op.base().state() != ExecutionState::Initialized {
                continue;
            }
            op.deinit_execution();
            op.base_mut().set_state(ExecutionState::Deinitialized);
            released += 1;
        }
        tracing::debug!(operations = released, "execution deinitialized");
    }

    /// Return `true` when every operation is between init and deinit.
    pub fn is_initialized(&self) -> bool {
        !self.ops.is_empty()
            && self
                .ops
                .iter()
                .all(|op| op.base().state() == ExecutionState::Initialized)
    }

    /// Resolution of `id`, with `preferred` used by operations that have no size of their own.
    pub fn resolution_of(&self, id: OperationId, preferred: Resolution) -> Resolution {
        match self.ops.get(id.index()) {
            Some(op) => op.determine_resolution(self, preferred),
            None => preferred,
        }
    }

    /// Area covered by `id`, with `preferred` used by operations that have no size of their own.
    pub fn canvas_of(&self, id: OperationId, preferred: Resolution) -> Rect {
        match self.ops.get(id.index()) {
            Some(op) => op.determine_canvas(self, preferred),
            None => preferred.to_rect(),
        }
    }

    /// Give every operation the chance to prepare backing data for a tile.
    pub(crate) fn initialize_tile_data(&self, rect: &Rect) {
        for op in &self.ops {
            let _ = op.initialize_tile_data(rect);
        }
    }

    /// Upstream read used by operations for their inputs.
    #[inline]
    pub fn read_sampled(
        &self,
        id: OperationId,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        sampler: PixelSampler,
    ) {
        let op = &self.ops[id.index()];
        debug_assert_eq!(
            op.base().state(),
            ExecutionState::Initialized,
            "{} read outside its execution pass",
            op.name()
        );
        op.execute_pixel_sampled(self, output, x, y, sampler);
    }

    /// Footprint-aware upstream read.
    #[inline]
    pub fn read_filtered(
        &self,
        id: OperationId,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        dx: [f32; 2],
        dy: [f32; 2],
    ) {
        let op = &self.ops[id.index()];
        debug_assert_eq!(
            op.base().state(),
            ExecutionState::Initialized,
            "{} read outside its execution pass",
            op.name()
        );
        op.execute_pixel_filtered(self, output, x, y, dx, dy);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/operation_graph.rs"]
mod tests;
