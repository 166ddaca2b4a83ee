//! Lumatile is a tiled, multi-threaded compositing core for float images.
//!
//! Images flow through a graph of operations that all honor one read contract:
//!
//! - Build an [`OperationGraph`] from [`BufferOperation`] leaves and processing operations such
//!   as [`ColorBalanceLggOperation`]
//! - Start a pass with [`OperationGraph::init_execution`]
//! - Render tiles in parallel with [`render`] or [`render_rect`], either pixel by pixel or by
//!   streaming whole rows
//! - End the pass with [`OperationGraph::deinit_execution`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod buffer;
mod foundation;

pub(crate) mod config;
pub(crate) mod execute;
pub(crate) mod graph;
pub(crate) mod operation;

pub use crate::foundation::color::{linear_to_srgb, srgb_to_linear};
pub use crate::foundation::core::{DataType, PixelSampler, Rect, Resolution};
pub use crate::foundation::error::{LumatileError, LumatileResult};

pub use crate::buffer::memory::MemoryBuffer;
pub use crate::config::GradeConfig;
pub use crate::execute::executor::{ExecutionMode, ExecutionOpts, render, render_rect};
pub use crate::execute::tiles::split_tiles;
pub use crate::graph::operation_graph::{OperationGraph, OperationId};
pub use crate::operation::base::{
    ExecutionState, InputSocket, NodeOperation, NodeOperationBase, OutputSocket, RowOperation,
};
pub use crate::operation::buffer_op::{
    BufferOperation, InflatePolicy, InflateSingleElem, NeverInflate,
};
pub use crate::operation::color_balance::{
    ColorBalanceLggOperation, LggCoefficients, LiftGammaGain, MAX_GAIN, MAX_LIFT, MIN_GAMMA,
    colorbalance_lgg,
};
pub use crate::operation::constant::ConstantOperation;
pub use crate::operation::cursor::PixelCursor;
