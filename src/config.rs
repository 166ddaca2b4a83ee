use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::buffer::memory::MemoryBuffer;
use crate::execute::executor::ExecutionOpts;
use crate::foundation::core::DataType;
use crate::foundation::error::{LumatileError, LumatileResult};
use crate::graph::operation_graph::{OperationGraph, OperationId};
use crate::operation::buffer_op::BufferOperation;
use crate::operation::color_balance::{ColorBalanceLggOperation, LiftGammaGain};
use crate::operation::constant::ConstantOperation;

/// JSON-facing description of a single color-balance pass.
///
/// Every field is optional; missing fields take neutral defaults, so `{}` is an identity grade
/// executed with default [`ExecutionOpts`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    /// Lift/gamma/gain parameters.
    #[serde(flatten)]
    pub grade: LiftGammaGain,
    /// Blend factor between the original and the graded color; clamped to `<= 1` at execution.
    pub factor: f32,
    /// Tiling and threading.
    pub execution: ExecutionOpts,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            grade: LiftGammaGain::default(),
            factor: 1.0,
            execution: ExecutionOpts::default(),
        }
    }
}

impl GradeConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LumatileResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LumatileError::serde(format!("parse grade config JSON: {e}")))
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> LumatileResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| LumatileError::serde(format!("parse grade config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LumatileResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LumatileError::validation(format!("open grade config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate grade parameters, factor and execution options.
    pub fn validate(&self) -> LumatileResult<()> {
        self.grade.validate()?;
        if !self.factor.is_finite() {
            return Err(LumatileError::validation("'factor' must be finite"));
        }
        self.execution.validate()
    }

    /// Graph grading `image`: a constant factor and the image feed one color-balance operation.
    ///
    /// Returns the graph (not yet initialized) and the id of the color-balance operation.
    pub fn build_graph(
        &self,
        image: Arc<MemoryBuffer>,
    ) -> LumatileResult<(OperationGraph, OperationId)> {
        self.validate()?;
        let mut graph = OperationGraph::new();
        let factor = graph.add(ConstantOperation::value(self.factor));
        let color = graph.add(BufferOperation::new(image, DataType::Color));
        let balance = graph.add(ColorBalanceLggOperation::from_params(&self.grade)?);
        graph.connect(factor, balance, 0)?;
        graph.connect(color, balance, 1)?;
        Ok((graph, balance))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
