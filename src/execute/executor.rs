use rayon::prelude::*;
use smallvec::SmallVec;

use crate::buffer::memory::MemoryBuffer;
use crate::execute::tiles::split_tiles;
use crate::foundation::core::{PixelSampler, Rect, Resolution};
use crate::foundation::error::{LumatileError, LumatileResult};
use crate::graph::operation_graph::{OperationGraph, OperationId};
use crate::operation::cursor::PixelCursor;

/// How tiles are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Stream whole rows through operations that support it; sample the rest.
    #[default]
    Rows,
    /// Pull every output pixel through `execute_pixel_sampled`.
    Sampled,
}

/// Tiling and threading controls for [`render`] and [`render_rect`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExecutionOpts {
    /// Tile evaluation strategy.
    pub mode: ExecutionMode,
    /// Tile edge length in pixels.
    pub tile_size: u32,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Sampler used for sampled reads of the rendered operation.
    pub sampler: PixelSampler,
    /// Resolution handed to operations without a size of their own.
    pub preferred_resolution: Resolution,
}

impl Default for ExecutionOpts {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Rows,
            tile_size: 64,
            threads: None,
            sampler: PixelSampler::default(),
            preferred_resolution: Resolution::default(),
        }
    }
}

impl ExecutionOpts {
    /// Reject zero tile sizes, zero thread counts and empty preferred resolutions.
    pub fn validate(&self) -> LumatileResult<()> {
        if self.tile_size == 0 {
            return Err(LumatileError::validation("execution 'tile_size' must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(LumatileError::validation(
                "execution 'threads' must be >= 1 when set",
            ));
        }
        Resolution::new(
            self.preferred_resolution.width,
            self.preferred_resolution.height,
        )?;
        Ok(())
    }
}

/// Render operation `id` over its canvas, keeping the canvas origin.
///
/// The graph must be between `init_execution` and `deinit_execution`.
#[tracing::instrument(skip(graph, opts), fields(mode = ?opts.mode))]
pub fn render(
    graph: &OperationGraph,
    id: OperationId,
    opts: &ExecutionOpts,
) -> LumatileResult<MemoryBuffer> {
    opts.validate()?;
    let area = graph.canvas_of(id, opts.preferred_resolution);
    render_rect(graph, id, area, opts)
}

/// Render operation `id` over `area`, which may extend past the operation's own resolution.
///
/// Tiles are evaluated in parallel on a dedicated pool and blitted into one buffer whose
/// channel count follows the operation's output data type.
#[tracing::instrument(skip(graph, opts), fields(mode = ?opts.mode))]
pub fn render_rect(
    graph: &OperationGraph,
    id: OperationId,
    area: Rect,
    opts: &ExecutionOpts,
) -> LumatileResult<MemoryBuffer> {
    opts.validate()?;
    if !graph.is_initialized() {
        return Err(LumatileError::execution(
            "graph must be initialized before rendering",
        ));
    }
    let op = graph
        .operation(id)
        .ok_or_else(|| LumatileError::validation(format!("{id:?} is not in the graph")))?;
    let channels = op.base().output_data_type().channels();
    let mut out = MemoryBuffer::new(channels, area)?;

    let tiles = split_tiles(area, opts.tile_size);
    let pool = build_thread_pool(opts.threads)?;
    let rendered = pool.install(|| {
        tiles
            .par_iter()
            .map(|tile| render_tile(graph, id, *tile, opts))
            .collect::<LumatileResult<Vec<_>>>()
    })?;

    let mut written = 0usize;
    for tile in &rendered {
        written += out.copy_from(tile)?;
    }
    tracing::debug!(
        operation = op.name(),
        tiles = rendered.len(),
        pixels = written,
        "rendered"
    );
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> LumatileResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LumatileError::validation(
            "execution 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LumatileError::execution(format!("failed to build rayon thread pool: {e}")))
}

fn render_tile(
    graph: &OperationGraph,
    id: OperationId,
    rect: Rect,
    opts: &ExecutionOpts,
) -> LumatileResult<MemoryBuffer> {
    tracing::trace!(?rect, "tile");
    graph.initialize_tile_data(&rect);
    match opts.mode {
        ExecutionMode::Sampled => sample_tile(graph, id, rect, opts.sampler),
        ExecutionMode::Rows => stream_tile(graph, id, rect, opts.sampler),
    }
}

fn output_channels(graph: &OperationGraph, id: OperationId) -> LumatileResult<usize> {
    graph
        .operation(id)
        .map(|op| op.base().output_data_type().channels())
        .ok_or_else(|| LumatileError::validation(format!("{id:?} is not in the graph")))
}

fn sample_tile(
    graph: &OperationGraph,
    id: OperationId,
    rect: Rect,
    sampler: PixelSampler,
) -> LumatileResult<MemoryBuffer> {
    let channels = output_channels(graph, id)?;
    let mut tile = MemoryBuffer::new(channels, rect)?;
    let mut px = [0.0f32; 4];
    for y in rect.ymin..rect.ymax {
        let row = tile
            .row_mut(y)
            .ok_or_else(|| LumatileError::execution("tile row out of range"))?;
        for (x, dst) in (rect.xmin..).zip(row.chunks_exact_mut(channels)) {
            graph.read_sampled(id, &mut px, x as f32, y as f32, sampler);
            dst.copy_from_slice(&px[..channels]);
        }
    }
    Ok(tile)
}

/// Evaluate `id` over `rect` row by row, materializing each input as a tile first.
///
/// Operations without a row path serve the tile from their backing data when they have any,
/// otherwise through sampled reads.
fn stream_tile(
    graph: &OperationGraph,
    id: OperationId,
    rect: Rect,
    sampler: PixelSampler,
) -> LumatileResult<MemoryBuffer> {
    let op = graph
        .operation(id)
        .ok_or_else(|| LumatileError::validation(format!("{id:?} is not in the graph")))?;
    let channels = op.base().output_data_type().channels();

    let Some(row_op) = op.as_row_operation() else {
        return match op.initialize_tile_data(&rect) {
            Some(data) => data.copy_rect_clamped(rect, channels),
            None => sample_tile(graph, id, rect, sampler),
        };
    };

    let mut inputs: SmallVec<[MemoryBuffer; 4]> = SmallVec::new();
    for (i, socket) in op.base().inputs().iter().enumerate() {
        let from = socket.link().ok_or_else(|| {
            LumatileError::execution(format!("{} input {i} is not connected", op.name()))
        })?;
        let want = socket.data_type().channels();
        let mut input = stream_tile(graph, from, rect, sampler)?;
        if input.num_channels() != want {
            input = input.copy_rect_clamped(rect, want)?;
        }
        inputs.push(input);
    }

    let mut tile = MemoryBuffer::new(channels, rect)?;
    for y in rect.ymin..rect.ymax {
        let row = tile
            .row_mut(y)
            .ok_or_else(|| LumatileError::execution("tile row out of range"))?;
        let mut p = PixelCursor::new(row, channels, rect.xmin, y);
        for input in &inputs {
            let data = input
                .row(y)
                .ok_or_else(|| LumatileError::execution("input row out of range"))?;
            p = p.with_input(data, input.num_channels());
        }
        row_op.update_memory_buffer_row(&mut p);
    }
    Ok(tile)
}

#[cfg(test)]
#[path = "../../tests/unit/execute/executor.rs"]
mod tests;
