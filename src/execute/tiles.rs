use crate::foundation::core::Rect;

/// Split `area` into row-major tiles of at most `tile_size` x `tile_size` pixels.
///
/// Edge tiles are clipped to `area`; a `tile_size` of zero is treated as one.
pub fn split_tiles(area: Rect, tile_size: u32) -> Vec<Rect> {
    if area.is_empty() {
        return Vec::new();
    }
    let step = tile_size.max(1);
    let cols = area.width().div_ceil(step) as usize;
    let rows = area.height().div_ceil(step) as usize;
    let step = step.min(i32::MAX as u32) as i32;

    let mut tiles = Vec::with_capacity(cols * rows);
    let mut ymin = area.ymin;
    while ymin < area.ymax {
        let ymax = ymin.saturating_add(step).min(area.ymax);
        let mut xmin = area.xmin;
        while xmin < area.xmax {
            let xmax = xmin.saturating_add(step).min(area.xmax);
            tiles.push(Rect {
                xmin,
                xmax,
                ymin,
                ymax,
            });
            xmin = xmax;
        }
        ymin = ymax;
    }
    tiles
}

#[cfg(test)]
#[path = "../../tests/unit/execute/tiles.rs"]
mod tests;
