//! pure slot-to-pixel geometry

use super::presets::{GridSlot, LayoutPreset};
use crate::model::geometry::{Point, Rect, Size};

/// Pixel rectangle of `slot` inside `area` under `preset`, with a fixed `gap`
/// between adjacent cells. Cell dimensions are computed once per row/column
/// split, never accumulated across slots. Spans widen by whole cells plus the
/// interior gaps they swallow.
pub fn slot_bounds(preset: LayoutPreset, slot: GridSlot, area: Rect, gap: f64) -> Rect {
    let grid = preset.grid();
    let row_count = grid.row_count();
    let cell_height = (area.size.height - gap * (row_count - 1) as f64) / row_count as f64;

    let cols = grid.rows.get(slot.row).copied().unwrap_or(1);
    let cell_width = (area.size.width - gap * (cols - 1) as f64) / cols as f64;

    let origin = Point::new(
        area.min_x() + slot.col as f64 * (cell_width + gap),
        area.min_y() + slot.row as f64 * (cell_height + gap),
    );
    let size = Size::new(
        cell_width * slot.col_span as f64 + gap * (slot.col_span - 1) as f64,
        cell_height * slot.row_span as f64 + gap * (slot.row_span - 1) as f64,
    );
    Rect::new(origin, size)
}

/// First catalog-order slot whose rectangle contains the point, else `None`.
/// This is the hit test behind drag-to-tile; the gesture itself lives in the
/// host.
pub fn slot_at_point(area: Rect, preset: LayoutPreset, point: Point, gap: f64) -> Option<GridSlot> {
    preset
        .grid()
        .slots
        .iter()
        .copied()
        .find(|&slot| slot_bounds(preset, slot, area, gap).contains(point))
}
