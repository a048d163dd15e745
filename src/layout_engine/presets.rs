//! the closed table of grid presets

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A named grid shape applied per workspace. Each variant is a closed table
/// row; geometry never branches on the variant.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutPreset {
    Grid3x2,
    #[default]
    Grid2x2,
    SideBySide,
    TwoOverOne,
    OneOverTwo,
    Single,
}

/// One cell in a preset's grid, optionally spanning multiple rows/columns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub row: usize,
    pub col: usize,
    #[serde(default = "one")]
    pub row_span: usize,
    #[serde(default = "one")]
    pub col_span: usize,
}

fn one() -> usize { 1 }

impl GridSlot {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col, row_span: 1, col_span: 1 }
    }

    /// Whether the cell footprints intersect, accounting for spans.
    pub fn footprint_overlaps(&self, other: &GridSlot) -> bool {
        self.row < other.row + other.row_span
            && other.row < self.row + self.row_span
            && self.col < other.col + other.col_span
            && other.col < self.col + self.col_span
    }
}

#[derive(Debug)]
pub struct PresetGrid {
    /// Column count per row, top to bottom.
    pub rows: &'static [usize],
    /// Row-major slot list; the order defines first-free-slot placement
    /// priority.
    pub slots: &'static [GridSlot],
}

impl PresetGrid {
    pub fn row_count(&self) -> usize { self.rows.len() }
}

const fn s(row: usize, col: usize) -> GridSlot { GridSlot::new(row, col) }

static GRID_3X2: PresetGrid = PresetGrid {
    rows: &[3, 3],
    slots: &[s(0, 0), s(0, 1), s(0, 2), s(1, 0), s(1, 1), s(1, 2)],
};

static GRID_2X2: PresetGrid = PresetGrid {
    rows: &[2, 2],
    slots: &[s(0, 0), s(0, 1), s(1, 0), s(1, 1)],
};

static SIDE_BY_SIDE: PresetGrid = PresetGrid {
    rows: &[2],
    slots: &[s(0, 0), s(0, 1)],
};

static TWO_OVER_ONE: PresetGrid = PresetGrid {
    rows: &[2, 1],
    slots: &[s(0, 0), s(0, 1), s(1, 0)],
};

static ONE_OVER_TWO: PresetGrid = PresetGrid {
    rows: &[1, 2],
    slots: &[s(0, 0), s(1, 0), s(1, 1)],
};

static SINGLE: PresetGrid = PresetGrid {
    rows: &[1],
    slots: &[s(0, 0)],
};

impl LayoutPreset {
    pub fn grid(self) -> &'static PresetGrid {
        match self {
            LayoutPreset::Grid3x2 => &GRID_3X2,
            LayoutPreset::Grid2x2 => &GRID_2X2,
            LayoutPreset::SideBySide => &SIDE_BY_SIDE,
            LayoutPreset::TwoOverOne => &TWO_OVER_ONE,
            LayoutPreset::OneOverTwo => &ONE_OVER_TWO,
            LayoutPreset::Single => &SINGLE,
        }
    }

    pub fn slot_count(self) -> usize { self.grid().slots.len() }

    /// Catalog position of the slot anchored at the same cell, if any.
    pub fn slot_index(self, slot: GridSlot) -> Option<usize> {
        self.grid().slots.iter().position(|s| s.row == slot.row && s.col == slot.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn slot_counts_match_the_catalog() {
        assert_eq!(LayoutPreset::Grid3x2.slot_count(), 6);
        assert_eq!(LayoutPreset::Grid2x2.slot_count(), 4);
        assert_eq!(LayoutPreset::SideBySide.slot_count(), 2);
        assert_eq!(LayoutPreset::TwoOverOne.slot_count(), 3);
        assert_eq!(LayoutPreset::OneOverTwo.slot_count(), 3);
        assert_eq!(LayoutPreset::Single.slot_count(), 1);
    }

    #[test]
    fn slots_are_row_major() {
        for preset in LayoutPreset::iter() {
            let slots = preset.grid().slots;
            for pair in slots.windows(2) {
                assert!(
                    (pair[0].row, pair[0].col) < (pair[1].row, pair[1].col),
                    "{preset} slots out of order"
                );
            }
        }
    }

    #[test]
    fn every_slot_fits_its_row() {
        for preset in LayoutPreset::iter() {
            let grid = preset.grid();
            for slot in grid.slots {
                assert!(slot.row < grid.row_count());
                assert!(slot.col + slot.col_span <= grid.rows[slot.row]);
            }
        }
    }

    #[test]
    fn footprint_overlap_accounts_for_spans() {
        let wide = GridSlot { row: 0, col: 0, row_span: 1, col_span: 2 };
        assert!(wide.footprint_overlaps(&s(0, 1)));
        assert!(!wide.footprint_overlaps(&s(1, 0)));
        assert!(!wide.footprint_overlaps(&s(0, 2)));

        let tall = GridSlot { row: 0, col: 1, row_span: 2, col_span: 1 };
        assert!(tall.footprint_overlaps(&s(1, 1)));
        assert!(!tall.footprint_overlaps(&s(1, 0)));
    }

    #[test]
    fn preset_names_round_trip_through_strum() {
        use std::str::FromStr;
        for preset in LayoutPreset::iter() {
            let name = preset.to_string();
            assert_eq!(LayoutPreset::from_str(&name).unwrap(), preset);
        }
    }
}
