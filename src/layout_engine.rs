pub mod engine;
pub mod presets;
pub mod slots;

pub use engine::{EventResponse, SnapshotError, WmCommand, WorkspaceLayoutEngine};
pub use presets::{GridSlot, LayoutPreset, PresetGrid};
pub use slots::{slot_at_point, slot_bounds};

pub use crate::model::workspace::{WorkspaceId, WorkspaceManager};
