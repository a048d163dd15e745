pub mod common;
pub mod layout_engine;
pub mod model;

pub use common::config::Config;
pub use layout_engine::{
    EventResponse, GridSlot, LayoutPreset, WmCommand, WorkspaceLayoutEngine,
};
pub use model::{
    OpenOptions, Point, Rect, Size, Viewport, Window, WindowId, WindowKind, WindowRegistry,
    WorkspaceId, WorkspaceManager,
};
