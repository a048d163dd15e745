pub mod geometry;
pub mod window;
pub mod workspace;

pub use geometry::{Point, Rect, Size, Viewport};
pub use window::{OpenOptions, Window, WindowId, WindowKind, WindowRegistry};
pub use workspace::{Workspace, WorkspaceId, WorkspaceManager};
