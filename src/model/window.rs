use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::common::config::WindowSettings;
use crate::layout_engine::presets::GridSlot;
use crate::model::geometry::{Point, Rect, Size};
use crate::model::workspace::WorkspaceId;

new_key_type! {
    pub struct WindowId;
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dbg = format!("{:?}", self);
        let digits: String = dbg.chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u64>() {
            write!(f, "{:08}", n)
        } else {
            write!(f, "{}", dbg)
        }
    }
}

/// Application type hosted inside a window. The manager never interprets what
/// a kind renders; it only supplies default geometry and identity matches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Chat,
    Wallet,
    Browser,
    Terminal,
    Notes,
    Settings,
}

impl WindowKind {
    pub fn default_size(self) -> Size {
        match self {
            WindowKind::Chat => Size::new(420.0, 560.0),
            WindowKind::Wallet => Size::new(400.0, 520.0),
            WindowKind::Browser => Size::new(960.0, 640.0),
            WindowKind::Terminal => Size::new(640.0, 420.0),
            WindowKind::Notes => Size::new(480.0, 560.0),
            WindowKind::Settings => Size::new(560.0, 480.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Window {
    pub kind: WindowKind,
    pub frame: Rect,
    pub minimized: bool,
    pub maximized: bool,
    pub z_index: u64,
    pub workspace: WorkspaceId,
    pub grid_slot: Option<GridSlot>,
}

impl Window {
    #[inline]
    pub fn is_tiled(&self) -> bool { self.grid_slot.is_some() }

    #[inline]
    pub fn position(&self) -> Point { self.frame.origin }

    #[inline]
    pub fn size(&self) -> Size { self.frame.size }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// `None` defers to the active workspace.
    pub workspace: Option<WorkspaceId>,
}

/// Canonical window records: the single source of truth for rendering.
/// Slot-uniqueness is the layout engine's responsibility, not the registry's.
#[derive(Serialize, Deserialize, Debug)]
pub struct WindowRegistry {
    windows: SlotMap<WindowId, Window>,
    order: Vec<WindowId>,
    focused: Option<WindowId>,
    next_z: u64,
    #[serde(skip)]
    settings: WindowSettings,
}

impl WindowRegistry {
    pub fn new(settings: &WindowSettings) -> Self {
        Self {
            windows: SlotMap::default(),
            order: Vec::new(),
            focused: None,
            next_z: 1,
            settings: settings.clone(),
        }
    }

    pub fn set_settings(&mut self, settings: &WindowSettings) {
        self.settings = settings.clone();
    }

    /// Creates a window and focuses it. Default size comes from the kind
    /// table; default position centers in `area`, cascading by a fixed offset
    /// per already-open window, clamped to stay inside `area`.
    pub fn open(
        &mut self,
        kind: WindowKind,
        options: OpenOptions,
        area: Rect,
        workspace: WorkspaceId,
    ) -> WindowId {
        let size = self.clamp_size(options.size.unwrap_or_else(|| kind.default_size()));
        let position = options
            .position
            .unwrap_or_else(|| self.cascaded_position(size, area));

        let z_index = self.fresh_z();
        let id = self.windows.insert(Window {
            kind,
            frame: Rect::new(position, size),
            minimized: false,
            maximized: false,
            z_index,
            workspace,
            grid_slot: None,
        });
        self.order.push(id);
        self.focused = Some(id);
        debug!("opened {:?} window {} at z {}", kind, id, z_index);
        id
    }

    pub fn close(&mut self, id: WindowId) {
        if self.windows.remove(id).is_none() {
            return;
        }
        self.order.retain(|&other| other != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Toggle. Minimizing never changes z; a minimized window is excluded
    /// from rendering and focus but stays in the registry.
    pub fn minimize(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        window.minimized = !window.minimized;
        if window.minimized && self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Toggle. The underlying frame is retained for restore.
    pub fn maximize(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(id) {
            window.maximized = !window.maximized;
        }
    }

    /// Tiled geometry owns the frame, so a slot assignment drops the flag.
    pub(crate) fn unmaximize(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(id) {
            window.maximized = false;
        }
    }

    /// Assigns a fresh z, sets focus, and un-minimizes the target; bringing a
    /// window to front implicitly restores it.
    pub fn set_focus(&mut self, id: WindowId) {
        let z_index = self.next_z;
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        window.minimized = false;
        window.z_index = z_index;
        self.next_z += 1;
        self.focused = Some(id);
    }

    pub fn move_to(&mut self, id: WindowId, x: f64, y: f64) {
        if let Some(window) = self.windows.get_mut(id) {
            window.frame.origin = Point::new(x, y);
        }
    }

    pub fn resize(&mut self, id: WindowId, width: f64, height: f64) {
        let size = self.clamp_size(Size::new(width, height));
        if let Some(window) = self.windows.get_mut(id) {
            window.frame.size = size;
        }
    }

    pub fn set_workspace(&mut self, id: WindowId, workspace: WorkspaceId) {
        if let Some(window) = self.windows.get_mut(id) {
            window.workspace = workspace;
        }
    }

    pub fn set_grid_slot(&mut self, id: WindowId, slot: Option<GridSlot>) {
        if let Some(window) = self.windows.get_mut(id) {
            window.grid_slot = slot;
        }
    }

    /// Stable order = insertion order.
    pub fn ids_by_kind(&self, kind: WindowKind) -> Vec<WindowId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.windows.get(id).map(|w| w.kind) == Some(kind))
            .collect()
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> { self.windows.get(id) }

    pub fn contains(&self, id: WindowId) -> bool { self.windows.contains_key(id) }

    /// All windows in insertion order.
    pub fn ids(&self) -> &[WindowId] { &self.order }

    pub fn window_count(&self) -> usize { self.order.len() }

    pub fn focused(&self) -> Option<WindowId> { self.focused }

    pub fn windows_in_workspace(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.windows.get(id).map(|w| w.workspace) == Some(workspace))
            .collect()
    }

    fn fresh_z(&mut self) -> u64 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            f64::max(size.width, self.settings.min_width),
            f64::max(size.height, self.settings.min_height),
        )
    }

    fn cascaded_position(&self, size: Size, area: Rect) -> Point {
        let offset = self.settings.cascade_offset * self.order.len() as f64;
        let center = area.center();
        let x = center.x - size.width / 2.0 + offset;
        let y = center.y - size.height / 2.0 + offset;
        Point::new(
            x.clamp(area.min_x(), f64::max(area.min_x(), area.max_x() - size.width)),
            y.clamp(area.min_y(), f64::max(area.min_y(), area.max_y() - size.height)),
        )
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::model::geometry::SameAs;

    fn area() -> Rect {
        Rect::new(Point::new(0.0, 32.0), Size::new(1920.0, 976.0))
    }

    fn registry() -> (WindowRegistry, WorkspaceId) {
        let mut workspaces = slotmap::SlotMap::<WorkspaceId, ()>::default();
        let ws = workspaces.insert(());
        (WindowRegistry::new(&WindowSettings::default()), ws)
    }

    #[test]
    fn open_uses_kind_default_size() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Terminal, OpenOptions::default(), area(), ws);
        let window = registry.get(id).unwrap();
        assert_eq!(window.size(), WindowKind::Terminal.default_size());
        assert!(!window.is_tiled());
    }

    #[test]
    fn open_centers_then_cascades() {
        let (mut registry, ws) = registry();
        let first = registry.open(WindowKind::Notes, OpenOptions::default(), area(), ws);
        let second = registry.open(WindowKind::Notes, OpenOptions::default(), area(), ws);

        let size = WindowKind::Notes.default_size();
        let center = area().center();
        let expected_first =
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0);
        let expected_second = Point::new(expected_first.x + 28.0, expected_first.y + 28.0);

        assert!(registry.get(first).unwrap().position().same_as(expected_first));
        assert!(registry.get(second).unwrap().position().same_as(expected_second));
    }

    #[test]
    fn cascade_is_clamped_to_area() {
        let (mut registry, ws) = registry();
        let small = Rect::new(Point::new(0.0, 0.0), Size::new(500.0, 400.0));
        for _ in 0..20 {
            registry.open(WindowKind::Wallet, OpenOptions::default(), small, ws);
        }
        for &id in registry.ids() {
            let frame = registry.get(id).unwrap().frame;
            assert!(frame.min_x() >= small.min_x());
            assert!(frame.min_y() >= small.min_y());
        }
    }

    #[test]
    fn z_index_is_strictly_increasing() {
        let (mut registry, ws) = registry();
        let a = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        let b = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        let z_a = registry.get(a).unwrap().z_index;
        let z_b = registry.get(b).unwrap().z_index;
        assert!(z_b > z_a);

        registry.set_focus(a);
        assert!(registry.get(a).unwrap().z_index > z_b);
    }

    #[test]
    fn close_twice_is_a_no_op() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Browser, OpenOptions::default(), area(), ws);
        registry.close(id);
        assert_eq!(registry.window_count(), 0);
        registry.close(id);
        assert_eq!(registry.window_count(), 0);
    }

    #[test]
    fn close_clears_focus() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Browser, OpenOptions::default(), area(), ws);
        assert_eq!(registry.focused(), Some(id));
        registry.close(id);
        assert_eq!(registry.focused(), None);
    }

    #[test]
    fn resize_clamps_to_minimums() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        registry.resize(id, 10.0, 10.0);
        let window = registry.get(id).unwrap();
        assert_eq!(window.size(), Size::new(360.0, 240.0));
    }

    #[test]
    fn minimize_keeps_z_and_drops_focus() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        let z = registry.get(id).unwrap().z_index;

        registry.minimize(id);
        assert!(registry.get(id).unwrap().minimized);
        assert_eq!(registry.get(id).unwrap().z_index, z);
        assert_eq!(registry.focused(), None);

        registry.minimize(id);
        assert!(!registry.get(id).unwrap().minimized);
    }

    #[test]
    fn focus_restores_minimized_window() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        registry.minimize(id);
        registry.set_focus(id);

        let window = registry.get(id).unwrap();
        assert!(!window.minimized);
        assert_eq!(registry.focused(), Some(id));
    }

    #[test]
    fn maximize_toggles_and_keeps_frame() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Browser, OpenOptions::default(), area(), ws);
        let frame = registry.get(id).unwrap().frame;

        registry.maximize(id);
        assert!(registry.get(id).unwrap().maximized);
        assert_eq!(registry.get(id).unwrap().frame, frame);

        registry.maximize(id);
        assert!(!registry.get(id).unwrap().maximized);
    }

    #[test]
    fn stale_ids_are_no_ops() {
        let (mut registry, ws) = registry();
        let id = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        registry.close(id);

        registry.set_focus(id);
        registry.minimize(id);
        registry.maximize(id);
        registry.move_to(id, 1.0, 2.0);
        registry.resize(id, 500.0, 500.0);
        registry.set_grid_slot(id, None);

        assert_eq!(registry.window_count(), 0);
        assert_eq!(registry.focused(), None);
    }

    #[test]
    fn ids_by_kind_preserves_insertion_order() {
        let (mut registry, ws) = registry();
        let a = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);
        let _b = registry.open(WindowKind::Terminal, OpenOptions::default(), area(), ws);
        let c = registry.open(WindowKind::Chat, OpenOptions::default(), area(), ws);

        assert_eq!(registry.ids_by_kind(WindowKind::Chat), vec![a, c]);
        assert_eq!(registry.ids_by_kind(WindowKind::Wallet), Vec::<WindowId>::new());
    }
}
