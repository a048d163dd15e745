use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::presets::{GridSlot, LayoutPreset};
use super::slots;
use crate::common::collections::HashSet;
use crate::common::config::{Config, Settings};
use crate::model::geometry::{Rect, Viewport};
use crate::model::window::{OpenOptions, WindowId, WindowKind, WindowRegistry};
use crate::model::workspace::{WorkspaceId, WorkspaceManager};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] ron::Error),
}

#[non_exhaustive]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum WmCommand {
    OpenWindow(WindowKind),
    OpenOrFocus(WindowKind),
    CloseWindow(WindowId),
    FocusWindow(WindowId),
    MinimizeWindow(WindowId),
    MaximizeWindow(WindowId),
    MoveWindow {
        window: WindowId,
        x: f64,
        y: f64,
    },
    ResizeWindow {
        window: WindowId,
        width: f64,
        height: f64,
    },
    DropWindowAt {
        window: WindowId,
        x: f64,
        y: f64,
    },
    SetGridMode(bool),
    SetWorkspacePreset {
        workspace: Option<WorkspaceId>,
        preset: LayoutPreset,
    },
    MoveWindowToWorkspace {
        window: Option<WindowId>,
        workspace: WorkspaceId,
    },
    CreateWorkspace,
    ActivateWorkspace(WorkspaceId),
}

#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventResponse {
    pub focus_window: Option<WindowId>,
    pub workspace_changed_to: Option<WorkspaceId>,
}

/// Orchestrates the registry, the preset catalog, and the slot resolver.
/// Every mutation is a synchronous `&mut self` call, so mass re-snaps commit
/// fully before the caller's event loop can observe anything.
#[derive(Serialize, Deserialize)]
pub struct WorkspaceLayoutEngine {
    registry: WindowRegistry,
    workspaces: WorkspaceManager,
    grid_mode: bool,
    #[serde(skip)]
    settings: Settings,
}

impl WorkspaceLayoutEngine {
    pub fn new(config: &Config) -> Self {
        let registry = WindowRegistry::new(&config.settings.window);
        let workspaces =
            WorkspaceManager::new_with_config(&config.workspaces, config.settings.default_preset);
        Self {
            registry,
            workspaces,
            grid_mode: config.settings.grid_mode_enabled,
            settings: config.settings.clone(),
        }
    }

    /// Re-applies non-persistent settings, e.g. after `load`.
    pub fn set_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.registry.set_settings(&settings.window);
        self.workspaces.set_default_preset(settings.default_preset);
    }

    pub fn registry(&self) -> &WindowRegistry { &self.registry }

    /// Raw access to the registry primitives. Slot-uniqueness stays the
    /// engine's responsibility; callers writing slots directly own the
    /// consequences.
    pub fn registry_mut(&mut self) -> &mut WindowRegistry { &mut self.registry }

    pub fn workspaces(&self) -> &WorkspaceManager { &self.workspaces }

    pub fn grid_mode_enabled(&self) -> bool { self.grid_mode }

    pub fn active_workspace(&self) -> WorkspaceId { self.workspaces.active() }

    pub fn handle_command(&mut self, viewport: &Viewport, command: WmCommand) -> EventResponse {
        debug!(?command);
        match command {
            WmCommand::OpenWindow(kind) => {
                let id = self.open_window(viewport, kind, OpenOptions::default());
                EventResponse {
                    focus_window: Some(id),
                    workspace_changed_to: None,
                }
            }
            WmCommand::OpenOrFocus(kind) => self.open_or_focus(viewport, kind),
            WmCommand::CloseWindow(window) => self.close_window(window),
            WmCommand::FocusWindow(window) => self.focus_window(window),
            WmCommand::MinimizeWindow(window) => {
                self.registry.minimize(window);
                EventResponse::default()
            }
            WmCommand::MaximizeWindow(window) => {
                self.registry.maximize(window);
                EventResponse::default()
            }
            WmCommand::MoveWindow { window, x, y } => {
                self.registry.move_to(window, x, y);
                EventResponse::default()
            }
            WmCommand::ResizeWindow { window, width, height } => {
                self.registry.resize(window, width, height);
                EventResponse::default()
            }
            WmCommand::DropWindowAt { window, x, y } => {
                self.drop_window_at(viewport, window, x, y)
            }
            WmCommand::SetGridMode(enabled) => self.set_grid_mode(viewport, enabled),
            WmCommand::SetWorkspacePreset { workspace, preset } => {
                self.set_workspace_preset(viewport, workspace, preset)
            }
            WmCommand::MoveWindowToWorkspace { window, workspace } => {
                self.move_window_to_workspace(viewport, window, workspace)
            }
            WmCommand::CreateWorkspace => {
                let id = self.workspaces.add_ephemeral(None);
                self.workspaces.set_active(id);
                EventResponse {
                    focus_window: None,
                    workspace_changed_to: Some(id),
                }
            }
            WmCommand::ActivateWorkspace(workspace) => {
                if self.workspaces.set_active(workspace) {
                    EventResponse {
                        focus_window: None,
                        workspace_changed_to: Some(workspace),
                    }
                } else {
                    EventResponse::default()
                }
            }
        }
    }

    /// Opens a window. With grid mode off it floats, centered and cascaded in
    /// the visible area; with grid mode on it is born tiled into the first
    /// free slot across workspaces in creation order, never passing through a
    /// floating state.
    pub fn open_window(
        &mut self,
        viewport: &Viewport,
        kind: WindowKind,
        options: OpenOptions,
    ) -> WindowId {
        if !self.grid_mode {
            let workspace = options
                .workspace
                .filter(|&ws| self.workspaces.contains(ws))
                .unwrap_or_else(|| self.workspaces.active());
            return self.registry.open(kind, options, self.visible_area(viewport), workspace);
        }

        let (workspace, slot) = self.find_slot_anywhere();
        let bounds = self.bounds_for(workspace, slot, viewport);
        let id = self.registry.open(
            kind,
            OpenOptions {
                position: Some(bounds.origin),
                size: Some(bounds.size),
                workspace: None,
            },
            self.visible_area(viewport),
            workspace,
        );
        self.registry.set_grid_slot(id, Some(slot));
        debug!("opened {:?} window {} tiled into {} {:?}", kind, id, workspace, slot);
        id
    }

    /// Brings the first window of `kind` (insertion order) to front, following
    /// it to its workspace; opens one if none exists.
    pub fn open_or_focus(&mut self, viewport: &Viewport, kind: WindowKind) -> EventResponse {
        if let Some(&id) = self.registry.ids_by_kind(kind).first() {
            let workspace = self.registry.get(id).map(|w| w.workspace);
            self.registry.set_focus(id);
            let mut changed = None;
            if let Some(ws) = workspace
                && ws != self.workspaces.active()
                && self.workspaces.set_active(ws)
            {
                changed = Some(ws);
            }
            return EventResponse {
                focus_window: Some(id),
                workspace_changed_to: changed,
            };
        }
        let id = self.open_window(viewport, kind, OpenOptions::default());
        EventResponse {
            focus_window: Some(id),
            workspace_changed_to: None,
        }
    }

    pub fn close_window(&mut self, id: WindowId) -> EventResponse {
        self.registry.close(id);
        EventResponse {
            focus_window: None,
            workspace_changed_to: self.gc_workspaces(),
        }
    }

    pub fn focus_window(&mut self, id: WindowId) -> EventResponse {
        if !self.registry.contains(id) {
            return EventResponse::default();
        }
        self.registry.set_focus(id);
        EventResponse {
            focus_window: Some(id),
            workspace_changed_to: None,
        }
    }

    /// OFF→ON snaps every slot-less window, in registry order, into its own
    /// workspace first, then any workspace in creation order, then a fresh
    /// ephemeral one. ON→OFF releases all slots; windows keep their last
    /// frames and float.
    pub fn set_grid_mode(&mut self, viewport: &Viewport, enabled: bool) -> EventResponse {
        if enabled == self.grid_mode {
            return EventResponse::default();
        }
        self.grid_mode = enabled;

        if !enabled {
            info!("grid mode disabled; releasing grid slots");
            for id in self.registry.ids().to_vec() {
                self.registry.set_grid_slot(id, None);
            }
            return EventResponse::default();
        }

        info!("grid mode enabled; snapping floating windows into slots");
        let floating: Vec<WindowId> = self
            .registry
            .ids()
            .iter()
            .copied()
            .filter(|&id| self.registry.get(id).is_some_and(|w| w.grid_slot.is_none()))
            .collect();

        for id in floating {
            let Some(own) = self.registry.get(id).map(|w| w.workspace) else {
                continue;
            };
            let (workspace, slot) = match self.first_free_slot(own) {
                Some(slot) => (own, slot),
                None => self.find_slot_anywhere(),
            };
            self.commit_tile(id, workspace, slot, viewport);
        }
        EventResponse::default()
    }

    /// Re-snaps a workspace's tiled windows onto a new preset. Windows are
    /// ordered by their old slot index (registry order breaks ties); the first
    /// `min(count, slots)` keep slots 0..k-1, the rest overflow one at a time
    /// into the first free slot anywhere, growing the desktop if needed.
    pub fn set_workspace_preset(
        &mut self,
        viewport: &Viewport,
        workspace: Option<WorkspaceId>,
        preset: LayoutPreset,
    ) -> EventResponse {
        let ws = workspace.unwrap_or_else(|| self.workspaces.active());
        let Some(old_preset) = self.workspaces.preset(ws) else {
            return EventResponse::default();
        };
        if old_preset == preset {
            return EventResponse::default();
        }

        let mut tiled: Vec<(usize, usize, WindowId)> = Vec::new();
        for (position, &id) in self.registry.windows_in_workspace(ws).iter().enumerate() {
            if let Some(slot) = self.registry.get(id).and_then(|w| w.grid_slot) {
                let old_index = old_preset.slot_index(slot).unwrap_or(usize::MAX);
                tiled.push((old_index, position, id));
            }
        }
        tiled.sort();

        self.workspaces.set_preset(ws, preset);
        if tiled.is_empty() {
            return EventResponse::default();
        }

        let keep = tiled.len().min(preset.slot_count());
        let grid = preset.grid();
        for (i, &(_, _, id)) in tiled.iter().take(keep).enumerate() {
            self.commit_tile(id, ws, grid.slots[i], viewport);
        }

        // Stale slots from the old preset would read as occupancy during the
        // relocation scans below.
        let overflow: Vec<WindowId> = tiled[keep..].iter().map(|&(_, _, id)| id).collect();
        for &id in &overflow {
            self.registry.set_grid_slot(id, None);
        }
        for id in overflow {
            let (target, slot) = self.find_slot_anywhere();
            self.commit_tile(id, target, slot, viewport);
            debug!("relocated overflow window {} to {} {:?}", id, target, slot);
        }
        EventResponse::default()
    }

    /// Floating mode: reassign and follow. Grid mode: free slot in the
    /// destination, falling back to the global scan and then workspace
    /// creation, so the move never fails and never overlaps.
    pub fn move_window_to_workspace(
        &mut self,
        viewport: &Viewport,
        window: Option<WindowId>,
        target: WorkspaceId,
    ) -> EventResponse {
        let Some(id) = window.or_else(|| self.registry.focused()) else {
            return EventResponse::default();
        };
        let Some(current) = self.registry.get(id).map(|w| w.workspace) else {
            return EventResponse::default();
        };
        if !self.workspaces.contains(target) || current == target {
            return EventResponse::default();
        }

        let previously_active = self.workspaces.active();
        if self.grid_mode {
            let (destination, slot) = match self.first_free_slot(target) {
                Some(slot) => (target, slot),
                None => {
                    warn!("workspace {} is full; relocating window {} elsewhere", target, id);
                    self.find_slot_anywhere()
                }
            };
            self.commit_tile(id, destination, slot, viewport);
            self.workspaces.set_active(destination);
        } else {
            // A stray slot would collide with the destination's occupancy.
            self.registry.set_grid_slot(id, None);
            self.registry.set_workspace(id, target);
            self.workspaces.set_active(target);
        }
        self.registry.set_focus(id);
        let _ = self.gc_workspaces();

        let active = self.workspaces.active();
        EventResponse {
            focus_window: Some(id),
            workspace_changed_to: (active != previously_active).then_some(active),
        }
    }

    /// Drag release at raw pointer coordinates. Inside a free slot of the
    /// active workspace the window tiles there; anywhere else it simply stays
    /// floating at its last position.
    pub fn drop_window_at(
        &mut self,
        viewport: &Viewport,
        id: WindowId,
        x: f64,
        y: f64,
    ) -> EventResponse {
        if !self.registry.contains(id) {
            return EventResponse::default();
        }
        let ws = self.workspaces.active();
        let Some(preset) = self.workspaces.preset(ws) else {
            return EventResponse::default();
        };

        let point = viewport.workspace_point(x, y);
        let area = self.tiling_area(viewport);
        let hit = slots::slot_at_point(area, preset, point, self.settings.gaps.inner);
        let Some(slot) = hit else {
            return EventResponse::default();
        };

        let occupied = self.occupied_slots_excluding(ws, id);
        if occupied.iter().any(|o| o.footprint_overlaps(&slot)) {
            debug!("drop target {:?} in {} is occupied; leaving window floating", slot, ws);
            return EventResponse::default();
        }

        self.commit_tile(id, ws, slot, viewport);
        self.registry.set_focus(id);
        EventResponse {
            focus_window: Some(id),
            workspace_changed_to: self.gc_workspaces(),
        }
    }

    /// Occupancy of a workspace under its current preset, from the windows
    /// that carry a slot.
    fn occupied_slots_excluding(&self, workspace: WorkspaceId, skip: WindowId) -> Vec<GridSlot> {
        self.registry
            .windows_in_workspace(workspace)
            .into_iter()
            .filter(|&id| id != skip)
            .filter_map(|id| self.registry.get(id).and_then(|w| w.grid_slot))
            .collect()
    }

    fn first_free_slot(&self, workspace: WorkspaceId) -> Option<GridSlot> {
        let preset = self.workspaces.preset(workspace)?;
        let occupied: Vec<GridSlot> = self
            .registry
            .windows_in_workspace(workspace)
            .into_iter()
            .filter_map(|id| self.registry.get(id).and_then(|w| w.grid_slot))
            .collect();
        preset
            .grid()
            .slots
            .iter()
            .copied()
            .find(|slot| !occupied.iter().any(|o| o.footprint_overlaps(slot)))
    }

    /// Exhaustive scan over existing workspaces in creation order; only when
    /// every one is full does the desktop grow by an ephemeral workspace.
    /// Refusing to place a window is never an outcome.
    fn find_slot_anywhere(&mut self) -> (WorkspaceId, GridSlot) {
        let ids: Vec<WorkspaceId> = self.workspaces.ids().to_vec();
        for ws in ids {
            if let Some(slot) = self.first_free_slot(ws) {
                return (ws, slot);
            }
        }
        let ws = self.workspaces.add_ephemeral(None);
        let slot = self.workspaces.default_preset().grid().slots[0];
        (ws, slot)
    }

    /// Workspace membership, pixel frame, and slot update together.
    fn commit_tile(
        &mut self,
        id: WindowId,
        workspace: WorkspaceId,
        slot: GridSlot,
        viewport: &Viewport,
    ) {
        let bounds = self.bounds_for(workspace, slot, viewport);
        self.registry.set_workspace(id, workspace);
        self.registry.unmaximize(id);
        self.registry.move_to(id, bounds.origin.x, bounds.origin.y);
        self.registry.resize(id, bounds.size.width, bounds.size.height);
        self.registry.set_grid_slot(id, Some(slot));
    }

    fn bounds_for(&self, workspace: WorkspaceId, slot: GridSlot, viewport: &Viewport) -> Rect {
        let preset =
            self.workspaces.preset(workspace).unwrap_or_else(|| self.workspaces.default_preset());
        slots::slot_bounds(preset, slot, self.tiling_area(viewport), self.settings.gaps.inner)
    }

    /// Viewport minus the top-bar and dock reservations.
    fn visible_area(&self, viewport: &Viewport) -> Rect {
        viewport.frame.inset(
            self.settings.window.top_bar_height,
            0.0,
            self.settings.window.dock_height,
            0.0,
        )
    }

    fn tiling_area(&self, viewport: &Viewport) -> Rect {
        let outer = &self.settings.gaps.outer;
        self.visible_area(viewport).inset(outer.top, outer.left, outer.bottom, outer.right)
    }

    /// Removes non-default workspaces left with zero windows. Returns the new
    /// active workspace if the active one went away.
    fn gc_workspaces(&mut self) -> Option<WorkspaceId> {
        let previously_active = self.workspaces.active();
        let occupied: HashSet<WorkspaceId> = self
            .registry
            .ids()
            .iter()
            .filter_map(|&id| self.registry.get(id).map(|w| w.workspace))
            .collect();
        let empties: Vec<WorkspaceId> = self
            .workspaces
            .ids()
            .iter()
            .copied()
            .filter(|ws| !occupied.contains(ws))
            .collect();
        for ws in empties {
            self.workspaces.remove_ephemeral(ws);
        }
        let active = self.workspaces.active();
        (active != previously_active).then_some(active)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let buf = fs::read_to_string(path)?;
        Ok(ron::from_str(&buf)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let serialized = ron::ser::to_string(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized.as_bytes())?;
        Ok(())
    }
}
