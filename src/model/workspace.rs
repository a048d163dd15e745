use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, error};

use crate::common::config::WorkspaceSettings;
use crate::layout_engine::presets::LayoutPreset;

new_key_type! {
    pub struct WorkspaceId;
}

impl std::fmt::Display for WorkspaceId {
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

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Workspace {
    pub name: String,
    preset: LayoutPreset,
    ephemeral: bool,
}

impl Workspace {
    fn new(name: String, preset: LayoutPreset, ephemeral: bool) -> Self {
        Self { name, preset, ephemeral }
    }

    #[inline]
    pub fn preset(&self) -> LayoutPreset { self.preset }

    /// An ephemeral workspace was created on demand to host overflow and is
    /// removed once empty; the initial set is permanent.
    #[inline]
    pub fn is_ephemeral(&self) -> bool { self.ephemeral }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WorkspaceManager {
    workspaces: SlotMap<WorkspaceId, Workspace>,
    /// Creation order; also the fixed scan order for slot searches.
    order: Vec<WorkspaceId>,
    active: WorkspaceId,
    workspace_counter: usize,
    default_preset: LayoutPreset,
}

impl WorkspaceManager {
    pub fn new_with_config(settings: &WorkspaceSettings, default_preset: LayoutPreset) -> Self {
        let count = settings.default_workspace_count.max(1);
        let mut workspaces = SlotMap::default();
        let mut order = Vec::with_capacity(count);
        for i in 0..count {
            let name = settings
                .workspace_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Workspace {}", i + 1));
            order.push(workspaces.insert(Workspace::new(name, default_preset, false)));
        }
        let active = order[0];

        Self {
            workspaces,
            order,
            active,
            workspace_counter: count + 1,
            default_preset,
        }
    }

    pub fn set_default_preset(&mut self, preset: LayoutPreset) {
        self.default_preset = preset;
    }

    pub fn default_preset(&self) -> LayoutPreset { self.default_preset }

    /// Workspaces in creation order.
    pub fn ids(&self) -> &[WorkspaceId] { &self.order }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> { self.workspaces.get(id) }

    pub fn contains(&self, id: WorkspaceId) -> bool { self.workspaces.contains_key(id) }

    pub fn workspace_count(&self) -> usize { self.order.len() }

    pub fn active(&self) -> WorkspaceId { self.active }

    pub fn set_active(&mut self, id: WorkspaceId) -> bool {
        if self.workspaces.contains_key(id) {
            self.active = id;
            true
        } else {
            error!("attempted to activate non-existent workspace {}", id);
            false
        }
    }

    /// Creates an ephemeral workspace at the default preset.
    pub fn add_ephemeral(&mut self, name: Option<String>) -> WorkspaceId {
        let name = name.unwrap_or_else(|| {
            let name = format!("Workspace {}", self.workspace_counter);
            self.workspace_counter += 1;
            name
        });
        let id = self.workspaces.insert(Workspace::new(name, self.default_preset, true));
        self.order.push(id);
        debug!("created ephemeral workspace {}", id);
        id
    }

    pub fn preset(&self, id: WorkspaceId) -> Option<LayoutPreset> {
        self.workspaces.get(id).map(|ws| ws.preset)
    }

    pub fn set_preset(&mut self, id: WorkspaceId, preset: LayoutPreset) -> bool {
        match self.workspaces.get_mut(id) {
            Some(ws) => {
                ws.preset = preset;
                true
            }
            None => false,
        }
    }

    /// Removes `id` if it is ephemeral; the initial set is never removed.
    /// If the active workspace goes away, the first remaining one takes over.
    pub fn remove_ephemeral(&mut self, id: WorkspaceId) -> bool {
        match self.workspaces.get(id) {
            Some(ws) if ws.ephemeral => {}
            _ => return false,
        }

        self.workspaces.remove(id);
        self.order.retain(|&other| other != id);
        if self.active == id {
            // The permanent set is non-empty, so there is always a fallback.
            self.active = self.order[0];
        }
        debug!("removed empty ephemeral workspace {}", id);
        true
    }
}
