use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::layout_engine::LayoutPreset;

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".mosaic") }
pub fn restore_file() -> PathBuf { data_dir().join("layout.ron") }
pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap().join(".config").join("mosaic").join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub workspaces: WorkspaceSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Whether new windows open tiled into grid slots instead of floating.
    #[serde(default = "no")]
    pub grid_mode_enabled: bool,
    /// Preset applied to every workspace that hasn't chosen its own.
    #[serde(default)]
    pub default_preset: LayoutPreset,
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

/// Gap configuration for tiled window spacing
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Gap between adjacent grid cells
    #[serde(default = "default_inner_gap")]
    pub inner: f64,
    /// Gaps between the grid and the workspace edges
    #[serde(default)]
    pub outer: OuterGaps,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct OuterGaps {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub right: f64,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            inner: default_inner_gap(),
            outer: OuterGaps::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WindowSettings {
    /// Hard floor for window width; every resize is clamped to it.
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    /// Pixel offset applied per already-open window when centering new ones.
    #[serde(default = "default_cascade_offset")]
    pub cascade_offset: f64,
    /// Vertical space reserved for the top bar.
    #[serde(default = "default_top_bar_height")]
    pub top_bar_height: f64,
    /// Vertical space reserved for the dock at the bottom.
    #[serde(default = "default_dock_height")]
    pub dock_height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            min_height: default_min_height(),
            cascade_offset: default_cascade_offset(),
            top_bar_height: default_top_bar_height(),
            dock_height: default_dock_height(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// How many permanent workspaces exist at startup.
    #[serde(default = "default_workspace_count")]
    pub default_workspace_count: usize,
    #[serde(default = "default_workspace_names")]
    pub workspace_names: Vec<String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            default_workspace_count: default_workspace_count(),
            workspace_names: default_workspace_names(),
        }
    }
}

fn no() -> bool { false }
fn default_inner_gap() -> f64 { 8.0 }
fn default_min_width() -> f64 { 360.0 }
fn default_min_height() -> f64 { 240.0 }
fn default_cascade_offset() -> f64 { 28.0 }
fn default_top_bar_height() -> f64 { 32.0 }
fn default_dock_height() -> f64 { 72.0 }
fn default_workspace_count() -> usize { 2 }
fn default_workspace_names() -> Vec<String> {
    (1..=default_workspace_count()).map(|i| format!("Workspace {i}")).collect()
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(config) => {
                let issues = config.validate();
                if let Some(first) = issues.first() {
                    bail!("invalid config: {first}");
                }
                Ok(config)
            }
            Err(e) => bail!("{e}"),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.settings.gaps.inner < 0.0 {
            issues.push("gaps.inner must not be negative".to_string());
        }
        let outer = &self.settings.gaps.outer;
        if outer.top < 0.0 || outer.left < 0.0 || outer.bottom < 0.0 || outer.right < 0.0 {
            issues.push("gaps.outer values must not be negative".to_string());
        }
        if self.settings.window.min_width <= 0.0 || self.settings.window.min_height <= 0.0 {
            issues.push("window minimum dimensions must be positive".to_string());
        }
        if self.workspaces.default_workspace_count == 0 {
            issues.push("default_workspace_count must be at least 1".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [settings]
            grid_mode_enabled = true
            default_preset = "grid3x2"

            [settings.gaps]
            inner = 12.0
        "#;

        let cfg = Config::parse(toml).unwrap();
        assert!(cfg.settings.grid_mode_enabled);
        assert_eq!(cfg.settings.default_preset, LayoutPreset::Grid3x2);
        assert_eq!(cfg.settings.gaps.inner, 12.0);
        assert_eq!(cfg.settings.window.min_width, default_min_width());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(!cfg.settings.grid_mode_enabled);
        assert_eq!(cfg.workspaces.default_workspace_count, 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml = r#"
            [settings]
            grid_made_enabled = true
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn negative_gap_is_rejected() {
        let toml = r#"
            [settings.gaps]
            inner = -1.0
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.settings.grid_mode_enabled = true;
        cfg.settings.default_preset = LayoutPreset::TwoOverOne;
        cfg.save(&path).unwrap();

        let read_back = Config::read(&path).unwrap();
        assert_eq!(read_back, cfg);
    }
}
