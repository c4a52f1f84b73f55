// SPDX-License-Identifier: MIT OR Apache-2.0
//! Controller configuration stored as RON.

use crate::error::{NavigationError, Result};
use crate::transition::ScreenTransition;
use screenflow_animation::{AnimationId, TimeMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Navigation controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenFlowConfig {
    /// Format version
    pub version: u32,
    /// Animation identifier played when a section opens
    pub open_panel_id: AnimationId,
    /// Animation identifier played when a section closes
    pub close_panel_id: AnimationId,
    /// Transition used when back/cancel closes a primary screen
    pub default_back_transition: ScreenTransition,
    /// Transition to the initial screen on [`start`](crate::NavigationController::start)
    pub transition_on_start: bool,
    /// Name of the first primary screen
    pub initial_screen: Option<String>,
    /// Transition used for the initial screen
    pub initial_transition: ScreenTransition,
    /// Clock used by section panel animations
    pub panel_time_mode: TimeMode,
}

impl Default for ScreenFlowConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            open_panel_id: AnimationId::new("open"),
            close_panel_id: AnimationId::new("close"),
            default_back_transition: ScreenTransition::None,
            transition_on_start: true,
            initial_screen: None,
            initial_transition: ScreenTransition::None,
            panel_time_mode: TimeMode::Scaled,
        }
    }
}

impl ScreenFlowConfig {
    /// Parse a config from RON text
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: ScreenFlowConfig = ron::from_str(source)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(NavigationError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded screen flow config from {:?}", path);
        Ok(config)
    }

    /// Save the config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
