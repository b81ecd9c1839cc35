//! # Harness Configuration
//!
//! Everything the harness reads at startup: window creation parameters, the
//! OpenGL context request, renderer settings and the input bindings. Every
//! section has defaults matching the stock demo, and files may set any
//! subset of fields.
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [render]
//! frame_report_interval = 120
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Config, ConfigError};
use crate::backend::Key;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "harness.toml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "HANDOFF_CONFIG";

/// Top-level harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Window creation parameters
    pub window: WindowConfig,
    /// OpenGL context request
    pub context: ContextConfig,
    /// Renderer settings
    pub render: RenderConfig,
    /// Input bindings
    pub input: InputConfig,
}

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial window width in screen coordinates
    pub width: u32,
    /// Initial window height in screen coordinates
    pub height: u32,
    /// Window title
    pub title: String,
    /// Multisample count for the default framebuffer (0 disables MSAA)
    pub samples: u32,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Render Thread Test".to_string(),
            samples: 8,
            resizable: true,
        }
    }
}

/// OpenGL context request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Requested major version (core profile)
    pub gl_major: u32,
    /// Requested minor version
    pub gl_minor: u32,
    /// Wait for vertical blank on present
    pub vsync: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            gl_major: 4,
            gl_minor: 6,
            vsync: true,
        }
    }
}

/// Renderer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color as RGBA
    pub clear_color: [f32; 4],
    /// Edge length of the spinning quad in pixels
    pub quad_size: f32,
    /// Frames between frame-time reports (0 disables reporting)
    pub frame_report_interval: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
            quad_size: 200.0,
            frame_report_interval: 60,
        }
    }
}

/// Input bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Keys that request shutdown when pressed
    pub quit_keys: Vec<Key>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            quit_keys: vec![Key::Escape],
        }
    }
}

impl Config for HarnessConfig {}

impl HarnessConfig {
    /// Load the configuration used at startup
    ///
    /// Resolution order: the file named by `HANDOFF_CONFIG` (must exist),
    /// then `harness.toml` in the working directory if present, then the
    /// defaults. The result is validated.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let config = match Self::startup_path() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::load_from_file(&path)?
            }
            None => {
                log::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn startup_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        default_path.exists().then(|| default_path.to_path_buf())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let version = (self.context.gl_major, self.context.gl_minor);
        if version < (3, 3) {
            return Err(ConfigError::Invalid(format!(
                "OpenGL {}.{} requested, 3.3 core or newer is required",
                version.0, version.1
            )));
        }

        if !(self.render.quad_size.is_finite() && self.render.quad_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "quad_size must be a positive number, got {}",
                self.render.quad_size
            )));
        }

        if self.input.quit_keys.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one quit key must be bound".to_string(),
            ));
        }

        Ok(())
    }
}
