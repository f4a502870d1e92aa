//! # Engine Configuration
//!
//! Everything the bring-up chain needs is carried in one immutable
//! [`EngineConfig`] passed by reference into setup. Defaults reproduce the
//! compiled-in values: an 800x600 window, validation in debug builds only,
//! and the unlit triangle shaders.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Engine name reported to the driver
pub const ENGINE_NAME: &str = "Injector Engine";

/// Engine version reported to the driver (major, minor, patch)
pub const ENGINE_VERSION: (u32, u32, u32) = (0, 1, 0);

/// Vulkan API version the instance requests
pub const VULKAN_API_VERSION: u32 = ash::vk::API_VERSION_1_1;

/// Khronos validation layer
pub const KHRONOS_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Window title and size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Injector".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Application identity reported to the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Application version (major, minor, patch)
    pub version: (u32, u32, u32),
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "Engine Dev".to_string(),
            version: (0, 1, 0),
        }
    }
}

/// Validation layer toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Enable validation layers and the debug messenger
    pub enabled: bool,
    /// Layers requested when enabled
    pub layers: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            layers: vec![KHRONOS_VALIDATION_LAYER.to_string()],
        }
    }
}

impl ValidationConfig {
    /// Layers to enable, empty when validation is off
    pub fn active_layers(&self) -> &[String] {
        if self.enabled {
            &self.layers
        } else {
            &[]
        }
    }
}

/// Precompiled SPIR-V paths for the triangle pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Path to the vertex shader SPIR-V file
    pub vertex_shader_path: String,
    /// Path to the fragment shader SPIR-V file
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::new("Shaders/Engine/Unlit.vert.spv", "Shaders/Engine/Unlit.frag.spv")
    }
}

/// Complete bring-up configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Application identity
    pub application: ApplicationConfig,
    /// Validation layers
    pub validation: ValidationConfig,
    /// Instance extensions requested on top of what GLFW needs
    pub instance_extensions: Vec<String>,
    /// Device extensions every candidate GPU must expose
    pub device_extensions: Vec<String>,
    /// Triangle shaders
    pub shaders: ShaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            application: ApplicationConfig::default(),
            validation: ValidationConfig::default(),
            instance_extensions: Vec::new(),
            device_extensions: vec!["VK_KHR_swapchain".to_string()],
            shaders: ShaderConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the window size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Enable or disable validation layers
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation.enabled = enabled;
        self
    }

    /// Set custom shader configuration
    pub fn with_shaders(mut self, shaders: ShaderConfig) -> Self {
        self.shaders = shaders;
        self
    }
}

/// Pack a (major, minor, patch) tuple the way Vulkan expects
pub fn make_api_version((major, minor, patch): (u32, u32, u32)) -> u32 {
    ash::vk::make_api_version(0, major, minor, patch)
}
