//! # Core Engine Module
//!
//! Shared configuration types and engine identity constants.

pub mod config;

pub use config::{
    ApplicationConfig, Config, ConfigError, ConfigFormat, EngineConfig, ShaderConfig, ValidationConfig,
    WindowConfig,
};
