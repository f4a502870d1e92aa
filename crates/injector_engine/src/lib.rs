//! # Injector Engine
//!
//! Vulkan bring-up for a single window: picks a GPU, creates the logical
//! device and swapchain, builds one graphics pipeline and draws a
//! procedurally generated triangle every frame.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use injector_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     logging::init(logging::default_level());
//!     let config = EngineConfig::load_or_default("injector.toml")?;
//!     let mut engine = Engine::new(&config)?;
//!     engine.run()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{ApplicationConfig, EngineConfig, ShaderConfig, ValidationConfig, WindowConfig},
        foundation::logging,
        render::{PresentStatus, VulkanContext, VulkanError, Window},
        Engine, EngineError,
    };
}
