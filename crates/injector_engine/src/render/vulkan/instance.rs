//! Vulkan instance creation
//!
//! Loads the Vulkan library, checks every requested layer and extension
//! against what the loader reports, and attaches the [`DebugReporter`] when
//! validation is on.

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use super::debug::{self, DebugReporter};
use super::error::{VulkanError, VulkanResult};
use crate::core::config::{self, EngineConfig};

/// First entry of `requested` that `available` does not list
///
/// Names are compared exactly, including case.
pub fn first_unsupported<'a>(requested: &'a [String], available: &[String]) -> Option<&'a str> {
    requested
        .iter()
        .find(|name| !available.contains(name))
        .map(String::as_str)
}

/// Instance extensions to enable: the window system's, then configured extras,
/// then debug utils when validation is on. Duplicates are dropped.
pub fn instance_extensions(window_required: &[String], config: &EngineConfig) -> Vec<String> {
    let debug_name = DebugUtils::name().to_string_lossy().into_owned();
    let debug = config.validation.enabled.then_some(debug_name);

    let mut extensions: Vec<String> = Vec::new();
    for name in window_required
        .iter()
        .chain(config.instance_extensions.iter())
        .chain(debug.iter())
    {
        if !extensions.contains(name) {
            extensions.push(name.clone());
        }
    }
    extensions
}

pub(crate) fn to_cstrings(names: &[String]) -> VulkanResult<Vec<CString>> {
    names
        .iter()
        .map(|name| {
            CString::new(name.as_str())
                .map_err(|_| VulkanError::Initialization(format!("Name contains a NUL byte: {name}")))
        })
        .collect()
}

fn name_from_array(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }.to_string_lossy().into_owned()
}

/// Loaded library, instance and optional debug messenger
pub struct VulkanInstance {
    // Dropped before `instance`, see Drop
    debug: Option<DebugReporter>,
    instance: Instance,
    entry: Entry,
}

impl VulkanInstance {
    /// Create the instance with the window system's extensions plus the configured ones
    pub fn new(config: &EngineConfig, window_extensions: &[String]) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::Initialization(format!("Failed to load Vulkan: {e}")))?;

        let extensions = instance_extensions(window_extensions, config);
        let available_extensions: Vec<String> = entry
            .enumerate_instance_extension_properties(None)
            .map_err(VulkanError::Api)?
            .iter()
            .map(|properties| name_from_array(&properties.extension_name))
            .collect();
        if let Some(missing) = first_unsupported(&extensions, &available_extensions) {
            return Err(VulkanError::ExtensionUnsupported(missing.to_string()));
        }

        let layers = config.validation.active_layers();
        if !layers.is_empty() {
            let available_layers: Vec<String> = entry
                .enumerate_instance_layer_properties()
                .map_err(VulkanError::Api)?
                .iter()
                .map(|properties| name_from_array(&properties.layer_name))
                .collect();
            if let Some(missing) = first_unsupported(layers, &available_layers) {
                return Err(VulkanError::ValidationLayerUnsupported(missing.to_string()));
            }
        }

        let app_name = CString::new(config.application.name.as_str())
            .map_err(|_| VulkanError::Initialization("Application name contains a NUL byte".to_string()))?;
        let engine_name = CString::new(config::ENGINE_NAME)
            .map_err(|_| VulkanError::Initialization("Engine name contains a NUL byte".to_string()))?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(config::make_api_version(config.application.version))
            .engine_name(&engine_name)
            .engine_version(config::make_api_version(config::ENGINE_VERSION))
            .api_version(config::VULKAN_API_VERSION);

        let extension_names = to_cstrings(&extensions)?;
        let extension_ptrs: Vec<*const c_char> = extension_names.iter().map(|name| name.as_ptr()).collect();
        let layer_names = to_cstrings(layers)?;
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let mut debug_create_info = debug::messenger_create_info();
        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);
        if config.validation.enabled {
            create_info = create_info.push_next(&mut debug_create_info);
        }

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(|result| VulkanError::Initialization(format!("Failed to create instance: {result:?}")))?
        };

        let debug = if config.validation.enabled {
            match DebugReporter::new(&entry, &instance) {
                Ok(reporter) => Some(reporter),
                Err(err) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(err);
                }
            }
        } else {
            None
        };

        log::info!(
            "Created Vulkan instance ({} extension(s), {} layer(s))",
            extensions.len(),
            layers.len()
        );

        Ok(Self { debug, instance, entry })
    }

    /// Loader entry points
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Instance-level function table
    pub fn handle(&self) -> &Instance {
        &self.instance
    }

    /// Whether a debug messenger is attached
    pub fn has_debug_reporter(&self) -> bool {
        self.debug.is_some()
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        self.debug = None;
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}
