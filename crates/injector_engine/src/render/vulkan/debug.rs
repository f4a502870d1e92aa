//! Validation-layer message sink
//!
//! Routes `VK_EXT_debug_utils` messages into the `log` facade. The same
//! create-info is chained into instance creation so messages raised while the
//! instance itself is created or destroyed are reported too.

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::CStr;

use super::error::{VulkanError, VulkanResult};

/// Severities the messenger subscribes to
pub const REPORTED_SEVERITIES: vk::DebugUtilsMessageSeverityFlagsEXT = vk::DebugUtilsMessageSeverityFlagsEXT::from_raw(
    vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE.as_raw()
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw()
        | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR.as_raw(),
);

/// Map a debug-utils severity onto a log level
pub fn log_level_for(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// Messenger create-info shared by instance creation and [`DebugReporter::new`]
pub fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(REPORTED_SEVERITIES)
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Persistent debug messenger, destroyed before its instance
pub struct DebugReporter {
    loader: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugReporter {
    /// Attach a messenger to `instance`
    pub fn new(entry: &Entry, instance: &Instance) -> VulkanResult<Self> {
        let loader = DebugUtils::new(entry, instance);
        let create_info = messenger_create_info();

        let messenger = unsafe {
            loader
                .create_debug_utils_messenger(&create_info, None)
                .map_err(|result| {
                    VulkanError::Initialization(format!("Failed to create debug messenger: {result:?}"))
                })?
        };

        log::debug!("Validation messages routed to the logger");
        Ok(Self { loader, messenger })
    }
}

impl Drop for DebugReporter {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }

    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();
    log::log!(log_level_for(message_severity), "[Vulkan] {:?} - {}", message_type, message);

    // Never abort the call that triggered the message
    vk::FALSE
}
