//! SPIR-V shader loading
//!
//! Shaders arrive precompiled; this module only reads the blob and wraps it
//! in a shader module.

use ash::vk;
use std::ffi::CStr;
use std::io::Cursor;
use std::path::Path;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};

/// Entry point every stage uses
pub const SHADER_ENTRY_POINT: &CStr = c"main";

/// Read a shader binary from disk as opaque bytes
pub fn read_bytecode(path: impl AsRef<Path>) -> VulkanResult<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| VulkanError::ShaderLoad {
        path: path.display().to_string(),
        source,
    })
}

/// Shader module wrapper with RAII cleanup
pub struct ShaderModule {
    device: SharedDevice,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create shader module from SPIR-V bytecode
    ///
    /// `origin` names the blob in errors. Blobs whose length is not a multiple
    /// of four are rejected as [`VulkanError::ShaderLoad`].
    pub fn from_bytes(device: &SharedDevice, bytes: &[u8], origin: &str) -> VulkanResult<Self> {
        let words = ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|source| VulkanError::ShaderLoad {
            path: origin.to_string(),
            source,
        })?;

        let create_info = vk::ShaderModuleCreateInfo::builder().code(&words);

        let module = device
            .create_shader_module(&create_info)
            .map_err(VulkanError::pipeline("shader module"))?;

        Ok(Self {
            device: SharedDevice::clone(device),
            module,
        })
    }

    /// Load shader from SPIR-V file
    pub fn from_file(device: &SharedDevice, path: impl AsRef<Path>) -> VulkanResult<Self> {
        let path = path.as_ref();
        let bytes = read_bytecode(path)?;
        Self::from_bytes(device, &bytes, &path.display().to_string())
    }

    /// Get shader module handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    /// Stage description using the `main` entry point
    pub fn stage_info(&self, stage: vk::ShaderStageFlags) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(stage)
            .module(self.module)
            .name(SHADER_ENTRY_POINT)
            .build()
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        self.device.destroy_shader_module(self.module);
    }
}
