//! Triangle pipeline and its framebuffers
//!
//! [`PipelineResources`] builds, in order: render pass, shader modules,
//! pipeline layout, pipeline, then one framebuffer per swapchain image view.
//! Teardown runs framebuffers → pipeline → layout → render pass whether the
//! set was completed or construction stopped partway. Shader modules are only
//! needed while the pipeline is created and are released right after.

use ash::vk;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};
use super::framebuffer::Framebuffer;
use super::owned::OwnedList;
use super::render_pass::RenderPass;
use super::shader::{self, ShaderModule};
use super::swapchain::Swapchain;
use crate::core::config::ShaderConfig;

/// Pipeline layout wrapper with RAII cleanup
pub struct PipelineLayout {
    device: SharedDevice,
    layout: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Layout with no descriptor sets and no push constants
    pub fn empty(device: &SharedDevice) -> VulkanResult<Self> {
        let layout_info = vk::PipelineLayoutCreateInfo::builder();
        let layout = device
            .create_pipeline_layout(&layout_info)
            .map_err(VulkanError::pipeline("pipeline layout"))?;

        Ok(Self {
            device: SharedDevice::clone(device),
            layout,
        })
    }

    /// Get layout handle
    pub fn handle(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        self.device.destroy_pipeline_layout(self.layout);
    }
}

/// Graphics pipeline wrapper with RAII cleanup
pub struct GraphicsPipeline {
    device: SharedDevice,
    pipeline: vk::Pipeline,
}

impl GraphicsPipeline {
    /// Fixed-function state for one procedurally generated triangle
    ///
    /// No vertex input, triangle list, full-extent viewport and scissor,
    /// filled polygons with back-face culling and clockwise front faces, one
    /// sample, blending off.
    pub fn new_triangle(
        device: &SharedDevice,
        render_pass: &RenderPass,
        layout: &PipelineLayout,
        vertex_shader: &ShaderModule,
        fragment_shader: &ShaderModule,
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let shader_stages = [
            vertex_shader.stage_info(vk::ShaderStageFlags::VERTEX),
            fragment_shader.stage_info(vk::ShaderStageFlags::FRAGMENT),
        ];

        // Vertices come from gl_VertexIndex
        let vertex_input_info = vk::PipelineVertexInputStateCreateInfo::builder();

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewports = [viewport_for(extent)];
        let scissors = [vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        }];
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false)
            .build();
        let color_blend_attachments = [color_blend_attachment];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_info)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .color_blend_state(&color_blending)
            .layout(layout.handle())
            .render_pass(render_pass.handle())
            .subpass(0);

        let pipeline = device
            .create_graphics_pipeline(&pipeline_info)
            .map_err(VulkanError::pipeline("graphics pipeline"))?;

        Ok(Self {
            device: SharedDevice::clone(device),
            pipeline,
        })
    }

    /// Get pipeline handle
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        self.device.destroy_pipeline(self.pipeline);
    }
}

/// Viewport covering `extent` with the full depth range
#[allow(clippy::cast_precision_loss)]
pub fn viewport_for(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

/// Render pass, layout, pipeline and per-image framebuffers
pub struct PipelineResources {
    // Field order is the teardown order
    framebuffers: OwnedList<Framebuffer>,
    pipeline: GraphicsPipeline,
    layout: PipelineLayout,
    render_pass: RenderPass,
    extent: vk::Extent2D,
}

impl PipelineResources {
    /// Load both shaders from disk and build the set for `swapchain`
    pub fn new(device: &SharedDevice, swapchain: &Swapchain, shaders: &ShaderConfig) -> VulkanResult<Self> {
        let vertex = shader::read_bytecode(&shaders.vertex_shader_path)?;
        let fragment = shader::read_bytecode(&shaders.fragment_shader_path)?;
        Self::from_bytecode(device, swapchain, &vertex, &fragment)
    }

    /// Build the set for `swapchain` from in-memory SPIR-V
    pub fn from_bytecode(
        device: &SharedDevice,
        swapchain: &Swapchain,
        vertex_spirv: &[u8],
        fragment_spirv: &[u8],
    ) -> VulkanResult<Self> {
        let extent = swapchain.extent();
        let render_pass = RenderPass::new_present_pass(device, swapchain.format())?;

        let vertex_shader = ShaderModule::from_bytes(device, vertex_spirv, "vertex shader")?;
        let fragment_shader = ShaderModule::from_bytes(device, fragment_spirv, "fragment shader")?;
        let layout = PipelineLayout::empty(device)?;
        let pipeline = GraphicsPipeline::new_triangle(
            device,
            &render_pass,
            &layout,
            &vertex_shader,
            &fragment_shader,
            extent,
        )?;
        drop(fragment_shader);
        drop(vertex_shader);

        let mut framebuffers = OwnedList::with_capacity(swapchain.image_count());
        for view in swapchain.image_views() {
            framebuffers.push(Framebuffer::new(device, render_pass.handle(), &[view.handle()], extent)?);
        }

        log::debug!("Created triangle pipeline with {} framebuffer(s)", framebuffers.len());

        Ok(Self {
            framebuffers,
            pipeline,
            layout,
            render_pass,
            extent,
        })
    }

    /// Render pass handle
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.handle()
    }

    /// Pipeline handle
    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline.handle()
    }

    /// Pipeline layout handle
    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout.handle()
    }

    /// One framebuffer per swapchain image, same order
    pub fn framebuffers(&self) -> &[Framebuffer] {
        &self.framebuffers
    }

    /// Extent the pipeline and framebuffers were built for
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}
