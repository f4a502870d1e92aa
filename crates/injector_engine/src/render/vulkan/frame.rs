//! Per-frame acquire, submit and present
//!
//! A frame walks Idle → Acquiring → Submitted → Presenting → Idle. All
//! ordering is done on the GPU through the two [`FrameSync`] semaphores; the
//! CPU returns as soon as each call is queued.
//!
//! Submit failures are fatal. Present results are handed back as a
//! [`PresentStatus`] for the caller to act on, and an out-of-date swapchain
//! at acquire time skips the frame the same way.

use ash::vk;

use super::api::SharedDevice;
use super::error::{VulkanError, VulkanResult};
use super::sync::FrameSync;

/// Where a frame currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Between frames
    Idle,
    /// Waiting for the next swapchain image
    Acquiring,
    /// Draw submitted to the graphics queue
    Submitted,
    /// Present queued on the present queue
    Presenting,
}

/// Outcome of presenting one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    /// Image presented as negotiated
    Presented,
    /// Presented, but the swapchain no longer matches the surface exactly
    Suboptimal,
    /// Swapchain must be recreated; nothing was presented
    OutOfDate,
    /// Present returned another error code
    Failed(vk::Result),
}

impl PresentStatus {
    /// Map a `vkQueuePresentKHR` result
    pub fn from_present_result(result: Result<bool, vk::Result>) -> Self {
        match result {
            Ok(false) => Self::Presented,
            Ok(true) => Self::Suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Self::OutOfDate,
            Err(other) => Self::Failed(other),
        }
    }

    /// The swapchain should be rebuilt before the next frame
    pub fn needs_recreation(&self) -> bool {
        matches!(self, Self::Suboptimal | Self::OutOfDate)
    }
}

/// Everything one frame submits to and presents from
#[derive(Debug, Clone, Copy)]
pub struct FrameTarget<'a> {
    /// Swapchain to acquire from and present to
    pub swapchain: vk::SwapchainKHR,
    /// Prerecorded buffers indexed by swapchain image
    pub command_buffers: &'a [vk::CommandBuffer],
    /// Queue receiving the draw
    pub graphics_queue: vk::Queue,
    /// Queue receiving the present
    pub present_queue: vk::Queue,
}

/// Drives acquire/submit/present with one shared semaphore pair
pub struct FrameScheduler {
    sync: FrameSync,
    state: FrameState,
    frames_presented: u64,
}

impl FrameScheduler {
    /// Create the semaphore pair
    pub fn new(device: &SharedDevice) -> VulkanResult<Self> {
        Ok(Self {
            sync: FrameSync::new(device)?,
            state: FrameState::Idle,
            frames_presented: 0,
        })
    }

    /// Current frame state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Frames handed to the presentation engine so far
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Semaphores used by every frame
    pub fn sync(&self) -> &FrameSync {
        &self.sync
    }

    /// Run one frame
    ///
    /// Blocks in acquire until an image is available. Returns
    /// [`VulkanError::Submit`] when the draw cannot be queued; every other
    /// outcome comes back as a [`PresentStatus`].
    pub fn draw_frame(&mut self, device: &SharedDevice, target: &FrameTarget<'_>) -> VulkanResult<PresentStatus> {
        let result = self.run_frame(device, target);
        self.state = FrameState::Idle;
        result
    }

    fn run_frame(&mut self, device: &SharedDevice, target: &FrameTarget<'_>) -> VulkanResult<PresentStatus> {
        self.state = FrameState::Acquiring;
        let image_index = match device.acquire_next_image(target.swapchain, u64::MAX, self.sync.image_available()) {
            Ok((index, _suboptimal)) => index,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => return Ok(PresentStatus::OutOfDate),
            Err(result) => return Err(VulkanError::Acquire(result)),
        };

        let command_buffer = usize::try_from(image_index)
            .ok()
            .and_then(|index| target.command_buffers.get(index))
            .copied()
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!(
                    "acquired image {image_index} but only {} command buffer(s) are recorded",
                    target.command_buffers.len()
                ),
            })?;

        let wait_semaphores = [self.sync.image_available()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [self.sync.render_finished()];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        device
            .queue_submit(target.graphics_queue, &[submit_info])
            .map_err(VulkanError::Submit)?;
        self.state = FrameState::Submitted;

        let swapchains = [target.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        self.state = FrameState::Presenting;
        let status = PresentStatus::from_present_result(device.queue_present(target.present_queue, &present_info));
        if matches!(status, PresentStatus::Presented | PresentStatus::Suboptimal) {
            self.frames_presented += 1;
        }

        Ok(status)
    }
}
