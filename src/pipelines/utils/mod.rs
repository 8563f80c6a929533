use candle_core::Device;

/// Request for a specific device, used by pipeline builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// Use CUDA device 0 if available, otherwise CPU.
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Select a specific CUDA device by index. Fails when it cannot be opened.
    Cuda(usize),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> anyhow::Result<Device> {
        let device = match self {
            DeviceRequest::Default => Device::cuda_if_available(0)?,
            DeviceRequest::Cpu => Device::Cpu,
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                anyhow::anyhow!("failed to init CUDA device {i}: {e}. Try --cpu as fallback")
            })?,
        };
        tracing::debug!(request = ?self, location = ?device.location(), "resolved device");
        Ok(device)
    }
}
