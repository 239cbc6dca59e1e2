use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue};

use crate::device::{create_instance, select_adapter, DeviceInfo, DeviceSelector};
use crate::error::BackendResult;

/// One demo's view of the GPU: the selected adapter and its logical device.
///
/// Nothing here is shared between demos; each demo builds its own context
/// and everything is released when it drops.
#[derive(Debug)]
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    info: DeviceInfo,
}

impl GpuContext {
    pub async fn new(selector: &DeviceSelector) -> BackendResult<Self> {
        let instance = create_instance(selector.backends());
        let (adapter, info) = select_adapter(&instance, selector)?;
        log::info!(
            "Using {} [{}] version {}",
            info,
            info.vendor,
            info.version()
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("kernelwalk device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            info,
        })
    }

    pub fn new_blocking(selector: &DeviceSelector) -> BackendResult<Self> {
        pollster::block_on(Self::new(selector))
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    pub fn adapter_info(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} ({:?})", info.name, info.backend)
    }
}
