//! Compiling WGSL source strings into programs and kernels.

use std::borrow::Cow;
use std::sync::Arc;
use wgpu::{ComputePipeline, Device, ShaderModule};

use crate::context::GpuContext;
use crate::error::{BackendError, BackendResult};

pub const WORKGROUP_X: &str = "{{WORKGROUP_X}}";
pub const WORKGROUP_Y: &str = "{{WORKGROUP_Y}}";
pub const WORKGROUP_Z: &str = "{{WORKGROUP_Z}}";
/// Total invocations per workgroup, for sizing `var<workgroup>` arrays.
pub const WORKGROUP_SIZE: &str = "{{WORKGROUP_SIZE}}";

/// A kernel source string plus the entry points it exports.
#[derive(Debug, Clone)]
pub struct KernelSource {
    pub label: String,
    pub source: String,
    pub entry_points: Vec<String>,
    workgroup_size: [u32; 3],
}

impl KernelSource {
    pub fn new(label: &str, source: &str, entry_points: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            source: source.to_string(),
            entry_points: entry_points.iter().map(|s| s.to_string()).collect(),
            workgroup_size: [1, 1, 1],
        }
    }

    /// Set the shape substituted for the workgroup tokens.
    pub fn with_workgroup_size(mut self, size: [u32; 3]) -> Self {
        self.workgroup_size = size;
        self
    }

    pub fn workgroup_size(&self) -> [u32; 3] {
        self.workgroup_size
    }

    /// Source text with every workgroup token replaced.
    pub fn expand(&self) -> String {
        let [x, y, z] = self.workgroup_size;
        self.source
            .replace(WORKGROUP_X, &x.to_string())
            .replace(WORKGROUP_Y, &y.to_string())
            .replace(WORKGROUP_Z, &z.to_string())
            .replace(WORKGROUP_SIZE, &(x * y * z).to_string())
    }
}

/// A compiled shader module.
#[derive(Debug)]
pub struct Program {
    device: Arc<Device>,
    module: ShaderModule,
    source: KernelSource,
}

impl Program {
    /// Compile `source`, turning validation failures into the compiler log.
    pub async fn build(ctx: &GpuContext, source: &KernelSource) -> BackendResult<Self> {
        let text = source.expand();
        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.label.as_str()),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(text)),
            });
        if let Some(err) = ctx.device.pop_error_scope().await {
            return Err(BackendError::Compile {
                label: source.label.clone(),
                log: err.to_string(),
            });
        }
        log::info!(
            "Built program {} (workgroup {:?})",
            source.label,
            source.workgroup_size
        );

        Ok(Self {
            device: ctx.device.clone(),
            module,
            source: source.clone(),
        })
    }

    pub fn label(&self) -> &str {
        &self.source.label
    }

    pub async fn kernel(&self, name: &str) -> BackendResult<Kernel> {
        if !self.source.entry_points.iter().any(|e| e == name) {
            return Err(BackendError::UnknownKernel {
                program: self.source.label.clone(),
                kernel: name.to_string(),
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(name),
                layout: None,
                module: &self.module,
                entry_point: name,
            });
        if let Some(err) = self.device.pop_error_scope().await {
            return Err(BackendError::Compile {
                label: format!("{}::{}", self.source.label, name),
                log: err.to_string(),
            });
        }

        Ok(Kernel {
            name: name.to_string(),
            workgroup_size: self.source.workgroup_size,
            pipeline,
        })
    }
}

#[derive(Debug)]
pub struct Kernel {
    pub name: String,
    pub workgroup_size: [u32; 3],
    pub pipeline: ComputePipeline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_replaces_every_token() {
        let src = KernelSource::new(
            "t",
            "var<workgroup> s: array<f32, {{WORKGROUP_SIZE}}>;\n\
             @compute @workgroup_size({{WORKGROUP_X}}, {{WORKGROUP_Y}}, {{WORKGROUP_Z}})",
            &["main"],
        )
        .with_workgroup_size([8, 4, 2]);
        assert_eq!(
            src.expand(),
            "var<workgroup> s: array<f32, 64>;\n@compute @workgroup_size(8, 4, 2)"
        );
    }

    #[test]
    fn default_workgroup_is_one() {
        let src = KernelSource::new("t", "{{WORKGROUP_X}}x{{WORKGROUP_SIZE}}", &[]);
        assert_eq!(src.workgroup_size(), [1, 1, 1]);
        assert_eq!(src.expand(), "1x1");
    }
}
