//! Index spaces and kernel dispatch.
//!
//! A one dimensional space that needs more workgroups than the device allows
//! in one dimension is folded into rows. Kernels dispatched that way recover
//! their linear id as `gid.x + gid.y * num_workgroups.x * workgroup_size.x`
//! and must bounds-check it against the element count.

use crate::buffer::{DeviceBuffer, KernelArg};
use crate::context::GpuContext;
use crate::error::{BackendError, BackendResult};
use crate::program::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpace {
    global: [u32; 3],
    dims: usize,
}

impl IndexSpace {
    pub fn linear(n: u32) -> Self {
        Self {
            global: [n, 1, 1],
            dims: 1,
        }
    }

    pub fn grid(width: u32, height: u32) -> Self {
        Self {
            global: [width, height, 1],
            dims: 2,
        }
    }

    pub fn volume(width: u32, height: u32, depth: u32) -> Self {
        Self {
            global: [width, height, depth],
            dims: 3,
        }
    }

    pub fn global(&self) -> [u32; 3] {
        self.global
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of work items.
    pub fn len(&self) -> u64 {
        self.global.iter().map(|&g| g as u64).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split `total` invocations (a power of two) across this space's
    /// dimensions, giving the leading dimensions the larger share.
    pub fn workgroup_shape(&self, total: u32) -> [u32; 3] {
        let bits = total.max(1).trailing_zeros() as usize;
        let mut shape = [1u32; 3];
        for (d, slot) in shape.iter_mut().enumerate().take(self.dims) {
            let share = bits / self.dims + usize::from(d < bits % self.dims);
            *slot = 1 << share;
        }
        shape
    }

    /// Workgroup counts for `workgroup_size`, folding an oversized 1-D
    /// space into a 2-D grid.
    pub fn workgroups(
        &self,
        workgroup_size: [u32; 3],
        max_per_dim: u32,
    ) -> BackendResult<[u32; 3]> {
        if self.is_empty() {
            return Err(BackendError::EmptyIndexSpace(self.global));
        }
        let mut counts = [0u32; 3];
        for d in 0..3 {
            counts[d] = self.global[d].div_ceil(workgroup_size[d].max(1));
        }

        if self.dims == 1 && counts[0] > max_per_dim {
            let rows = counts[0].div_ceil(max_per_dim);
            let cols = counts[0].div_ceil(rows);
            counts = [cols, rows, 1];
        }

        if counts.iter().any(|&c| c > max_per_dim) {
            return Err(BackendError::DispatchTooLarge {
                workgroups: counts,
                limit: max_per_dim,
            });
        }
        Ok(counts)
    }
}

/// One kernel launch: a kernel plus the buffers bound to its slots.
pub struct Dispatch<'a> {
    kernel: &'a Kernel,
    args: Vec<(u32, &'a wgpu::Buffer)>,
}

impl<'a> Dispatch<'a> {
    pub fn new(kernel: &'a Kernel) -> Self {
        Self {
            kernel,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, binding: u32, buffer: &'a impl KernelArg) -> Self {
        self.args.push((binding, buffer.raw()));
        self
    }

    /// Record one compute pass over `space` and submit it. Returns the
    /// workgroup counts actually dispatched.
    pub async fn run(&self, ctx: &GpuContext, space: IndexSpace) -> BackendResult<[u32; 3]> {
        let limit = ctx.limits().max_compute_workgroups_per_dimension;
        let workgroups = space.workgroups(self.kernel.workgroup_size, limit)?;
        log::debug!(
            "Dispatching {} over {:?} as {:?} x {:?}",
            self.kernel.name,
            space.global(),
            workgroups,
            self.kernel.workgroup_size
        );

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let layout = self.kernel.pipeline.get_bind_group_layout(0);
        let entries: Vec<wgpu::BindGroupEntry> = self
            .args
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bg = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.kernel.name.as_str()),
            layout: &layout,
            entries: &entries,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            pass.set_pipeline(&self.kernel.pipeline);
            pass.set_bind_group(0, &bg, &[]);
            pass.dispatch_workgroups(workgroups[0], workgroups[1], workgroups[2]);
        }
        ctx.queue.submit(Some(encoder.finish()));

        if let Some(err) = ctx.device.pop_error_scope().await {
            return Err(BackendError::Dispatch {
                kernel: self.kernel.name.clone(),
                log: err.to_string(),
            });
        }
        Ok(workgroups)
    }
}

/// Output of a host/device round-trip.
#[derive(Debug, Clone)]
pub struct RoundTrip<T> {
    pub data: Vec<T>,
    pub workgroups: [u32; 3],
}

/// Dispatch, then read `output` back with a single blocking read.
pub async fn round_trip<T: bytemuck::Pod>(
    ctx: &GpuContext,
    dispatch: &Dispatch<'_>,
    space: IndexSpace,
    output: &DeviceBuffer<T>,
) -> BackendResult<RoundTrip<T>> {
    let workgroups = dispatch.run(ctx, space).await?;
    let data = output.read(ctx).await?;
    Ok(RoundTrip { data, workgroups })
}
