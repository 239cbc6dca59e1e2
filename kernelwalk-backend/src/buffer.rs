use std::marker::PhantomData;
use wgpu::util::DeviceExt;
use wgpu::Buffer;

use crate::context::GpuContext;
use crate::error::{BackendError, BackendResult};

/// Anything that can be bound to a kernel binding slot.
pub trait KernelArg {
    fn raw(&self) -> &Buffer;
}

/// Typed storage buffer on the device.
#[derive(Debug)]
pub struct DeviceBuffer<T: bytemuck::Pod> {
    buffer: Buffer,
    len: usize,
    label: String,
    _marker: PhantomData<T>,
}

fn check_size(ctx: &GpuContext, label: &str, len: usize, elem: usize) -> BackendResult<u64> {
    if len == 0 {
        return Err(BackendError::EmptyBuffer(label.to_string()));
    }
    let size = (len as u64).saturating_mul(elem as u64);
    let limits = ctx.limits();
    let limit = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    if size > limit {
        return Err(BackendError::BufferTooLarge {
            label: label.to_string(),
            size,
            limit,
        });
    }
    Ok(size)
}

impl<T: bytemuck::Pod> DeviceBuffer<T> {
    /// Allocate and upload `data`.
    pub fn from_slice(ctx: &GpuContext, label: &str, data: &[T]) -> BackendResult<Self> {
        check_size(ctx, label, data.len(), std::mem::size_of::<T>())?;
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            });
        Ok(Self {
            buffer,
            len: data.len(),
            label: label.to_string(),
            _marker: PhantomData,
        })
    }

    /// Allocate `len` zeroed elements.
    pub fn zeroed(ctx: &GpuContext, label: &str, len: usize) -> BackendResult<Self> {
        let size = check_size(ctx, label, len, std::mem::size_of::<T>())?;
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Ok(Self {
            buffer,
            len,
            label: label.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size_in_bytes(&self) -> u64 {
        self.buffer.size()
    }

    pub fn write(&self, ctx: &GpuContext, data: &[T]) -> BackendResult<()> {
        if data.len() != self.len {
            return Err(BackendError::LengthMismatch {
                label: self.label.clone(),
                expected: self.len,
                actual: data.len(),
            });
        }
        ctx.queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        Ok(())
    }

    /// Copy the buffer back to the host. This is the one blocking read a
    /// demo performs: it waits for every submitted dispatch to finish.
    pub async fn read(&self, ctx: &GpuContext) -> BackendResult<Vec<T>> {
        let size = self.buffer.size();
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        ctx.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        match rx.receive().await {
            Some(Ok(())) => {}
            Some(Err(source)) => {
                return Err(BackendError::Map {
                    label: self.label.clone(),
                    source,
                })
            }
            None => return Err(BackendError::MapCancelled(self.label.clone())),
        }

        let data = slice.get_mapped_range();
        let bytes = self.len * std::mem::size_of::<T>();
        let res = bytemuck::cast_slice(&data[..bytes]).to_vec();
        drop(data);
        staging.unmap();
        Ok(res)
    }

    pub fn read_blocking(&self, ctx: &GpuContext) -> BackendResult<Vec<T>> {
        pollster::block_on(self.read(ctx))
    }
}

impl<T: bytemuck::Pod> KernelArg for DeviceBuffer<T> {
    fn raw(&self) -> &Buffer {
        &self.buffer
    }
}

/// Small read-only parameter block bound as `var<uniform>`.
#[derive(Debug)]
pub struct UniformBuffer<T: bytemuck::Pod> {
    buffer: Buffer,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformBuffer<T> {
    pub fn new(ctx: &GpuContext, label: &str, value: &T) -> Self {
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(value),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        Self {
            buffer,
            _marker: PhantomData,
        }
    }
}

impl<T: bytemuck::Pod> KernelArg for UniformBuffer<T> {
    fn raw(&self) -> &Buffer {
        &self.buffer
    }
}
