//! Multi-dimensional array processing over a 3-D index space.
//!
//! Item `(x, y, z)` owns element `x + width * (y + height * z)` and writes
//! `in * 2 + x + 10y + 100z`, so a wrong index mapping shows up in the output.
//! A 2-D run is the same kernel with `depth = 1`.

use kernelwalk_backend::{
    round_trip, DeviceBuffer, Dispatch, GpuContext, IndexSpace, KernelSource, Program,
    UniformBuffer,
};
use std::time::Instant;

use crate::kernels::MULTIDIM_WGSL;
use crate::report::{Check, DemoReport};
use crate::{DemoConfig, DemoResult};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Dims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub _pad: u32,
}

impl Dims {
    pub fn new([width, height, depth]: [u32; 3]) -> Self {
        Self {
            width,
            height,
            depth,
            _pad: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        x as usize + self.width as usize * (y as usize + self.height as usize * z as usize)
    }

    pub fn space(&self) -> IndexSpace {
        if self.depth == 1 {
            IndexSpace::grid(self.width, self.height)
        } else {
            IndexSpace::volume(self.width, self.height, self.depth)
        }
    }
}

pub fn reference(dims: &Dims, input: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; dims.len()];
    for z in 0..dims.depth {
        for y in 0..dims.height {
            for x in 0..dims.width {
                let idx = dims.index(x, y, z);
                out[idx] = input[idx] * 2.0 + x as f32 + 10.0 * y as f32 + 100.0 * z as f32;
            }
        }
    }
    out
}

pub async fn run(config: &DemoConfig) -> DemoResult<DemoReport> {
    let ctx = GpuContext::new(&config.device).await?;
    let start = Instant::now();

    let dims = Dims::new(config.volume);
    let space = dims.space();
    let source = KernelSource::new("multidim", MULTIDIM_WGSL, &["multidim"])
        .with_workgroup_size(space.workgroup_shape(config.workgroup_size));
    let program = Program::build(&ctx, &source).await?;
    let kernel = program.kernel("multidim").await?;

    let input_host: Vec<f32> = (0..dims.len()).map(|i| i as f32).collect();
    let input = DeviceBuffer::from_slice(&ctx, "input", &input_host)?;
    let out = DeviceBuffer::<f32>::zeroed(&ctx, "out", dims.len())?;
    let params = UniformBuffer::new(&ctx, "dims", &dims);

    let dispatch = Dispatch::new(&kernel)
        .arg(0, &input)
        .arg(1, &out)
        .arg(2, &params);
    let result = round_trip(&ctx, &dispatch, space, &out).await?;

    let expected = reference(&dims, &input_host);
    Ok(DemoReport {
        demo: "multidim",
        device: ctx.info().clone(),
        elements: space.len(),
        dispatch: result.workgroups,
        elapsed: start.elapsed(),
        check: Check::approx(&expected, &result.data, 1e-4, config.verify_stride),
        summary: format!(
            "{}-D volume {}x{}x{}, workgroup {:?}",
            space.dims(),
            dims.width,
            dims.height,
            dims.depth,
            kernel.workgroup_size
        ),
    })
}
