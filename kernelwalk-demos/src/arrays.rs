//! Array processing: element-wise sum of two arrays.

use kernelwalk_backend::{
    round_trip, DeviceBuffer, Dispatch, GpuContext, IndexSpace, KernelSource, Program,
};
use std::time::Instant;

use crate::kernels::ARRAY_ADD_WGSL;
use crate::report::{Check, DemoReport};
use crate::{DemoConfig, DemoResult};

pub fn inputs(len: usize) -> (Vec<f32>, Vec<f32>) {
    let a = (0..len).map(|i| i as f32).collect();
    let b = (0..len).map(|i| 2.0 * i as f32).collect();
    (a, b)
}

pub fn reference(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub async fn run(config: &DemoConfig) -> DemoResult<DemoReport> {
    let ctx = GpuContext::new(&config.device).await?;
    let start = Instant::now();

    let source = KernelSource::new("arrays", ARRAY_ADD_WGSL, &["array_add"])
        .with_workgroup_size([config.workgroup_size, 1, 1]);
    let program = Program::build(&ctx, &source).await?;
    let kernel = program.kernel("array_add").await?;

    let len = config.array_len as usize;
    let (a_host, b_host) = inputs(len);
    let a = DeviceBuffer::from_slice(&ctx, "a", &a_host)?;
    let b = DeviceBuffer::from_slice(&ctx, "b", &b_host)?;
    let out = DeviceBuffer::<f32>::zeroed(&ctx, "out", len)?;

    let dispatch = Dispatch::new(&kernel).arg(0, &a).arg(1, &b).arg(2, &out);
    let space = IndexSpace::linear(config.array_len);
    let result = round_trip(&ctx, &dispatch, space, &out).await?;

    let expected = reference(&a_host, &b_host);
    Ok(DemoReport {
        demo: "arrays",
        device: ctx.info().clone(),
        elements: space.len(),
        dispatch: result.workgroups,
        elapsed: start.elapsed(),
        check: Check::approx(&expected, &result.data, 1e-4, config.verify_stride),
        summary: format!("out[last] = {}", result.data.last().copied().unwrap_or_default()),
    })
}
