//! Two-phase sum: each workgroup reduces its slice on the device, the host
//! adds the partial sums.

use kernelwalk_backend::{DeviceBuffer, Dispatch, GpuContext, IndexSpace, KernelSource, Program};
use std::time::Instant;

use crate::kernels::REDUCE_SUM_WGSL;
use crate::report::{Check, DemoReport};
use crate::{DemoConfig, DemoResult};

pub fn input(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i % 16) as f32).collect()
}

pub fn reference(values: &[f32]) -> f64 {
    values.iter().map(|&v| v as f64).sum()
}

/// Host phase: add the partial sums in f64.
pub fn finish(partials: &[f32]) -> f64 {
    partials.iter().map(|&v| v as f64).sum()
}

pub async fn run(config: &DemoConfig) -> DemoResult<DemoReport> {
    let ctx = GpuContext::new(&config.device).await?;
    let start = Instant::now();

    let source = KernelSource::new("reduction", REDUCE_SUM_WGSL, &["reduce_sum"])
        .with_workgroup_size([config.workgroup_size, 1, 1]);
    let program = Program::build(&ctx, &source).await?;
    let kernel = program.kernel("reduce_sum").await?;

    let space = IndexSpace::linear(config.reduce_len);
    let groups = space.workgroups(
        kernel.workgroup_size,
        ctx.limits().max_compute_workgroups_per_dimension,
    )?;
    let partial_count = groups[0] as usize * groups[1] as usize;

    let host = input(config.reduce_len as usize);
    let values = DeviceBuffer::from_slice(&ctx, "input", &host)?;
    let partials = DeviceBuffer::<f32>::zeroed(&ctx, "partials", partial_count)?;

    let dispatch = Dispatch::new(&kernel).arg(0, &values).arg(1, &partials);
    let workgroups = dispatch.run(&ctx, space).await?;
    let partial_sums = partials.read(&ctx).await?;
    let total = finish(&partial_sums);

    let expected = reference(&host);
    log::debug!("Reduced {} values into {} partials", host.len(), partial_count);
    Ok(DemoReport {
        demo: "reduction",
        device: ctx.info().clone(),
        elements: space.len(),
        dispatch: workgroups,
        elapsed: start.elapsed(),
        check: Check::approx(&[expected as f32], &[total as f32], 1e-3, 1),
        summary: format!("sum = {total} from {partial_count} partials"),
    })
}
