//! Hello-world kernel: the device spells out a fixed message.

use kernelwalk_backend::{
    round_trip, DeviceBuffer, Dispatch, GpuContext, IndexSpace, KernelSource, Program,
};
use std::time::Instant;

use crate::kernels::HELLO_WGSL;
use crate::report::{Check, DemoReport};
use crate::{DemoConfig, DemoResult};

pub const MESSAGE: &str = "Hello, World!";

/// Decode the kernel's one-character-per-`u32` output.
pub fn decode(codes: &[u32]) -> String {
    codes
        .iter()
        .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

pub async fn run(config: &DemoConfig) -> DemoResult<DemoReport> {
    let ctx = GpuContext::new(&config.device).await?;
    let start = Instant::now();

    let source = KernelSource::new("hello", HELLO_WGSL, &["hello"])
        .with_workgroup_size([config.workgroup_size, 1, 1]);
    let program = Program::build(&ctx, &source).await?;
    let kernel = program.kernel("hello").await?;

    let len = MESSAGE.len();
    let output = DeviceBuffer::<u32>::zeroed(&ctx, "message", len)?;
    let dispatch = Dispatch::new(&kernel).arg(0, &output);
    let space = IndexSpace::linear(len as u32);
    let result = round_trip(&ctx, &dispatch, space, &output).await?;

    let text = decode(&result.data);
    let expected: Vec<u32> = MESSAGE.chars().map(u32::from).collect();
    Ok(DemoReport {
        demo: "hello",
        device: ctx.info().clone(),
        elements: space.len(),
        dispatch: result.workgroups,
        elapsed: start.elapsed(),
        check: Check::exact(&expected, &result.data, 1),
        summary: format!("message: {text:?}"),
    })
}
