//! "Large loops": a big 1-D space where every item also runs a long inner
//! loop. Large enough that the dispatch may fold into rows.

use kernelwalk_backend::{
    round_trip, DeviceBuffer, Dispatch, GpuContext, IndexSpace, KernelSource, Program,
    UniformBuffer,
};
use std::time::Instant;

use crate::kernels::LARGE_LOOPS_WGSL;
use crate::report::{Check, DemoReport};
use crate::{DemoConfig, DemoResult};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LoopParams {
    pub len: u32,
    pub iterations: u32,
    pub _pad: [u32; 2],
}

/// `sum_{k < iterations} ((i + k) % 7)` with wrapping arithmetic, the
/// same loop the kernel runs.
pub fn item_looped(i: u32, iterations: u32) -> u32 {
    let mut acc = 0u32;
    for k in 0..iterations {
        acc = acc.wrapping_add(i.wrapping_add(k) % 7);
    }
    acc
}

/// Closed form of [`item_looped`]: every seven consecutive residues sum to 21.
pub fn item(i: u32, iterations: u32) -> u32 {
    if i.checked_add(iterations).is_none() {
        return item_looped(i, iterations);
    }
    let cycles = iterations / 7;
    let tail: u32 = (0..iterations % 7).map(|j| (i + j) % 7).sum();
    cycles.wrapping_mul(21).wrapping_add(tail)
}

pub fn reference(len: u32, iterations: u32) -> Vec<u32> {
    (0..len).map(|i| item(i, iterations)).collect()
}

pub async fn run(config: &DemoConfig) -> DemoResult<DemoReport> {
    let ctx = GpuContext::new(&config.device).await?;
    let start = Instant::now();

    let source = KernelSource::new("large_loops", LARGE_LOOPS_WGSL, &["large_loops"])
        .with_workgroup_size([config.workgroup_size, 1, 1]);
    let program = Program::build(&ctx, &source).await?;
    let kernel = program.kernel("large_loops").await?;

    let params = LoopParams {
        len: config.loop_len,
        iterations: config.loop_iterations,
        _pad: [0; 2],
    };
    let out = DeviceBuffer::<u32>::zeroed(&ctx, "out", config.loop_len as usize)?;
    let uniform = UniformBuffer::new(&ctx, "params", &params);

    let dispatch = Dispatch::new(&kernel).arg(0, &out).arg(1, &uniform);
    let space = IndexSpace::linear(config.loop_len);
    let result = round_trip(&ctx, &dispatch, space, &out).await?;
    let elapsed = start.elapsed();

    let expected = reference(config.loop_len, config.loop_iterations);
    Ok(DemoReport {
        demo: "large_loops",
        device: ctx.info().clone(),
        elements: space.len(),
        dispatch: result.workgroups,
        elapsed,
        check: Check::exact(&expected, &result.data, config.verify_stride),
        summary: format!(
            "{} inner iterations per item ({} total)",
            config.loop_iterations,
            space.len() * config.loop_iterations as u64
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_matches_closed_form() {
        // Seven consecutive residues always sum to 21.
        assert_eq!(item(0, 7), 21);
        assert_eq!(item(5, 14), 42);
        assert_eq!(item(0, 3), 3);
        assert_eq!(item(6, 2), 6);
    }

    #[test]
    fn closed_form_matches_loop() {
        for i in [0, 1, 6, 7, 1000, 4_194_303] {
            for iterations in [0, 1, 6, 7, 8, 256, 1001] {
                assert_eq!(item(i, iterations), item_looped(i, iterations), "{i} {iterations}");
            }
        }
    }

    #[test]
    fn wraps_near_u32_max() {
        assert_eq!(item(u32::MAX, 1), u32::MAX % 7);
        // u32::MAX + 1 wraps to 0.
        assert_eq!(item(u32::MAX, 2), u32::MAX % 7);
    }

    #[test]
    fn params_layout_is_16_bytes() {
        assert_eq!(std::mem::size_of::<LoopParams>(), 16);
    }
}
